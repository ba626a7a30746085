use super::{
    CandidateSource, ConfigHistory, ConfigSnapshot, LifecycleError, LifecycleState,
    LifecycleStatus, ReplayMode, Result, RollbackError, unified_diff,
};
use crate::device::{DeviceSession, SessionError};
use tracing::{debug, error, info, warn};

/// Emulated commit/rollback/diff on top of one device session.
///
/// Every mutating operation takes `&mut self`: one lifecycle operation at a
/// time per device. Wrap the manager in a `tokio::sync::Mutex` to share it.
pub struct ConfigManager<S: DeviceSession> {
    session: S,
    history: ConfigHistory,
    state: LifecycleState,
}

impl<S: DeviceSession> ConfigManager<S> {
    /// Bind a manager to `session`, capturing the running configuration as
    /// the initial snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Init`] if the running configuration cannot
    /// be fetched.
    pub async fn new(session: S) -> Result<Self> {
        let running = session
            .fetch_running_config()
            .await
            .map_err(LifecycleError::Init)?;
        let initial = ConfigSnapshot::new(running);

        info!(
            "Captured initial configuration over {} session ({} lines)",
            session.session_type(),
            initial.content().lines().count()
        );

        Ok(Self {
            session,
            history: ConfigHistory::with_initial(initial.clone()),
            state: LifecycleState::new(initial),
        })
    }

    /// Push candidate configuration to the device, one command per line.
    ///
    /// If any line fails, the candidate is discarded automatically before
    /// the error is returned.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::Io`] if the candidate file cannot be read
    /// - [`LifecycleError::ConfigLoad`] if a line failed and was discarded
    /// - [`LifecycleError::ConfigLoadUnrecovered`] if the discard failed too
    pub async fn load_candidate(&mut self, source: impl Into<CandidateSource>) -> Result<bool> {
        let content = match source.into() {
            CandidateSource::Content(content) => content,
            CandidateSource::File(path) => {
                debug!("Reading candidate configuration from {:?}", path);
                tokio::fs::read_to_string(&path).await?
            }
        };

        let failure = match self.replay(&content, ReplayMode::Candidate).await {
            Ok(pushed) => {
                info!("Loaded candidate configuration ({} commands)", pushed);
                self.state = self.state.after_load();
                return Ok(true);
            }
            Err(failure) => failure,
        };

        self.state = self.state.after_failed_load();
        Err(match failure {
            ReplayFailure::Compensated(source) | ReplayFailure::Surfaced(source) => {
                LifecycleError::ConfigLoad { source }
            }
            ReplayFailure::Unrecovered { source, restore } => {
                LifecycleError::ConfigLoadUnrecovered {
                    source,
                    discard: Box::new(LifecycleError::Discard(RollbackError::Replay(restore))),
                }
            }
        })
    }

    /// Record the running configuration as a new checkpoint.
    ///
    /// Returns `Ok(false)` without touching history when nothing was loaded
    /// since the last commit or rollback, or when the running configuration
    /// still matches the last checkpoint.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Commit`] if the running configuration
    /// cannot be fetched.
    pub async fn commit(&mut self) -> Result<bool> {
        if !self.state.changed {
            debug!("Nothing to commit");
            return Ok(false);
        }

        let running = self
            .session
            .fetch_running_config()
            .await
            .map_err(LifecycleError::Commit)?;

        if unified_diff(self.state.last_working.content(), &running).is_empty() {
            debug!("Running configuration matches the last checkpoint, nothing to commit");
            self.state = self.state.after_empty_commit();
            return Ok(false);
        }

        let snapshot = ConfigSnapshot::new(running);
        self.history.push(snapshot.clone());
        self.state = self.state.after_commit(snapshot);

        info!(
            "Committed configuration (history length {})",
            self.history.len()
        );
        Ok(true)
    }

    /// Undo whatever was loaded since the last commit; `rollback(0)`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Discard`] if the device cannot be restored.
    pub async fn discard(&mut self) -> Result<bool> {
        let discarded = self
            .rollback_to(0)
            .await
            .map_err(LifecycleError::Discard)?;
        info!("Discarded candidate configuration");
        Ok(discarded)
    }

    /// Move the device back `number` commits.
    ///
    /// `rollback(0)` returns to the last commit (or to the initial
    /// configuration when nothing was committed). Every snapshot newer than
    /// the target is dropped from history.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Rollback`] for a negative or too large
    /// `number`, or if replaying the target snapshot fails.
    pub async fn rollback(&mut self, number: i64) -> Result<bool> {
        let rolled_back = self.rollback_to(number).await?;
        info!("Rolled back {} commit(s)", number);
        Ok(rolled_back)
    }

    /// Unified diff (no context) of the last working snapshot against the
    /// running configuration. Empty when they match.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Compare`] if the running configuration
    /// cannot be fetched.
    pub async fn compare(&self) -> Result<String> {
        let running = self
            .session
            .fetch_running_config()
            .await
            .map_err(LifecycleError::Compare)?;

        Ok(unified_diff(self.state.last_working.content(), &running))
    }

    /// Whether content was loaded since the last commit or rollback and the
    /// running configuration really differs from it.
    ///
    /// # Errors
    ///
    /// Same as [`compare`](Self::compare).
    pub async fn changed(&self) -> Result<bool> {
        if !self.state.changed {
            return Ok(false);
        }
        Ok(!self.compare().await?.is_empty())
    }

    /// Whether the last terminal operation was a successful commit or
    /// rollback.
    pub fn committed(&self) -> bool {
        self.state.committed
    }

    pub fn history(&self) -> &ConfigHistory {
        &self.history
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Number of commits a rollback can currently undo
    pub fn available_rollbacks(&self) -> usize {
        self.history.len().saturating_sub(2)
    }

    pub fn status(&self) -> LifecycleStatus {
        LifecycleStatus {
            changed: self.state.changed,
            committed: self.state.committed,
            history_len: self.history.len(),
            available_rollbacks: self.available_rollbacks(),
        }
    }

    /// Give the session back, dropping history
    pub fn into_session(self) -> S {
        self.session
    }

    async fn rollback_to(&mut self, number: i64) -> std::result::Result<bool, RollbackError> {
        if number < 0 {
            return Err(RollbackError::NegativeOffset(number));
        }

        let available = self.history.len();
        let max_rollbacks = available as i64 - 2;
        if max_rollbacks < 0 {
            return Err(RollbackError::HistoryCorrupted { len: available });
        }
        if number > max_rollbacks {
            return Err(RollbackError::OutOfRange {
                requested: number,
                available: max_rollbacks as usize,
            });
        }

        // Entry 1 is the initial configuration when nothing was committed
        let target_index = if max_rollbacks == 0 {
            1
        } else {
            available - number as usize - 1
        };
        let target = self.history.get(target_index)?.clone();

        self.replay(target.content(), ReplayMode::Rollback)
            .await
            .map_err(|failure| RollbackError::Replay(failure.into_source()))?;

        self.history.truncate(target_index + 1);
        self.state = self.state.after_rollback(target);

        debug!(
            "Restored history entry {} (history length {})",
            target_index,
            self.history.len()
        );
        Ok(true)
    }

    /// Push `content` one command per line, stopping at the first failure.
    ///
    /// A failed candidate is compensated by pushing the last working
    /// snapshot again. A failed rollback replay is surfaced untouched, so a
    /// restore never triggers another restore.
    async fn replay(
        &self,
        content: &str,
        mode: ReplayMode,
    ) -> std::result::Result<usize, ReplayFailure> {
        let source = match self.push_lines(content, mode).await {
            Ok(pushed) => return Ok(pushed),
            Err(source) => source,
        };

        match mode {
            ReplayMode::Rollback => Err(ReplayFailure::Surfaced(source)),
            ReplayMode::Candidate => {
                warn!("Candidate configuration rejected, discarding: {}", source);
                let last_working = self.state.last_working.content();
                match self.push_lines(last_working, ReplayMode::Rollback).await {
                    Ok(_) => {
                        info!("Discarded candidate configuration");
                        Err(ReplayFailure::Compensated(source))
                    }
                    Err(restore) => {
                        error!("Automatic discard failed: {}", restore);
                        Err(ReplayFailure::Unrecovered { source, restore })
                    }
                }
            }
        }
    }

    async fn push_lines(
        &self,
        content: &str,
        mode: ReplayMode,
    ) -> std::result::Result<usize, SessionError> {
        let mut pushed = 0;
        for line in content.lines().map(str::trim).filter(|line| !line.is_empty()) {
            debug!("[{:?}] {}", mode, line);
            if let Err(e) = self.session.run(line).await {
                warn!("Command {} of {:?} replay failed: {}", pushed + 1, mode, e);
                return Err(e);
            }
            pushed += 1;
        }
        Ok(pushed)
    }
}

/// How a replay ended when a command failed
#[derive(Debug)]
enum ReplayFailure {
    /// Rollback replay failed; nothing was undone
    Surfaced(SessionError),
    /// Candidate failed and the last working snapshot was pushed back
    Compensated(SessionError),
    /// Candidate failed and pushing the last working snapshot failed too
    Unrecovered {
        source: SessionError,
        restore: SessionError,
    },
}

impl ReplayFailure {
    fn into_source(self) -> SessionError {
        match self {
            Self::Surfaced(source)
            | Self::Compensated(source)
            | Self::Unrecovered { source, .. } => source,
        }
    }
}

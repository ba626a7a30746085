//! In-memory switch.
//!
//! [`SimulatedDevice`] keeps the running configuration as a list of lines.
//! A pushed line replaces the existing line that starts with the same first
//! token, otherwise it is appended, which is enough to move the simulated
//! switch between snapshots by replay.

use super::{DeviceSession, RUNNING_CONFIG_COMMAND, SessionError, is_show_command};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Default)]
struct SimulatedState {
    lines: Vec<String>,
    received: Vec<String>,
    rejected_patterns: Vec<String>,
    fail_after: Option<usize>,
    executed: usize,
}

/// Switch simulated in memory, with failure injection
#[derive(Debug)]
pub struct SimulatedDevice {
    state: Mutex<SimulatedState>,
}

impl SimulatedDevice {
    /// Create a device whose running configuration is `running_config`
    pub fn new(running_config: &str) -> Self {
        let lines = running_config
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            state: Mutex::new(SimulatedState {
                lines,
                ..Default::default()
            }),
        }
    }

    /// Reject every later command containing `pattern`
    pub async fn reject_lines_containing(&self, pattern: impl Into<String>) {
        self.state.lock().await.rejected_patterns.push(pattern.into());
    }

    /// Let `count` more commands through, then time out every command
    pub async fn fail_after(&self, count: usize) {
        let mut state = self.state.lock().await;
        state.fail_after = Some(state.executed + count);
    }

    /// Remove all injected failures
    pub async fn heal(&self) {
        let mut state = self.state.lock().await;
        state.rejected_patterns.clear();
        state.fail_after = None;
    }

    /// Every command received so far, in order, including rejected ones
    pub async fn commands(&self) -> Vec<String> {
        self.state.lock().await.received.clone()
    }

    /// Current running configuration
    pub async fn running_config(&self) -> String {
        self.state.lock().await.lines.join("\n")
    }
}

fn line_key(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or(line)
}

#[async_trait]
impl DeviceSession for SimulatedDevice {
    async fn run(&self, command: &str) -> Result<String, SessionError> {
        let mut state = self.state.lock().await;
        state.received.push(command.to_string());

        if let Some(limit) = state.fail_after {
            if state.executed >= limit {
                return Err(SessionError::Timeout(Duration::from_secs(60)));
            }
        }
        state.executed += 1;

        if state
            .rejected_patterns
            .iter()
            .any(|pattern| command.contains(pattern.as_str()))
        {
            return Err(SessionError::CommandExecution(format!(
                "{}: Invalid argument",
                command
            )));
        }

        if command == RUNNING_CONFIG_COMMAND {
            return Ok(state.lines.join("\n"));
        }

        if is_show_command(command) {
            return Ok(String::new());
        }

        let key = line_key(command);
        let existing = state.lines.iter().position(|line| line_key(line) == key);
        match existing {
            Some(index) => state.lines[index] = command.to_string(),
            None => state.lines.push(command.to_string()),
        }
        debug!("Simulated device applied: {}", command);

        Ok(String::new())
    }

    fn session_type(&self) -> &'static str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_running_config_roundtrip() {
        let device = SimulatedDevice::new("hostname sw1\n\nsnmp-community public\n");
        assert_eq!(
            device.fetch_running_config().await.unwrap(),
            "hostname sw1\nsnmp-community public"
        );
    }

    #[tokio::test]
    async fn test_line_replaces_same_key() {
        let device = SimulatedDevice::new("hostname sw1\nntp-server 10.0.0.1");

        device.run("hostname sw2").await.unwrap();
        device.run("vlan-create id 10").await.unwrap();

        assert_eq!(
            device.running_config().await,
            "hostname sw2\nntp-server 10.0.0.1\nvlan-create id 10"
        );
    }

    #[tokio::test]
    async fn test_rejected_line_is_not_applied() {
        let device = SimulatedDevice::new("hostname sw1");
        device.reject_lines_containing("speed Xg").await;

        let result = device.run("port-storm-control-modify port 39 speed Xg").await;
        assert!(matches!(result, Err(SessionError::CommandExecution(_))));
        assert_eq!(device.running_config().await, "hostname sw1");
        assert_eq!(device.commands().await.len(), 1);
    }

    #[tokio::test]
    async fn test_fail_after() {
        let device = SimulatedDevice::new("");
        device.fail_after(1).await;

        assert!(device.run("hostname sw1").await.is_ok());
        assert!(matches!(
            device.run("hostname sw2").await,
            Err(SessionError::Timeout(_))
        ));

        device.heal().await;
        assert!(device.run("hostname sw3").await.is_ok());
        assert_eq!(device.running_config().await, "hostname sw3");
    }
}

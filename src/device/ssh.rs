//! SSH command execution.
//!
//! Executes every CLI command as a separate non-interactive `ssh` invocation
//! using `tokio::process::Command`.

use super::{DeviceConfig, DeviceSession, HEALTH_CHECK_COMMAND, SessionError, is_show_command};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, warn};
use which::which;

/// Session that reaches the switch through the system SSH client
#[derive(Debug, Clone)]
pub struct SshSession {
    config: DeviceConfig,
}

impl SshSession {
    /// Create a new SSH session
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Connection`] if no host is configured or the
    /// SSH client is not installed.
    pub fn new(config: DeviceConfig) -> Result<Self, SessionError> {
        if config.host.is_empty() {
            return Err(SessionError::Connection("no device host configured".to_string()));
        }

        if which(&config.ssh_program).is_err() {
            return Err(SessionError::Connection(format!(
                "SSH client not found: {}",
                config.ssh_program
            )));
        }

        Ok(Self { config })
    }

    /// Connection settings of this session
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Build the ssh argument list for one remote command
    fn ssh_args(&self, command: &str) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            format!("ConnectTimeout={}", self.config.timeout_secs),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-p".to_string(),
            self.config.port.to_string(),
        ];

        if let Some(ref identity) = self.config.identity_file {
            args.push("-i".to_string());
            args.push(identity.display().to_string());
        }

        args.push(format!("{}@{}", self.config.username, self.config.host));
        // ssh joins the remote arguments into one shell string
        args.push(shell_escape::escape(command.to_string().into()).into_owned());
        args
    }
}

#[async_trait]
impl DeviceSession for SshSession {
    async fn run(&self, command: &str) -> Result<String, SessionError> {
        debug!(
            "Executing command on {}: {}",
            self.config.host, command
        );

        let start = Instant::now();

        let mut ssh = Command::new(&self.config.ssh_program);
        ssh.args(self.ssh_args(command))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let timeout = self.config.timeout();
        let output = match tokio::time::timeout(timeout, ssh.output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(SessionError::Timeout(timeout));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        debug!(
            "Command finished in {:?} with status {:?}",
            start.elapsed(),
            output.status.code()
        );

        // 255 is reserved by ssh for its own failures
        if output.status.code() == Some(255) {
            return Err(SessionError::Connection(stderr.trim().to_string()));
        }

        if !output.status.success() {
            let message = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(SessionError::CommandExecution(format!(
                "{}: {}",
                command, message
            )));
        }

        // Show output is device data, it may legitimately contain a marker
        if is_show_command(command) {
            return Ok(stdout);
        }

        if let Some(marker) = self.config.rejection_marker(&stdout) {
            warn!("Device rejected command {:?} ({})", command, marker);
            return Err(SessionError::CommandExecution(format!(
                "{}: {}",
                command,
                stdout.trim()
            )));
        }

        Ok(stdout)
    }

    async fn health_check(&self) -> Result<(), SessionError> {
        self.run(HEALTH_CHECK_COMMAND).await.map(|_| ())
    }

    fn session_type(&self) -> &'static str {
        "ssh"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn session(config: DeviceConfig) -> SshSession {
        SshSession { config }
    }

    #[test]
    fn test_ssh_args() {
        let session = session(
            DeviceConfig::new("device.location", "username")
                .with_port(2222)
                .with_timeout(Duration::from_secs(7)),
        );

        let args = session.ssh_args("switch-info-show");
        assert_eq!(
            args,
            vec![
                "-o",
                "ConnectTimeout=7",
                "-o",
                "BatchMode=yes",
                "-p",
                "2222",
                "username@device.location",
                "switch-info-show",
            ]
        );
    }

    #[test]
    fn test_ssh_args_escape_command() {
        let session = session(
            DeviceConfig::new("sw1", "ops").with_identity_file("/keys/sw1"),
        );

        let args = session.ssh_args("vlan-create id 10 description 'core uplinks'");
        assert!(args.contains(&"-i".to_string()));
        assert!(args.contains(&"/keys/sw1".to_string()));
        let remote = args.last().unwrap();
        assert!(remote.starts_with('\''));
        assert!(remote.contains("core uplinks"));
    }

    #[test]
    fn test_new_requires_host() {
        let result = SshSession::new(DeviceConfig::default());
        assert!(matches!(result, Err(SessionError::Connection(_))));
    }

    #[test]
    fn test_new_requires_ssh_program() {
        let mut config = DeviceConfig::new("sw1", "ops");
        config.ssh_program = "definitely-not-an-ssh-client-binary".to_string();

        let result = SshSession::new(config);
        assert!(matches!(result, Err(SessionError::Connection(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_detects_rejection_marker() {
        // `echo` stands in for ssh and prints its arguments back
        let mut config = DeviceConfig::new("sw1", "ops");
        config.ssh_program = "echo".to_string();
        config.error_markers = vec!["BatchMode".to_string()];
        let session = session(config);

        let result = session.run("vlan-create id 10").await;
        assert!(matches!(result, Err(SessionError::CommandExecution(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_running_config_may_contain_error_marker() {
        use crate::lifecycle::ConfigManager;
        use std::os::unix::fs::PermissionsExt;

        // Script standing in for ssh, always printing the same configuration
        let temp_dir = tempfile::TempDir::new().unwrap();
        let script = temp_dir.path().join("fake-ssh");
        std::fs::write(
            &script,
            "#!/bin/sh\necho 'vlan-create id 10 description Invalid-traffic-sink'\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut config = DeviceConfig::new("sw1", "ops");
        config.ssh_program = script.display().to_string();
        assert!(config.rejection_marker("Invalid-traffic-sink").is_some());
        let session = session(config);

        let running = session.fetch_running_config().await.unwrap();
        assert!(running.contains("Invalid-traffic-sink"));

        // Config-changing commands are still checked
        let result = session.run("vlan-create id 10").await;
        assert!(matches!(result, Err(SessionError::CommandExecution(_))));

        let manager = ConfigManager::new(session).await.unwrap();
        assert_eq!(manager.compare().await.unwrap(), "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_returns_output() {
        let mut config = DeviceConfig::new("sw1", "ops");
        config.ssh_program = "echo".to_string();
        let session = session(config);

        let output = session.run("switch-info-show").await.unwrap();
        assert!(output.contains("ops@sw1"));
        assert!(output.contains("switch-info-show"));
        assert_eq!(session.session_type(), "ssh");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_nonzero_exit_is_command_failure() {
        let mut config = DeviceConfig::new("sw1", "ops");
        config.ssh_program = "false".to_string();
        let session = session(config);

        let result = session.run("switch-info-show").await;
        assert!(matches!(result, Err(SessionError::CommandExecution(_))));
    }
}

//! Interactive shell commands
//!
//! Parses one line typed at the `shell` prompt into a [`ShellCommand`].

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Load a candidate configuration file
    Load(PathBuf),
    Commit,
    Discard,
    /// Roll back the given number of commits
    Rollback(i64),
    Compare,
    Status,
    History,
    /// Run a raw CLI command
    Run(String),
    /// Run a show command in loose form
    Show(String),
    Help,
    Quit,
    Empty,
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            "" => Ok(Self::Empty),
            "load" if rest.is_empty() => Err("usage: load <file>".to_string()),
            "load" => Ok(Self::Load(PathBuf::from(rest))),
            "commit" => Ok(Self::Commit),
            "discard" => Ok(Self::Discard),
            "rollback" if rest.is_empty() => Ok(Self::Rollback(0)),
            "rollback" => rest
                .parse()
                .map(Self::Rollback)
                .map_err(|_| format!("invalid rollback count: {}", rest)),
            "compare" | "diff" => Ok(Self::Compare),
            "status" => Ok(Self::Status),
            "history" => Ok(Self::History),
            "run" if rest.is_empty() => Err("usage: run <command>".to_string()),
            "run" => Ok(Self::Run(rest.to_string())),
            "show" if rest.is_empty() => Err("usage: show <what>".to_string()),
            "show" => Ok(Self::Show(rest.to_string())),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command: {} (type 'help')", other)),
        }
    }
}

pub fn show_shell_help() {
    println!("📖 Shell Commands:");
    println!("  load <file>     - Push a candidate configuration file");
    println!("  compare         - Diff the running configuration against the last commit");
    println!("  commit          - Record the running configuration as a checkpoint");
    println!("  discard         - Undo everything loaded since the last commit");
    println!("  rollback [n]    - Return to the n-th previous commit (default 0)");
    println!("  status          - Show lifecycle status");
    println!("  history         - List recorded checkpoints");
    println!("  run <command>   - Execute a raw CLI command");
    println!("  show <what>     - Execute a show command (e.g. 'show l2 table')");
    println!("  quit | exit     - Leave the shell");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lifecycle_commands() {
        assert_eq!(
            ShellCommand::parse("load  uplinks.cfg "),
            Ok(ShellCommand::Load(PathBuf::from("uplinks.cfg")))
        );
        assert_eq!(ShellCommand::parse("commit"), Ok(ShellCommand::Commit));
        assert_eq!(ShellCommand::parse("discard"), Ok(ShellCommand::Discard));
        assert_eq!(ShellCommand::parse("rollback"), Ok(ShellCommand::Rollback(0)));
        assert_eq!(ShellCommand::parse("rollback 2"), Ok(ShellCommand::Rollback(2)));
        assert_eq!(ShellCommand::parse("rollback -1"), Ok(ShellCommand::Rollback(-1)));
        assert_eq!(ShellCommand::parse("diff"), Ok(ShellCommand::Compare));
    }

    #[test]
    fn test_parse_device_commands() {
        assert_eq!(
            ShellCommand::parse("run vlan-create id 10 scope local"),
            Ok(ShellCommand::Run("vlan-create id 10 scope local".to_string()))
        );
        assert_eq!(
            ShellCommand::parse("show l2 table"),
            Ok(ShellCommand::Show("l2 table".to_string()))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(ShellCommand::parse("load").is_err());
        assert!(ShellCommand::parse("rollback many").is_err());
        assert!(ShellCommand::parse("reboot").is_err());
        assert_eq!(ShellCommand::parse("   "), Ok(ShellCommand::Empty));
        assert_eq!(ShellCommand::parse("exit"), Ok(ShellCommand::Quit));
    }
}

//! Zero-context unified diff between two configurations.

use similar::TextDiff;

/// Line diff of `committed` → `running` with no context lines.
///
/// Returns an empty string when both texts hold the same lines. A missing
/// trailing newline is not a difference.
pub fn unified_diff(committed: &str, running: &str) -> String {
    let committed = normalized(committed);
    let running = normalized(running);
    if committed == running {
        return String::new();
    }

    TextDiff::from_lines(&committed, &running)
        .unified_diff()
        .context_radius(0)
        .header("committed", "running")
        .to_string()
}

fn normalized(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 1);
    for line in text.lines() {
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_configs_produce_empty_diff() {
        assert_eq!(unified_diff("hostname sw1\nvlan 10", "hostname sw1\nvlan 10"), "");
        assert_eq!(unified_diff("hostname sw1\n", "hostname sw1"), "");
    }

    #[test]
    fn test_diff_has_no_context_lines() {
        let committed = "hostname sw1\nntp-server 10.0.0.1\nsnmp-community public\n";
        let running = "hostname sw1\nntp-server 10.0.0.2\nsnmp-community public\n";

        let diff = unified_diff(committed, running);
        assert!(diff.starts_with("--- committed\n+++ running\n"));
        assert!(diff.contains("-ntp-server 10.0.0.1\n"));
        assert!(diff.contains("+ntp-server 10.0.0.2\n"));
        assert!(!diff.contains(" hostname sw1"));
        assert!(!diff.contains(" snmp-community public"));
    }

    #[test]
    fn test_added_lines() {
        let diff = unified_diff("hostname sw1", "hostname sw1\nvlan-create id 10");
        assert!(diff.contains("+vlan-create id 10\n"));
        assert!(!diff.contains("-hostname"));
        assert!(!diff.contains("No newline"));
    }
}

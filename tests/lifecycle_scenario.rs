//! End-to-end configuration lifecycle scenarios against a simulated switch.

use pluribus_cfg::device::{DeviceSession, SimulatedDevice};
use pluribus_cfg::lifecycle::{CandidateSource, ConfigManager, LifecycleError, RollbackError};
use std::fs;
use tempfile::TempDir;

const VALID_CONFIG: &str = "trunk-create name core05.scl01 port 4,8 speed 40g no-autoneg jumbo enable lacp-mode active";
const UNWANTED_CONFIG: &str = "igmp-snooping-modify enable";
const INVALID_CONFIG: &str = "port-storm-control-modify port 39 speed Xg";

// Replay cannot delete lines, so every key touched below already exists
const INITIAL_CONFIG: &str = "hostname core05\nigmp-snooping-modify disable\ntrunk-create name none\nvlan-create id 1 scope local";

#[tokio::test]
async fn test_load_commit_discard_rollback_scenario() {
    let mut manager = ConfigManager::new(SimulatedDevice::new("hostname A"))
        .await
        .unwrap();

    assert!(manager.load_candidate("hostname B").await.unwrap());
    assert!(manager.changed().await.unwrap());

    assert!(manager.commit().await.unwrap());
    let history: Vec<&str> = manager.history().iter().map(|s| s.content()).collect();
    assert_eq!(history, vec!["hostname A", "hostname A", "hostname B"]);
    assert!(manager.committed());

    assert!(manager.load_candidate("hostname C").await.unwrap());
    assert!(manager.changed().await.unwrap());

    assert!(manager.discard().await.unwrap());
    assert_eq!(manager.session().running_config().await, "hostname B");
    assert_eq!(manager.history().len(), 3);

    assert!(manager.rollback(1).await.unwrap());
    assert_eq!(manager.session().running_config().await, "hostname A");
    assert_eq!(manager.history().len(), 2);
    assert!(manager.committed());
    assert!(!manager.changed().await.unwrap());
}

#[tokio::test]
async fn test_full_config_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("valid.cfg");
    fs::write(&config_file, "vlan-create id 101 scope fabric\n").unwrap();

    let device = SimulatedDevice::new(INITIAL_CONFIG);
    device.reject_lines_containing("speed Xg").await;
    let mut manager = ConfigManager::new(device).await.unwrap();

    // Valid candidate from a string
    assert!(!manager.changed().await.unwrap());
    assert!(manager.load_candidate(VALID_CONFIG).await.unwrap());
    assert!(manager.changed().await.unwrap());
    assert!(manager.commit().await.unwrap());
    assert!(manager.committed());
    assert!(!manager.changed().await.unwrap());

    // Valid candidate from a file
    assert!(
        manager
            .load_candidate(CandidateSource::file(&config_file))
            .await
            .unwrap()
    );
    assert!(manager.changed().await.unwrap());
    assert!(manager.commit().await.unwrap());
    assert!(!manager.changed().await.unwrap());

    // Human error, discarded by hand
    assert!(manager.load_candidate(UNWANTED_CONFIG).await.unwrap());
    assert!(manager.changed().await.unwrap());
    assert!(manager.discard().await.unwrap());
    assert!(!manager.changed().await.unwrap());

    // Invalid command, discarded automatically
    let result = manager.load_candidate(INVALID_CONFIG).await;
    assert!(matches!(result, Err(LifecycleError::ConfigLoad { .. })));
    assert!(!manager.changed().await.unwrap());
    assert!(!manager.commit().await.unwrap());
    assert!(!manager.committed());

    // Back to where we started
    assert!(manager.rollback(2).await.unwrap());
    assert_eq!(
        manager.session().fetch_running_config().await.unwrap(),
        INITIAL_CONFIG
    );

    assert!(matches!(
        manager.rollback(100).await,
        Err(LifecycleError::Rollback(RollbackError::OutOfRange { .. }))
    ));
    assert!(matches!(
        manager.rollback(-5).await,
        Err(LifecycleError::Rollback(RollbackError::NegativeOffset(_)))
    ));
    assert!(matches!(
        manager.rollback(1).await,
        Err(LifecycleError::Rollback(RollbackError::OutOfRange { .. }))
    ));
}

#[tokio::test]
async fn test_shared_manager_behind_mutex() {
    let manager = ConfigManager::new(SimulatedDevice::new("hostname A"))
        .await
        .unwrap();
    let manager = std::sync::Arc::new(tokio::sync::Mutex::new(manager));

    {
        let mut guard = manager.lock().await;
        guard.load_candidate("hostname B").await.unwrap();
        guard.commit().await.unwrap();
    }

    let guard = manager.lock().await;
    assert_eq!(guard.status().available_rollbacks, 1);
}

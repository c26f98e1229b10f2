//! Create/read/update/delete/import against an in-memory device.

mod common;

use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;

use junos_provider::resources::{Diagnostics, ResourceData, ResourceRegistry, Severity};

fn application() -> std::sync::Arc<dyn junos_provider::resources::Resource> {
    ResourceRegistry::with_builtins()
        .get("junos_application")
        .unwrap()
}

fn ipsec_proposal() -> std::sync::Arc<dyn junos_provider::resources::Resource> {
    ResourceRegistry::with_builtins()
        .get("junos_security_ipsec_proposal")
        .unwrap()
}

fn assert_sessions_balanced(device: &MockDevice) {
    let (opened, closed) = device.session_counts();
    assert_eq!(opened, closed, "every session must be closed");
}

// ============================================================================
// Scenario
// ============================================================================

#[tokio::test]
async fn test_application_lifecycle_scenario() {
    let device = MockDevice::srx();
    let sess = live_session(&device);
    let app = application();

    // Create
    let mut data = state(json!({"name": "ssh-app", "protocol": "tcp", "destination_port": "22"}));
    let diags = app.create(&sess, &mut data).await;
    assert!(!diags.has_error(), "{:?}", diags);
    assert_eq!(data.id(), "ssh-app");
    assert_eq!(
        device.running(),
        vec![
            "set applications application ssh-app destination-port 22",
            "set applications application ssh-app protocol tcp",
        ]
    );

    // Read
    let mut read = ResourceData::from_id("ssh-app");
    assert!(!app.read(&sess, &mut read).await.has_error());
    assert_eq!(read.get_str("protocol"), "tcp");
    assert_eq!(read.get_str("destination_port"), "22");
    assert_eq!(read.get_str("source_port"), "");

    // Update adding source_port
    data.set("source_port", "1024-65535").unwrap();
    let diags = app.update(&sess, &mut data).await;
    assert!(!diags.has_error(), "{:?}", diags);

    let mut read = ResourceData::from_id("ssh-app");
    assert!(!app.read(&sess, &mut read).await.has_error());
    assert_eq!(read.get_str("protocol"), "tcp");
    assert_eq!(read.get_str("destination_port"), "22");
    assert_eq!(read.get_str("source_port"), "1024-65535");

    // Import of a missing name
    let err = app.import(&sess, "missing-app").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "don't find application with id 'missing-app' (id must be <name>)"
    );

    // Import of the existing object
    let imported = app.import(&sess, "ssh-app").await.unwrap();
    assert_eq!(imported.id(), "ssh-app");
    assert_eq!(imported.attributes, read.attributes);

    assert_sessions_balanced(&device);
    assert!(!device.is_locked());
}

#[tokio::test]
async fn test_create_accepts_numbers_for_string_attributes() {
    let device = MockDevice::srx();
    let sess = live_session(&device);

    let mut data = state(json!({"name": "testacc_app", "protocol": "tcp", "destination_port": 22}));
    let diags = app_create(&sess, &mut data).await;
    assert!(diags.is_empty(), "{:?}", diags);
    assert_eq!(
        device.running(),
        vec![
            "set applications application testacc_app destination-port 22",
            "set applications application testacc_app protocol tcp",
        ]
    );
    assert_eq!(data.get_str("destination_port"), "22");
}

// ============================================================================
// Ordering
// ============================================================================

#[tokio::test]
async fn test_update_deletes_before_set() {
    let device = MockDevice::srx().with_running(&[
        "set applications application web destination-port 80",
        "set applications application web protocol tcp",
    ]);
    let sess = live_session(&device);

    let mut data = ResourceData::from_id("web");
    data.set("protocol", "tcp").unwrap();
    data.set("destination_port", "8080").unwrap();
    assert!(!application().update(&sess, &mut data).await.has_error());

    assert_eq!(
        device.loaded_lines(),
        vec![
            "delete applications application web",
            "set applications application web destination-port 8080",
            "set applications application web protocol tcp",
        ]
    );
    let log = device.rpc_log();
    let lock = log.iter().position(|op| op == "lock").unwrap();
    let commit = log.iter().position(|op| op == "commit").unwrap();
    assert!(lock < commit);
    assert_eq!(data.get_str("destination_port"), "8080");
}

#[tokio::test]
async fn test_existence_check_is_idempotent() {
    let device = MockDevice::srx().with_running(&["set applications application web protocol tcp"]);
    let sess = live_session(&device);

    let first = application().import(&sess, "web").await.unwrap();
    let second = application().import(&sess, "web").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(device.running().len(), 1);
}

// ============================================================================
// Failure Handling
// ============================================================================

#[tokio::test]
async fn test_commit_error_rolls_back_once() {
    let device = MockDevice::srx();
    device.fail_commit("commit failed: missing mandatory statement");
    let sess = live_session(&device);

    let mut data = state(json!({"name": "ssh-app", "protocol": "tcp"}));
    let diags = app_create(&sess, &mut data).await;

    assert!(diags.has_error());
    assert_eq!(device.count("discard"), 1);
    let last = diags.iter().last().unwrap();
    assert_eq!(last.severity, Severity::Error);
    assert!(last.summary.contains("commit failed: missing mandatory statement"));
    assert!(data.is_gone());
    assert!(device.running().is_empty());
    assert!(!device.is_locked());
    assert_sessions_balanced(&device);
}

async fn app_create(
    sess: &junos_provider::junos::Session,
    data: &mut ResourceData,
) -> junos_provider::resources::Diagnostics {
    application().create(sess, data).await
}

#[tokio::test]
async fn test_rollback_failure_is_a_warning_before_the_error() {
    let device = MockDevice::srx();
    device.fail_commit("commit failed");
    device.fail_discard("discard refused");
    let sess = live_session(&device);

    let mut data = state(json!({"name": "ssh-app", "protocol": "tcp"}));
    let diags = app_create(&sess, &mut data).await;

    let entries: Vec<_> = diags.iter().collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].severity, Severity::Warning);
    assert!(entries[0].summary.contains("discard refused"));
    assert_eq!(entries[1].severity, Severity::Error);
    assert!(entries[1].summary.contains("commit failed"));
    assert_eq!(device.count("discard"), 1);
}

/// One discard, the error last, and the candidate released
fn assert_rolled_back_once(device: &MockDevice, diags: &Diagnostics, message: &str) {
    assert_eq!(device.count("discard"), 1);
    let last = diags.iter().last().unwrap();
    assert_eq!(last.severity, Severity::Error);
    assert!(last.summary.contains(message), "{}", last.summary);
    assert!(!device.is_locked());
    assert_sessions_balanced(device);
}

#[tokio::test]
async fn test_create_load_error_rolls_back_once() {
    let device = MockDevice::srx();
    device.fail_load("syntax error, expecting <data>");
    let sess = live_session(&device);

    let mut data = state(json!({"name": "ssh-app", "protocol": "tcp"}));
    let diags = app_create(&sess, &mut data).await;

    assert_rolled_back_once(&device, &diags, "syntax error, expecting <data>");
    assert_eq!(device.count("commit"), 0);
    assert!(data.is_gone());
}

#[tokio::test]
async fn test_update_load_error_rolls_back_once() {
    let device = MockDevice::srx().with_running(&["set applications application web protocol tcp"]);
    device.fail_load("syntax error");
    let sess = live_session(&device);

    let mut data = ResourceData::from_id("web");
    data.set("protocol", "udp").unwrap();
    let diags = application().update(&sess, &mut data).await;

    assert_rolled_back_once(&device, &diags, "syntax error");
    assert_eq!(device.count("load"), 1);
    assert_eq!(device.count("commit"), 0);
    assert_eq!(device.running(), vec!["set applications application web protocol tcp"]);
}

#[tokio::test]
async fn test_update_commit_error_rolls_back_once() {
    let device = MockDevice::srx().with_running(&["set applications application web protocol tcp"]);
    device.fail_commit("commit failed: port conflict");
    let sess = live_session(&device);

    let mut data = ResourceData::from_id("web");
    data.set("protocol", "udp").unwrap();
    let diags = application().update(&sess, &mut data).await;

    assert_rolled_back_once(&device, &diags, "commit failed: port conflict");
    let log = device.rpc_log();
    let commit = log.iter().position(|op| op == "commit").unwrap();
    assert_eq!(log[commit + 1], "discard");
    assert_eq!(log[commit + 2], "unlock");
    assert_eq!(device.running(), vec!["set applications application web protocol tcp"]);
}

#[tokio::test]
async fn test_delete_load_error_rolls_back_once() {
    let device = MockDevice::srx().with_running(&["set applications application web protocol tcp"]);
    device.fail_load("statement not found");
    let sess = live_session(&device);

    let mut data = ResourceData::from_id("web");
    let diags = application().delete(&sess, &mut data).await;

    assert_rolled_back_once(&device, &diags, "statement not found");
    assert_eq!(data.id(), "web");
    assert_eq!(device.running().len(), 1);
}

#[tokio::test]
async fn test_existence_check_error_rolls_back_once() {
    let device = MockDevice::srx();
    device.fail_show("permission denied");
    let sess = live_session(&device);

    let mut data = state(json!({"name": "ssh-app", "protocol": "tcp"}));
    let diags = app_create(&sess, &mut data).await;

    assert_rolled_back_once(&device, &diags, "permission denied");
    assert_eq!(device.count("load"), 0);
    assert!(data.is_gone());
}

#[tokio::test]
async fn test_commit_warnings_kept_when_commit_fails() {
    let device = MockDevice::srx();
    device.warn_on_commit("interface ge-0/0/0 is not enabled");
    device.fail_commit("commit failed");
    device.fail_discard("discard refused");
    let sess = live_session(&device);

    let mut data = state(json!({"name": "ssh-app", "protocol": "tcp"}));
    let diags = app_create(&sess, &mut data).await;

    let entries: Vec<_> = diags.iter().collect();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].severity, Severity::Warning);
    assert!(entries[0].summary.contains("interface ge-0/0/0 is not enabled"));
    assert_eq!(entries[1].severity, Severity::Warning);
    assert!(entries[1].summary.contains("discard refused"));
    assert_eq!(entries[2].severity, Severity::Error);
    assert!(entries[2].summary.contains("commit failed"));
}

#[tokio::test]
async fn test_create_existing_object() {
    let device = MockDevice::srx().with_running(&["set applications application ssh-app protocol tcp"]);
    let sess = live_session(&device);

    let mut data = state(json!({"name": "ssh-app", "protocol": "udp"}));
    let diags = app_create(&sess, &mut data).await;

    let last = diags.iter().last().unwrap();
    assert_eq!(last.summary, "application ssh-app already exists");
    assert_eq!(device.count("discard"), 1);
    assert_eq!(device.count("load"), 0);
    assert!(!device.is_locked());
}

#[tokio::test]
async fn test_object_missing_after_commit() {
    let device = MockDevice::srx();
    device.drop_on_commit();
    let sess = live_session(&device);

    let mut data = state(json!({"name": "ssh-app", "protocol": "tcp"}));
    let diags = app_create(&sess, &mut data).await;

    let last = diags.iter().last().unwrap();
    assert_eq!(
        last.summary,
        "application ssh-app not exists after commit => check your config"
    );
    assert!(data.is_gone());
    assert_eq!(device.count("discard"), 0);
    assert_sessions_balanced(&device);
}

#[tokio::test]
async fn test_lock_refused_does_not_roll_back() {
    let device = MockDevice::srx();
    device.fail_lock("configuration database locked by user admin");
    let sess = live_session(&device);

    let mut data = state(json!({"name": "ssh-app", "protocol": "tcp"}));
    let diags = app_create(&sess, &mut data).await;

    assert!(diags.has_error());
    assert!(diags
        .iter()
        .any(|d| d.summary.contains("configuration database locked by user admin")));
    assert_eq!(device.count("discard"), 0);
    assert_eq!(device.count("load"), 0);
}

#[tokio::test]
async fn test_commit_warning_is_surfaced() {
    let device = MockDevice::srx();
    device.warn_on_commit("statement has no contents; ignored");
    let sess = live_session(&device);

    let mut data = state(json!({"name": "ssh-app", "protocol": "tcp"}));
    let diags = app_create(&sess, &mut data).await;

    assert!(!diags.has_error());
    assert!(diags.iter().any(|d| {
        d.severity == Severity::Warning && d.summary.contains("statement has no contents")
    }));
    assert_eq!(data.id(), "ssh-app");
}

// ============================================================================
// Compatibility
// ============================================================================

#[tokio::test]
async fn test_security_resource_needs_srx() {
    let device = MockDevice::new("mx240");
    let sess = live_session(&device);

    let mut data = state(json!({"name": "prop-1", "protocol": "esp"}));
    let diags = ipsec_proposal().create(&sess, &mut data).await;

    let last = diags.iter().last().unwrap();
    assert_eq!(
        last.summary,
        "security ipsec proposal not compatible with Junos device mx240"
    );
    assert_eq!(device.count("lock"), 0);
    assert_sessions_balanced(&device);
}

#[tokio::test]
async fn test_ipsec_proposal_on_vsrx() {
    let device = MockDevice::new("vsrx");
    let sess = live_session(&device);

    let mut data = state(json!({
        "name": "prop-1",
        "protocol": "esp",
        "lifetime_seconds": "3600",
        "encryption_algorithm": "aes-256-cbc",
    }));
    let diags = ipsec_proposal().create(&sess, &mut data).await;
    assert!(!diags.has_error(), "{:?}", diags);
    assert_eq!(data.get_int("lifetime_seconds").unwrap(), 3600);
    assert_eq!(data.get_str("encryption_algorithm"), "aes-256-cbc");
}

// ============================================================================
// Read / Delete
// ============================================================================

#[tokio::test]
async fn test_read_missing_object_clears_id() {
    let device = MockDevice::srx();
    let sess = live_session(&device);

    let mut data = ResourceData::from_id("gone");
    let diags = application().read(&sess, &mut data).await;
    assert!(diags.is_empty());
    assert!(data.is_gone());
}

#[tokio::test]
async fn test_delete() {
    let device = MockDevice::srx().with_running(&[
        "set applications application web protocol tcp",
        "set applications application other protocol udp",
    ]);
    let sess = live_session(&device);

    let mut data = ResourceData::from_id("web");
    let diags = application().delete(&sess, &mut data).await;
    assert!(!diags.has_error());
    assert!(data.is_gone());
    assert_eq!(
        device.running(),
        vec!["set applications application other protocol udp"]
    );
    assert_eq!(device.loaded_lines(), vec!["delete applications application web"]);
}

#[tokio::test]
async fn test_delete_commit_error_keeps_id() {
    let device = MockDevice::srx().with_running(&["set applications application web protocol tcp"]);
    device.fail_commit("commit failed");
    let sess = live_session(&device);

    let mut data = ResourceData::from_id("web");
    let diags = application().delete(&sess, &mut data).await;
    assert!(diags.has_error());
    assert_eq!(data.id(), "web");
    assert_eq!(device.count("discard"), 1);
}

#[tokio::test]
async fn test_description_is_quoted_on_the_wire() {
    let device = MockDevice::srx();
    let sess = live_session(&device);

    let mut data = state(json!({"name": "web", "description": "web & friends", "protocol": "tcp"}));
    assert!(!app_create(&sess, &mut data).await.has_error());
    assert_eq!(
        device.running()[0],
        "set applications application web description \"web & friends\""
    );
    assert_eq!(data.get_str("description"), "web & friends");
}

//! Shared test utilities for the junos-provider test suite.
//!
//! This module provides:
//! - `MockDevice`, an in-memory Junos device answering NETCONF RPCs
//! - `MockConnector`, handing out connections to one shared device
//! - Session and state builders
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use junos_provider::config::ProviderConfig;
use junos_provider::connection::{
    Connection, ConnectionError, ConnectionResult, Connector,
};
use junos_provider::junos::Session;
use junos_provider::netconf::{escape_xml, extract_element, unescape_xml};
use junos_provider::resources::ResourceData;

// ============================================================================
// Mock Device
// ============================================================================

/// Datastores and failure switches of the mock device
#[derive(Debug, Default)]
struct DeviceState {
    running: Vec<String>,
    candidate: Vec<String>,
    locked: bool,
    rpc_log: Vec<String>,
    loaded: Vec<String>,
    commit_error: Option<String>,
    commit_warning: Option<String>,
    discard_error: Option<String>,
    lock_error: Option<String>,
    load_error: Option<String>,
    show_error: Option<String>,
    drop_on_commit: bool,
}

/// In-memory Junos device speaking just enough NETCONF for the provider.
///
/// `show configuration` answers from the running datastore; loaded lines go
/// to the candidate, which commit copies to running.
pub struct MockDevice {
    hardware_model: Mutex<String>,
    state: Mutex<DeviceState>,
    sessions_opened: AtomicU32,
    sessions_closed: AtomicU32,
}

impl MockDevice {
    /// Device reporting the given hardware model
    pub fn new(hardware_model: &str) -> Arc<Self> {
        Arc::new(Self {
            hardware_model: Mutex::new(hardware_model.to_string()),
            state: Mutex::new(DeviceState::default()),
            sessions_opened: AtomicU32::new(0),
            sessions_closed: AtomicU32::new(0),
        })
    }

    /// An SRX device
    pub fn srx() -> Arc<Self> {
        Self::new("srx300")
    }

    /// Seed committed configuration
    pub fn with_running(self: Arc<Self>, lines: &[&str]) -> Arc<Self> {
        {
            let mut state = self.state.lock();
            state.running = lines.iter().map(|l| l.to_string()).collect();
            state.candidate = state.running.clone();
        }
        self
    }

    /// Fail the next commits with `message`
    pub fn fail_commit(&self, message: &str) {
        self.state.lock().commit_error = Some(message.to_string());
    }

    /// Attach a warning to every commit
    pub fn warn_on_commit(&self, message: &str) {
        self.state.lock().commit_warning = Some(message.to_string());
    }

    /// Fail every discard with `message`
    pub fn fail_discard(&self, message: &str) {
        self.state.lock().discard_error = Some(message.to_string());
    }

    /// Refuse the configuration lock with `message`
    pub fn fail_lock(&self, message: &str) {
        self.state.lock().lock_error = Some(message.to_string());
    }

    /// Reject every configuration load with `message`
    pub fn fail_load(&self, message: &str) {
        self.state.lock().load_error = Some(message.to_string());
    }

    /// Fail every CLI command with `message`
    pub fn fail_show(&self, message: &str) {
        self.state.lock().show_error = Some(message.to_string());
    }

    /// Accept commits without changing running configuration
    pub fn drop_on_commit(&self) {
        self.state.lock().drop_on_commit = true;
    }

    /// Committed configuration lines
    pub fn running(&self) -> Vec<String> {
        self.state.lock().running.clone()
    }

    /// Every RPC received, as short operation names
    pub fn rpc_log(&self) -> Vec<String> {
        self.state.lock().rpc_log.clone()
    }

    /// Number of RPCs named `op`
    pub fn count(&self, op: &str) -> usize {
        self.state.lock().rpc_log.iter().filter(|o| *o == op).count()
    }

    /// Every line loaded into the candidate, in order
    pub fn loaded_lines(&self) -> Vec<String> {
        self.state.lock().loaded.clone()
    }

    /// Whether the candidate is locked
    pub fn is_locked(&self) -> bool {
        self.state.lock().locked
    }

    /// Sessions opened and closed so far
    pub fn session_counts(&self) -> (u32, u32) {
        (
            self.sessions_opened.load(Ordering::SeqCst),
            self.sessions_closed.load(Ordering::SeqCst),
        )
    }

    fn handle(&self, message: &str) -> String {
        let message_id = message
            .split("message-id=\"")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap_or("0")
            .to_string();
        let body = self.dispatch(message);
        format!(
            "<rpc-reply xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\" message-id=\"{}\">\n{}\n</rpc-reply>",
            message_id, body
        )
    }

    fn dispatch(&self, message: &str) -> String {
        let mut state = self.state.lock();

        if let Some(cli) = extract_element(message, "command") {
            let cli = unescape_xml(&cli);
            state.rpc_log.push(format!("command:{}", cli));
            if let Some(msg) = state.show_error.clone() {
                return rpc_error("error", "operation-failed", &msg);
            }
            return show_configuration(&state.running, &cli);
        }
        if let Some(set) = extract_element(message, "configuration-set") {
            state.rpc_log.push("load".to_string());
            if let Some(msg) = state.load_error.clone() {
                return format!(
                    "<load-configuration-results>{}</load-configuration-results>",
                    rpc_error("error", "invalid-value", &msg)
                );
            }
            for line in unescape_xml(&set).lines() {
                state.loaded.push(line.to_string());
                apply_line(&mut state.candidate, line);
            }
            return "<load-configuration-results><ok/></load-configuration-results>".to_string();
        }
        if message.contains("<lock>") {
            state.rpc_log.push("lock".to_string());
            if let Some(msg) = state.lock_error.clone() {
                return rpc_error("error", "lock-denied", &msg);
            }
            if state.locked {
                return rpc_error("error", "lock-denied", "configuration database locked");
            }
            state.locked = true;
            return "<ok/>".to_string();
        }
        if message.contains("<unlock>") {
            state.rpc_log.push("unlock".to_string());
            state.locked = false;
            return "<ok/>".to_string();
        }
        if message.contains("<commit-configuration>") {
            state.rpc_log.push("commit".to_string());
            let warning = state
                .commit_warning
                .as_deref()
                .map(|msg| rpc_error("warning", "warning", msg))
                .unwrap_or_default();
            if let Some(msg) = state.commit_error.clone() {
                return format!("{}{}", warning, rpc_error("error", "operation-failed", &msg));
            }
            if !state.drop_on_commit {
                state.running = state.candidate.clone();
            }
            return format!("{}<commit-results><routing-engine/></commit-results><ok/>", warning);
        }
        if message.contains("<discard-changes/>") {
            state.rpc_log.push("discard".to_string());
            if let Some(msg) = state.discard_error.clone() {
                return rpc_error("error", "operation-failed", &msg);
            }
            state.candidate = state.running.clone();
            return "<ok/>".to_string();
        }
        if message.contains("<get-system-information/>") {
            state.rpc_log.push("get-system-information".to_string());
            return format!(
                "<system-information>\n<hardware-model>{}</hardware-model>\n<os-name>junos</os-name>\n<os-version>21.4R3</os-version>\n<serial-number>MOCK0001</serial-number>\n<host-name>mock-srx</host-name>\n</system-information>",
                self.hardware_model.lock()
            );
        }
        if message.contains("<close-session/>") {
            state.rpc_log.push("close-session".to_string());
            return "<ok/>".to_string();
        }

        rpc_error("error", "operation-not-supported", "unknown rpc")
    }
}

/// Apply one `set`/`delete` line to a datastore
fn apply_line(store: &mut Vec<String>, line: &str) {
    let line = line.trim();
    if let Some(path) = line.strip_prefix("delete ") {
        let prefix = format!("set {} ", path);
        let exact = format!("set {}", path);
        store.retain(|l| !l.starts_with(&prefix) && *l != exact);
    } else if line.starts_with("set ") && !store.iter().any(|l| l == line) {
        // Single-valued attributes replace their previous value
        if let Some((head, _)) = line.rsplit_once(' ') {
            let head = format!("{} ", head);
            store.retain(|l| !(l.starts_with(&head) && l[head.len()..].split(' ').count() == 1));
        }
        store.push(line.to_string());
    }
}

/// Answer `show configuration <path> | display set [relative]`
fn show_configuration(running: &[String], cli: &str) -> String {
    let Some(query) = cli.strip_prefix("show configuration ") else {
        return rpc_error("error", "invalid-value", "syntax error");
    };
    let (path, relative) = match query.strip_suffix(" | display set relative") {
        Some(path) => (path, true),
        None => (query.strip_suffix(" | display set").unwrap_or(query), false),
    };

    let prefix = format!("set {} ", path);
    let mut output = String::new();
    for line in running.iter().filter(|l| l.starts_with(&prefix)) {
        if relative {
            output.push_str("set ");
            output.push_str(&line[prefix.len()..]);
        } else {
            output.push_str(line);
        }
        output.push('\n');
    }

    format!(
        "<configuration-information>\n<configuration-output>\n{}</configuration-output>\n</configuration-information>",
        escape_xml(&output)
    )
}

fn rpc_error(severity: &str, tag: &str, message: &str) -> String {
    format!(
        "<rpc-error>\n<error-type>application</error-type>\n<error-tag>{}</error-tag>\n<error-severity>{}</error-severity>\n<error-message>{}</error-message>\n</rpc-error>",
        tag,
        severity,
        escape_xml(message)
    )
}

/// One NETCONF session on a [`MockDevice`]
pub struct MockConnection {
    device: Arc<MockDevice>,
}

#[async_trait]
impl Connection for MockConnection {
    fn identifier(&self) -> &str {
        "mock-srx:830"
    }

    async fn send(&self, message: &str) -> ConnectionResult<String> {
        Ok(self.device.handle(message))
    }

    async fn close(&self) -> ConnectionResult<()> {
        self.device.sessions_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Connector handing out sessions on one shared device
pub struct MockConnector {
    device: Arc<MockDevice>,
    refuse: bool,
}

impl MockConnector {
    pub fn new(device: Arc<MockDevice>) -> Self {
        Self {
            device,
            refuse: false,
        }
    }

    /// Connector whose every attempt fails
    pub fn refusing(device: Arc<MockDevice>) -> Self {
        Self {
            device,
            refuse: true,
        }
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, _config: &ProviderConfig) -> ConnectionResult<Arc<dyn Connection>> {
        if self.refuse {
            return Err(ConnectionError::ConnectionFailed(
                "connection refused".to_string(),
            ));
        }
        self.device.sessions_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockConnection {
            device: Arc::clone(&self.device),
        }))
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Live-mode session on `device`
pub fn live_session(device: &Arc<MockDevice>) -> Session {
    let config = ProviderConfig {
        ip: Some("192.0.2.1".to_string()),
        ..ProviderConfig::default()
    };
    Session::new(config, Arc::new(MockConnector::new(Arc::clone(device))))
}

/// Fake-mode session writing to `setfile`
pub fn fake_session(setfile: &Path, update_also: bool, delete_also: bool) -> Session {
    let config = ProviderConfig {
        fake_create_with_setfile: Some(setfile.to_path_buf()),
        fake_update_also: update_also,
        fake_delete_also: delete_also,
        ..ProviderConfig::default()
    };
    Session::new(config, Arc::new(MockConnector::refusing(MockDevice::srx())))
}

/// State holding the given attributes
pub fn state(attrs: Value) -> ResourceData {
    let map: Map<String, Value> = attrs.as_object().cloned().unwrap_or_default();
    ResourceData::new(map)
}

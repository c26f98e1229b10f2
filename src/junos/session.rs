//! Provider session and per-operation Junos sessions.

use std::path::Path;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use super::system::SystemInformation;
use crate::config::ProviderConfig;
use crate::connection::{Connection, ConnectionError, Connector};
use crate::error::{Error, Result};
use crate::netconf::{self, unescape_xml, NetconfError, NetconfResponse};

/// Provider-wide session.
///
/// Holds the configuration, the connector used to open device sessions and
/// the lock serializing read-then-populate steps of concurrent operations.
pub struct Session {
    config: ProviderConfig,
    connector: Arc<dyn Connector>,
    read_lock: Mutex<()>,
}

impl Session {
    /// Create a session opening device connections through `connector`
    pub fn new(config: ProviderConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            config,
            connector,
            read_lock: Mutex::new(()),
        }
    }

    /// Create a session using NETCONF over SSH
    #[cfg(feature = "russh")]
    pub fn with_ssh(config: ProviderConfig) -> Self {
        Self::new(config, Arc::new(crate::connection::SshConnector))
    }

    /// File receiving `set` lines instead of a device, when fake mode is on
    pub fn fake_create_setfile(&self) -> Option<&Path> {
        self.config.fake_create_with_setfile.as_deref()
    }

    /// Whether update also writes to the fake file
    pub fn fake_update_also(&self) -> bool {
        self.config.fake_update_also
    }

    /// Whether delete also writes to the fake file
    pub fn fake_delete_also(&self) -> bool {
        self.config.fake_delete_also
    }

    /// Serialize a read-then-populate step
    pub async fn read_lock(&self) -> MutexGuard<'_, ()> {
        self.read_lock.lock().await
    }

    /// Open a device session and gather its system information
    pub async fn start_new_session(&self) -> Result<JunosSession> {
        let connection = self.connector.connect(&self.config).await?;
        let mut junos = JunosSession {
            connection,
            system_information: SystemInformation::default(),
        };

        match junos.rpc(netconf::get_system_information()).await {
            Ok(reply) => {
                junos.system_information =
                    SystemInformation::parse(reply.data.as_deref().unwrap_or_default());
            }
            Err(e) => {
                let _ = junos.connection.close().await;
                return Err(e);
            }
        }

        info!(
            target_device = %junos.identifier(),
            model = %junos.system_information.hardware_model,
            version = %junos.system_information.os_version,
            "Junos session started"
        );
        Ok(junos)
    }

    /// Close a device session; failures are only logged
    pub async fn close_session(&self, junos: JunosSession) {
        let identifier = junos.identifier().to_string();
        match junos.close().await {
            Ok(()) => debug!(target_device = %identifier, "Junos session closed"),
            Err(e) => warn!(target_device = %identifier, error = %e, "Failed to close Junos session"),
        }
    }

    /// Run a CLI command and return its text output
    pub async fn command(&self, cmd: &str, junos: &JunosSession) -> Result<String> {
        debug!(command = %cmd, "Running command");
        let reply = junos.rpc(&netconf::command(cmd)).await?;
        let output = reply.data.map(|d| unescape_xml(&d)).unwrap_or_default();
        if output.trim().is_empty() {
            return Err(Error::EmptyCommandOutput);
        }
        Ok(output)
    }

    /// Load `set`/`delete` lines into the candidate configuration.
    ///
    /// Without a device session the lines are appended to the fake file.
    pub async fn config_set(&self, lines: &[String], junos: Option<&JunosSession>) -> Result<()> {
        match junos {
            Some(junos) => {
                debug!(lines = lines.len(), "Loading configuration lines");
                junos.rpc(&netconf::load_set(lines)).await?;
                Ok(())
            }
            None => match self.fake_create_setfile() {
                Some(path) => self.append_set_file(path, lines).await,
                None => Err(Error::NoSession),
            },
        }
    }

    async fn append_set_file(&self, path: &Path, lines: &[String]) -> Result<()> {
        let mut options = tokio::fs::OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        options.mode(self.config.file_mode()?);

        let mut file = options.open(path).await?;
        let mut content = String::new();
        for line in lines {
            content.push_str(line);
            content.push('\n');
        }
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        debug!(path = %path.display(), lines = lines.len(), "Appended lines to set file");
        Ok(())
    }

    /// Lock the candidate configuration
    pub async fn config_lock(&self, junos: &JunosSession) -> Result<()> {
        junos.rpc(netconf::lock_candidate()).await?;
        debug!(target_device = %junos.identifier(), "Candidate configuration locked");
        Ok(())
    }

    /// Commit the candidate configuration and release the lock.
    ///
    /// The warnings the device attached to the commit are returned alongside
    /// the outcome, failed commits included. A failed commit keeps the lock.
    pub async fn commit_conf(
        &self,
        log: &str,
        junos: &JunosSession,
    ) -> (Vec<NetconfError>, Result<()>) {
        let reply = match junos.send_rpc(&netconf::commit(log)).await {
            Ok(reply) => reply,
            Err(e) => return (Vec::new(), Err(e)),
        };
        let warnings = reply.warnings();
        for warning in &warnings {
            warn!(commit = %log, warning = %warning, "Commit warning");
        }
        if reply.has_errors() {
            return (warnings, Err(Error::Netconf(reply.error_list())));
        }
        info!(target_device = %junos.identifier(), commit = %log, "Configuration committed");

        let unlocked = junos.rpc(netconf::unlock_candidate()).await.map(|_| ());
        (warnings, unlocked)
    }

    /// Discard candidate changes and unlock, collecting every failure
    pub async fn config_clear(&self, junos: &JunosSession) -> Vec<Error> {
        let mut errors = Vec::new();

        if let Err(e) = junos.rpc(netconf::discard_changes()).await {
            warn!(error = %e, "Failed to discard candidate changes");
            errors.push(e);
        }
        if let Err(e) = junos.rpc(netconf::unlock_candidate()).await {
            warn!(error = %e, "Failed to unlock candidate configuration");
            errors.push(e);
        }

        errors
    }
}

/// One live NETCONF session with a device
pub struct JunosSession {
    connection: Arc<dyn Connection>,
    /// Platform facts gathered when the session started
    pub system_information: SystemInformation,
}

impl JunosSession {
    /// Connection identifier
    pub fn identifier(&self) -> &str {
        self.connection.identifier()
    }

    /// Send one RPC; `rpc-error` entries of severity error become [`Error::Netconf`]
    async fn rpc(&self, operation: &str) -> Result<NetconfResponse> {
        let response = self.send_rpc(operation).await?;
        if response.has_errors() {
            return Err(Error::Netconf(response.error_list()));
        }
        Ok(response)
    }

    /// Send one RPC and return the parsed reply, `rpc-error` entries included
    async fn send_rpc(&self, operation: &str) -> Result<NetconfResponse> {
        let (message_id, message) = netconf::rpc(operation);
        let reply = self.connection.send(&message).await?;
        let response = NetconfResponse::parse(&reply)?;

        if let Some(got) = response.message_id {
            if got != message_id {
                return Err(ConnectionError::Protocol(format!(
                    "reply message-id {} does not match request {}",
                    got, message_id
                ))
                .into());
            }
        }

        Ok(response)
    }

    async fn close(self) -> Result<()> {
        let closed = self.rpc(netconf::close_session()).await;
        self.connection.close().await?;
        closed.map(|_| ())
    }
}

//! Russh connection module
//!
//! NETCONF over SSH using the russh crate: authenticate, open the `netconf`
//! subsystem, exchange hellos, then carry one framed message at a time.

use async_trait::async_trait;
use russh::client::{Handle, Handler, Msg};
use russh::keys::key::PublicKey;
use russh::keys::load_secret_key;
use russh::{Channel, ChannelMsg};
use russh_keys::agent::client::AgentClient;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use super::config::{default_identity_files, RetryConfig, SshSettings};
use super::{Connection, ConnectionError, ConnectionResult, Connector, RusshError};
use crate::config::ProviderConfig;
use crate::netconf::{self, ServerHello, NETCONF_1_0_DELIMITER, NETCONF_SUBSYSTEM};

/// Client handler for russh.
///
/// Junos devices are commonly reached by address with freshly generated
/// host keys, so every key is accepted and its fingerprint logged.
struct ClientHandler {
    host: String,
}

#[async_trait]
impl Handler for ClientHandler {
    type Error = RusshError;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        debug!(
            host = %self.host,
            fingerprint = %server_public_key.fingerprint(),
            "Accepting device host key"
        );
        Ok(true)
    }
}

/// Subsystem channel plus bytes received past the last delimiter
struct ChannelState {
    channel: Channel<Msg>,
    pending: Vec<u8>,
}

/// NETCONF session carried by russh
pub struct RusshNetconfConnection {
    identifier: String,
    handle: Handle<ClientHandler>,
    state: Mutex<Option<ChannelState>>,
}

impl RusshNetconfConnection {
    /// Connect, authenticate and complete the hello exchange
    pub async fn connect(settings: &SshSettings) -> ConnectionResult<Self> {
        let identifier = settings.identifier();
        debug!(target_device = %identifier, "Connecting via NETCONF over SSH (russh)");

        let handle = Self::connect_with_retry(settings, &settings.retry).await?;

        let mut channel = handle.channel_open_session().await.map_err(|e| {
            ConnectionError::ConnectionFailed(format!("Failed to open channel: {}", e))
        })?;
        channel
            .request_subsystem(true, NETCONF_SUBSYSTEM)
            .await
            .map_err(|e| {
                ConnectionError::ConnectionFailed(format!(
                    "Failed to start {} subsystem: {}",
                    NETCONF_SUBSYSTEM, e
                ))
            })?;

        let mut state = ChannelState {
            channel,
            pending: Vec::new(),
        };

        let server_hello = read_message(&mut state).await?;
        let hello = ServerHello::parse(&server_hello)?;
        hello.require_candidate()?;
        write_message(&mut state, &netconf::client_hello()).await?;

        debug!(
            target_device = %identifier,
            session_id = ?hello.session_id,
            capabilities = hello.capabilities.len(),
            "NETCONF session established"
        );

        Ok(Self {
            identifier,
            handle,
            state: Mutex::new(Some(state)),
        })
    }

    /// Connect with retry logic
    async fn connect_with_retry(
        settings: &SshSettings,
        retry_config: &RetryConfig,
    ) -> ConnectionResult<Handle<ClientHandler>> {
        let mut last_error = None;

        for attempt in 0..retry_config.attempts {
            if attempt > 0 {
                let delay = retry_config.delay_for_attempt(attempt - 1);
                debug!(attempt = %attempt, delay = ?delay, "Retrying SSH connection");
                tokio::time::sleep(delay).await;
            }

            let result = match settings.connect_timeout {
                Some(timeout) => tokio::time::timeout(timeout, Self::do_connect(settings))
                    .await
                    .unwrap_or(Err(ConnectionError::Timeout(timeout.as_secs()))),
                None => Self::do_connect(settings).await,
            };

            match result {
                Ok(handle) => return Ok(handle),
                Err(e) => {
                    warn!(attempt = %attempt, error = %e, "SSH connection attempt failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ConnectionError::ConnectionFailed("Unknown connection error".to_string())
        }))
    }

    /// Perform the actual connection
    async fn do_connect(settings: &SshSettings) -> ConnectionResult<Handle<ClientHandler>> {
        let mut config = russh::client::Config::default();
        config.inactivity_timeout = Some(Duration::from_secs(3600));
        let config = Arc::new(config);

        let addr = format!("{}:{}", settings.host, settings.port);
        let socket = tokio::net::TcpStream::connect(&addr).await.map_err(|e| {
            ConnectionError::ConnectionFailed(format!("Failed to connect to {}: {}", addr, e))
        })?;

        socket.set_nodelay(true).map_err(|e| {
            ConnectionError::ConnectionFailed(format!("Failed to set TCP_NODELAY: {}", e))
        })?;

        let handler = ClientHandler {
            host: settings.host.clone(),
        };

        let mut session = russh::client::connect_stream(config, socket, handler)
            .await
            .map_err(|e| {
                ConnectionError::ConnectionFailed(format!("SSH handshake failed: {}", e))
            })?;

        Self::authenticate(&mut session, settings).await?;

        debug!("SSH connection established successfully");
        Ok(session)
    }

    /// Perform SSH authentication
    async fn authenticate(
        session: &mut Handle<ClientHandler>,
        settings: &SshSettings,
    ) -> ConnectionResult<()> {
        let user = settings.user.as_str();

        // 1. Explicit key file
        if let Some(key_path) = &settings.key_file {
            match Self::try_key_auth(session, user, key_path, settings.key_pass.as_deref()).await
            {
                Ok(()) => {
                    debug!(key = %key_path.display(), "Authenticated using key");
                    return Ok(());
                }
                Err(e) => trace!(error = %e, "Key authentication failed"),
            }
        }

        // 2. Password
        if let Some(password) = &settings.password {
            let authenticated = session
                .authenticate_password(user, password)
                .await
                .map_err(|e| {
                    ConnectionError::AuthenticationFailed(format!(
                        "Password authentication failed: {}",
                        e
                    ))
                })?;

            if authenticated {
                debug!("Authenticated using password");
                return Ok(());
            }
        }

        // 3. SSH agent
        if std::env::var_os("SSH_AUTH_SOCK").is_some()
            && Self::try_agent_auth(session, user).await.is_ok()
        {
            debug!("Authenticated using SSH agent");
            return Ok(());
        }

        // 4. Default identity files from ~/.ssh/
        for key_path in default_identity_files() {
            if Self::try_key_auth(session, user, &key_path, settings.key_pass.as_deref())
                .await
                .is_ok()
            {
                debug!(key = %key_path.display(), "Authenticated using key");
                return Ok(());
            }
        }

        Err(ConnectionError::AuthenticationFailed(
            "All authentication methods failed".to_string(),
        ))
    }

    /// Try SSH agent authentication
    async fn try_agent_auth(
        session: &mut Handle<ClientHandler>,
        user: &str,
    ) -> ConnectionResult<()> {
        let mut agent = AgentClient::connect_env().await.map_err(|e| {
            ConnectionError::AuthenticationFailed(format!("Failed to connect to SSH agent: {}", e))
        })?;

        let identities = agent.request_identities().await.map_err(|e| {
            ConnectionError::AuthenticationFailed(format!("Failed to get agent identities: {}", e))
        })?;

        if identities.is_empty() {
            return Err(ConnectionError::AuthenticationFailed(
                "SSH agent has no identities".to_string(),
            ));
        }

        for identity in identities {
            let (returned_agent, result) = session
                .authenticate_future(user, identity.clone(), agent)
                .await;
            agent = returned_agent;

            match result {
                Ok(true) => return Ok(()),
                Ok(false) => trace!("Identity rejected, trying next"),
                Err(e) => trace!(error = %e, "Agent authentication attempt failed"),
            }
        }

        Err(ConnectionError::AuthenticationFailed(
            "All SSH agent identities rejected".to_string(),
        ))
    }

    /// Try key-based authentication
    async fn try_key_auth(
        session: &mut Handle<ClientHandler>,
        user: &str,
        key_path: &Path,
        passphrase: Option<&str>,
    ) -> ConnectionResult<()> {
        if !key_path.exists() {
            return Err(ConnectionError::AuthenticationFailed(format!(
                "Key file not found: {}",
                key_path.display()
            )));
        }

        let key_pair = load_secret_key(key_path, passphrase).map_err(|e| {
            ConnectionError::AuthenticationFailed(format!(
                "Failed to load key {}: {}",
                key_path.display(),
                e
            ))
        })?;

        let authenticated = session
            .authenticate_publickey(user, Arc::new(key_pair))
            .await
            .map_err(|e| {
                ConnectionError::AuthenticationFailed(format!(
                    "Key authentication failed for {}: {}",
                    key_path.display(),
                    e
                ))
            })?;

        if authenticated {
            Ok(())
        } else {
            Err(ConnectionError::AuthenticationFailed(
                "Key authentication failed".to_string(),
            ))
        }
    }
}

#[async_trait]
impl Connection for RusshNetconfConnection {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    async fn send(&self, message: &str) -> ConnectionResult<String> {
        let mut guard = self.state.lock().await;
        let state = guard.as_mut().ok_or(ConnectionError::ConnectionClosed)?;

        trace!(target_device = %self.identifier, message = %message, "NETCONF send");
        write_message(state, message).await?;
        let reply = read_message(state).await?;
        trace!(target_device = %self.identifier, reply = %reply, "NETCONF receive");

        Ok(reply)
    }

    async fn close(&self) -> ConnectionResult<()> {
        if let Some(state) = self.state.lock().await.take() {
            let _ = state.channel.eof().await;
            let _ = state.channel.close().await;
        }

        let _ = self
            .handle
            .disconnect(
                russh::Disconnect::ByApplication,
                "Connection closed by client",
                "en",
            )
            .await;

        Ok(())
    }
}

/// Write one message followed by the end-of-message delimiter
async fn write_message(state: &mut ChannelState, message: &str) -> ConnectionResult<()> {
    let framed = format!("{}\n{}\n", message, NETCONF_1_0_DELIMITER);
    state
        .channel
        .data(framed.as_bytes())
        .await
        .map_err(|e| ConnectionError::ExchangeFailed(format!("Failed to write message: {}", e)))
}

/// Read channel data until the end-of-message delimiter
async fn read_message(state: &mut ChannelState) -> ConnectionResult<String> {
    let delimiter = NETCONF_1_0_DELIMITER.as_bytes();

    loop {
        if let Some(pos) = find_delimiter(&state.pending, delimiter) {
            let message: Vec<u8> = state.pending.drain(..pos).collect();
            state.pending.drain(..delimiter.len());
            return Ok(String::from_utf8_lossy(&message).trim().to_string());
        }

        match state.channel.wait().await {
            Some(ChannelMsg::Data { ref data }) => {
                state.pending.extend_from_slice(data);
            }
            Some(ChannelMsg::ExtendedData { ref data, ext }) => {
                if ext == 1 {
                    trace!(stderr = %String::from_utf8_lossy(data), "NETCONF stderr");
                }
            }
            Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                return Err(ConnectionError::ConnectionClosed);
            }
            Some(_) => {}
        }
    }
}

fn find_delimiter(buffer: &[u8], delimiter: &[u8]) -> Option<usize> {
    buffer
        .windows(delimiter.len())
        .position(|window| window == delimiter)
}

/// Connector opening russh NETCONF sessions
#[derive(Debug, Clone, Copy, Default)]
pub struct SshConnector;

#[async_trait]
impl Connector for SshConnector {
    async fn connect(&self, config: &ProviderConfig) -> ConnectionResult<Arc<dyn Connection>> {
        let settings = SshSettings::from_provider(config)?;
        let conn = RusshNetconfConnection::connect(&settings).await?;
        Ok(Arc::new(conn))
    }
}

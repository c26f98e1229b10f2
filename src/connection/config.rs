//! Connection settings module
//!
//! Turns the provider configuration into the concrete SSH parameters a
//! transport needs: target address, credentials, key candidates, connect
//! timeout and retry policy.

use std::path::PathBuf;
use std::time::Duration;

use super::ConnectionError;
use crate::config::ProviderConfig;

/// Default delay between retries in seconds
pub const DEFAULT_RETRY_DELAY: u64 = 1;

/// Upper bound for the delay between retries in seconds
pub const MAX_RETRY_DELAY: u64 = 10;

/// Resolved SSH parameters for one device
#[derive(Debug, Clone)]
pub struct SshSettings {
    /// Device address
    pub host: String,

    /// NETCONF port
    pub port: u16,

    /// Login user
    pub user: String,

    /// Password for password authentication
    pub password: Option<String>,

    /// Explicit private key
    pub key_file: Option<PathBuf>,

    /// Passphrase of the private key
    pub key_pass: Option<String>,

    /// Timeout for TCP connect plus SSH handshake, `None` waits forever
    pub connect_timeout: Option<Duration>,

    /// Retry policy for establishing the session
    pub retry: RetryConfig,
}

impl SshSettings {
    /// Build settings from provider configuration
    pub fn from_provider(config: &ProviderConfig) -> Result<Self, ConnectionError> {
        let host = config
            .ip
            .clone()
            .filter(|ip| !ip.is_empty())
            .ok_or_else(|| ConnectionError::InvalidConfig("device ip is not set".to_string()))?;

        let connect_timeout = match config.ssh_timeout_to_establish {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            host,
            port: config.port,
            user: config.username.clone(),
            password: config.password.clone(),
            key_file: config.sshkeyfile.as_deref().map(expand_path),
            key_pass: config.keypass.clone(),
            connect_timeout,
            retry: RetryConfig::with_attempts(config.ssh_retry_to_establish),
        })
    }

    /// `user@host:port`
    pub fn identifier(&self) -> String {
        format!("{}@{}:{}", self.user, self.host, self.port)
    }
}

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts (at least one)
    pub attempts: u32,

    /// Initial delay between retries
    pub retry_delay: Duration,

    /// Use exponential backoff
    pub exponential_backoff: bool,

    /// Maximum delay between retries
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 1,
            retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY),
            exponential_backoff: true,
            max_delay: Duration::from_secs(MAX_RETRY_DELAY),
        }
    }
}

impl RetryConfig {
    /// Retry policy making `attempts` tries in total
    pub fn with_attempts(attempts: u32) -> Self {
        Self {
            attempts: attempts.max(1),
            ..Self::default()
        }
    }

    /// Calculate delay before retry number `attempt` (0-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if self.exponential_backoff {
            let delay = self.retry_delay * 2u32.pow(attempt.min(10));
            delay.min(self.max_delay)
        } else {
            self.retry_delay
        }
    }
}

/// Expand `~` and environment variables in a path
pub fn expand_path(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or_else(|_| path.into());
    PathBuf::from(expanded.as_ref())
}

/// Get default identity files to try
pub fn default_identity_files() -> Vec<PathBuf> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
    let ssh_dir = home.join(".ssh");

    vec![
        ssh_dir.join("id_ed25519"),
        ssh_dir.join("id_ecdsa"),
        ssh_dir.join("id_rsa"),
    ]
    .into_iter()
    .filter(|p| p.exists())
    .collect()
}

//! Connection layer for device communication.
//!
//! A [`Connection`] carries framed NETCONF messages to one Junos device and
//! returns the raw reply. Everything above this layer (RPC building, reply
//! parsing, locking, commit) lives in [`crate::netconf`] and
//! [`crate::junos::session`], so the transport can be swapped for an
//! in-memory device in tests.
//!
//! # Supported Transports
//!
//! - **SSH** (via `russh`): the `netconf` subsystem with RFC 6242
//!   end-of-message framing (`russh` feature, default)
//!
//! # Example
//!
//! ```rust,ignore
//! use junos_provider::connection::{Connector, SshConnector};
//!
//! let conn = SshConnector.connect(&config).await?;
//! let reply = conn.send("<rpc message-id=\"1\"><get-system-information/></rpc>").await?;
//! conn.close().await?;
//! ```

/// Connection configuration helpers.
pub mod config;

/// NETCONF over SSH using russh.
#[cfg(feature = "russh")]
pub mod russh;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::ProviderConfig;

#[cfg(feature = "russh")]
pub use self::russh::{RusshNetconfConnection, SshConnector};

/// Russh-related error type - wraps russh::Error for the client Handler trait
#[cfg(feature = "russh")]
#[derive(Debug)]
pub struct RusshError(pub ::russh::Error);

#[cfg(feature = "russh")]
impl From<::russh::Error> for RusshError {
    fn from(err: ::russh::Error) -> Self {
        RusshError(err)
    }
}

#[cfg(feature = "russh")]
impl std::fmt::Display for RusshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Russh error: {}", self.0)
    }
}

#[cfg(feature = "russh")]
impl std::error::Error for RusshError {}

#[cfg(feature = "russh")]
impl From<::russh::Error> for ConnectionError {
    fn from(err: ::russh::Error) -> Self {
        ConnectionError::SshError(format!("Russh error: {}", err))
    }
}

/// Errors that can occur while talking to a device.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Failed to establish initial connection to the device.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Authentication was rejected by the device.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Sending a message or reading its reply failed.
    #[error("RPC exchange failed: {0}")]
    ExchangeFailed(String),

    /// Connection or operation timed out.
    #[error("Connection timeout after {0} seconds")]
    Timeout(u64),

    /// Configuration is invalid or incomplete.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// SSH-specific error from the underlying implementation.
    #[error("SSH error: {0}")]
    SshError(String),

    /// The device spoke something other than NETCONF 1.0.
    #[error("NETCONF protocol error: {0}")]
    Protocol(String),

    /// I/O error during connection operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Connection was closed unexpectedly.
    #[error("Connection closed")]
    ConnectionClosed,
}

/// Result type for connection operations.
pub type ConnectionResult<T> = Result<T, ConnectionError>;

/// A NETCONF message channel to one device.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the connection identifier (`user@host:port`)
    fn identifier(&self) -> &str;

    /// Send one NETCONF message (without framing) and return the reply
    /// (without framing).
    async fn send(&self, message: &str) -> ConnectionResult<String>;

    /// Close the connection
    async fn close(&self) -> ConnectionResult<()>;
}

/// Opens connections from provider configuration.
///
/// The provider session owns one connector and asks it for a fresh
/// connection for every CRUD operation.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a connection and complete the NETCONF hello exchange.
    async fn connect(&self, config: &ProviderConfig) -> ConnectionResult<Arc<dyn Connection>>;
}

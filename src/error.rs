//! Error types for junos-provider.
//!
//! Every failure a resource operation can surface is a variant of [`Error`].
//! Handlers turn them into [`Diagnostic`](crate::resources::diag::Diagnostic)
//! entries; nothing in the crate panics on a device or state failure.

use std::path::PathBuf;
use thiserror::Error;

use crate::connection::ConnectionError;
use crate::netconf::NetconfError;

/// Result type alias for junos-provider operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for junos-provider.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Transport / Session Errors
    // ========================================================================
    /// Transport-level failure (connect, authenticate, channel I/O).
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// The device answered an RPC with one or more `rpc-error` of severity error.
    #[error("{}", format_netconf_errors(.0))]
    Netconf(Vec<NetconfError>),

    /// A `<command>` RPC returned nothing at all.
    #[error("no output available - please check the syntax of your command")]
    EmptyCommandOutput,

    /// Fake mode is not enabled but an operation tried to use it.
    #[error("no live session available and fake mode is disabled")]
    NoSession,

    // ========================================================================
    // Existence Errors
    // ========================================================================
    /// Create found the object already on the device.
    #[error("{description} {name} already exists")]
    AlreadyExists {
        /// Human description of the object type (e.g. "security ipsec proposal")
        description: &'static str,
        /// Object name
        name: String,
    },

    /// Import could not find the object.
    #[error("don't find {description} with id '{id}' (id must be <name>)")]
    NotFoundForImport {
        /// Human description of the object type
        description: &'static str,
        /// Requested import id
        id: String,
    },

    /// The object is missing right after a successful commit.
    #[error("{description} {name} not exists after commit => check your config")]
    NotExistsAfterCommit {
        /// Human description of the object type
        description: &'static str,
        /// Object name
        name: String,
    },

    // ========================================================================
    // Parse Errors
    // ========================================================================
    /// An integer attribute could not be converted from device output.
    #[error("failed to convert value from '{line}' to integer: {source}")]
    IntConversion {
        /// The offending configuration line
        line: String,
        /// Conversion error
        #[source]
        source: std::num::ParseIntError,
    },

    // ========================================================================
    // Compatibility Errors
    // ========================================================================
    /// The device platform lacks the targeted feature.
    #[error("{feature} not compatible with Junos device {model}")]
    Incompatible {
        /// Feature name (resource description)
        feature: &'static str,
        /// Detected hardware model
        model: String,
    },

    // ========================================================================
    // Resource / State Errors
    // ========================================================================
    /// Resource type is not registered.
    #[error("Resource type '{0}' not found")]
    UnknownResource(String),

    /// An attribute failed schema validation.
    #[error("invalid value for '{attribute}': {message}")]
    Validation {
        /// Attribute name
        attribute: String,
        /// Error message
        message: String,
    },

    /// Writing a value into resource state failed.
    #[error("failed to set '{attribute}' in resource state: {message}")]
    StateWrite {
        /// Attribute name
        attribute: String,
        /// Error message
        message: String,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {source}")]
    ConfigParse {
        /// Path to the file
        path: PathBuf,
        /// TOML error
        #[source]
        source: toml::de::Error,
    },

    // ========================================================================
    // IO / Serialization Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

fn format_netconf_errors(errors: &[NetconfError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl Error {
    /// Creates a new validation error.
    pub fn validation(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// Creates a new state write error.
    pub fn state_write(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StateWrite {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) | Error::ConfigParse { .. } | Error::UnknownResource(_) => 2,
            _ => 1,
        }
    }
}

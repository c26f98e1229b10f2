//! # junos-provider - Junos configuration objects over NETCONF
//!
//! junos-provider manages configuration objects on a Junos device (IPsec
//! proposals, IKE proposals, application definitions) through a declarative
//! create/read/update/delete/import lifecycle. Each object type is a flat
//! options struct whose field table is turned into Junos `set`/`delete`
//! statements and parsed back from `show configuration ... | display set
//! relative` output.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           CLI Interface                             │
//! │                  (schema/create/read/update/delete/import)          │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Resource Registry                            │
//! │     junos_application, junos_security_{ike,ipsec}_proposal         │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!          ┌─────────────────────────┼─────────────────────────┐
//!          ▼                         ▼                         ▼
//! ┌─────────────────┐   ┌─────────────────────┐   ┌─────────────────────┐
//! │     Schema      │   │   CRUD handlers     │   │  set/delete lines   │
//! │  (validation)   │   │ (lock/commit/clear) │   │  + relative parser  │
//! └─────────────────┘   └─────────────────────┘   └─────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                  Junos Session (fake file or live)                  │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                   NETCONF over SSH (russh)                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use junos_provider::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ProviderConfig::load(None)?;
//!     let session = Session::with_ssh(config);
//!     let registry = ResourceRegistry::with_builtins();
//!
//!     let application = registry.get("junos_application")?;
//!     let mut data = application.import(&session, "ssh-app").await?;
//!     let diags = application.read(&session, &mut data).await;
//!     assert!(!diags.has_error());
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod connection;
pub mod error;
pub mod junos;
pub mod logging;
pub mod netconf;
pub mod resources;

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    // Configuration
    pub use crate::config::ProviderConfig;

    // Connection types
    pub use crate::connection::config::RetryConfig;
    #[cfg(feature = "russh")]
    pub use crate::connection::{RusshNetconfConnection, SshConnector};
    pub use crate::connection::{Connection, ConnectionError, ConnectionResult, Connector};

    // Error handling
    pub use crate::error::{Error, Result};

    // Device sessions
    pub use crate::junos::{JunosSession, Session, SystemInformation};

    // Resources
    pub use crate::resources::{
        ConfigObject, Diagnostics, Resource, ResourceData, ResourceRegistry, Schema,
    };
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

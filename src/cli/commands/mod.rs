//! Subcommands module for junos-provider CLI
//!
//! This module contains all the subcommand implementations.

pub mod resource;
pub mod schema;

use std::sync::Arc;

use junos_provider::config::ProviderConfig;
use junos_provider::error::{Error, Result};
use junos_provider::junos::Session;
use junos_provider::resources::{Resource, ResourceRegistry};

use crate::cli::output::OutputFormatter;

/// Common context shared between commands
pub struct CommandContext {
    /// Provider configuration, absent for commands that never reach a device
    pub config: Option<ProviderConfig>,
    /// Output formatter
    pub output: OutputFormatter,
    /// Known resource types
    pub registry: ResourceRegistry,
}

impl CommandContext {
    /// Create a new command context from CLI arguments
    pub fn new(cli: &crate::cli::Cli, config: Option<ProviderConfig>) -> Self {
        Self {
            config,
            output: OutputFormatter::new(!cli.no_color, cli.is_json()),
            registry: ResourceRegistry::with_builtins(),
        }
    }

    /// Look up a resource type
    pub fn resource(&self, resource_type: &str) -> Result<Arc<dyn Resource>> {
        self.registry.get(resource_type)
    }

    /// Build the provider session from the loaded configuration
    pub fn session(&self) -> Result<Session> {
        let config = self
            .config
            .clone()
            .ok_or_else(|| Error::Config("no provider configuration loaded".to_string()))?;
        build_session(config)
    }

    /// Resource type plus a session to operate on it
    pub fn target(&self, resource_type: &str) -> Result<(Arc<dyn Resource>, Session)> {
        let resource = self.resource(resource_type)?;
        Ok((resource, self.session()?))
    }

    /// Report `err` and return its exit code
    pub fn fail(&self, err: &Error) -> i32 {
        self.output.error(&err.to_string());
        err.exit_code()
    }
}

#[cfg(feature = "russh")]
fn build_session(config: ProviderConfig) -> Result<Session> {
    Ok(Session::with_ssh(config))
}

#[cfg(not(feature = "russh"))]
fn build_session(_config: ProviderConfig) -> Result<Session> {
    Err(Error::Config(
        "built without the russh feature; no device transport available".to_string(),
    ))
}

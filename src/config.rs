//! Configuration module for junos-provider
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - User configuration (~/.config/junos-provider/config.toml)
//! - Project configuration (./junos-provider.toml)
//! - Environment variables (`JUNOS_*`)
//!
//! An explicit `--config` path replaces the file search.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default NETCONF port
pub const DEFAULT_PORT: u16 = 830;

/// Default login user
pub const DEFAULT_USERNAME: &str = "netconf";

/// Default permission of the fake-mode set file
pub const DEFAULT_FILE_PERMISSION: &str = "0644";

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Device address
    pub ip: Option<String>,

    /// NETCONF port
    pub port: u16,

    /// Login user
    pub username: String,

    /// Login password
    pub password: Option<String>,

    /// Private key file
    pub sshkeyfile: Option<String>,

    /// Passphrase of the private key
    pub keypass: Option<String>,

    /// Seconds to wait for the SSH session, 0 waits forever
    pub ssh_timeout_to_establish: u64,

    /// Attempts to establish the SSH session
    pub ssh_retry_to_establish: u32,

    /// Octal permission for the fake-mode set file
    pub file_permission: String,

    /// Write `set` lines of create to this file instead of a device
    pub fake_create_with_setfile: Option<PathBuf>,

    /// Also write update lines to the fake file
    pub fake_update_also: bool,

    /// Also write delete lines to the fake file
    pub fake_delete_also: bool,

    /// Log file receiving session traffic
    pub log_path: Option<PathBuf>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            ip: None,
            port: DEFAULT_PORT,
            username: DEFAULT_USERNAME.to_string(),
            password: None,
            sshkeyfile: None,
            keypass: None,
            ssh_timeout_to_establish: 0,
            ssh_retry_to_establish: 1,
            file_permission: DEFAULT_FILE_PERMISSION.to_string(),
            fake_create_with_setfile: None,
            fake_update_also: false,
            fake_delete_also: false,
            log_path: None,
        }
    }
}

impl ProviderConfig {
    /// Load configuration from all sources
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = ProviderConfig::default();

        for path in Self::get_config_paths(config_path) {
            if path.exists() {
                config = Self::from_file(&path)?;
                break;
            } else if config_path.is_some() {
                return Err(Error::Config(format!(
                    "configuration file not found: {}",
                    path.display()
                )));
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Get the list of configuration file paths to check, most specific first
    fn get_config_paths(explicit_path: Option<&PathBuf>) -> Vec<PathBuf> {
        if let Some(path) = explicit_path {
            return vec![path.clone()];
        }

        let mut paths = vec![PathBuf::from("junos-provider.toml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("junos-provider").join("config.toml"));
        }
        paths
    }

    /// Load from a specific TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("JUNOS_HOST") {
            self.ip = Some(host);
        }

        if let Ok(port) = std::env::var("JUNOS_PORT") {
            self.port = parse_env("JUNOS_PORT", &port)?;
        }

        if let Ok(user) = std::env::var("JUNOS_USERNAME") {
            self.username = user;
        }

        if let Ok(password) = std::env::var("JUNOS_PASSWORD") {
            self.password = Some(password);
        }

        if let Ok(keyfile) = std::env::var("JUNOS_KEYFILE") {
            self.sshkeyfile = Some(keyfile);
        }

        if let Ok(keypass) = std::env::var("JUNOS_KEYPASS") {
            self.keypass = Some(keypass);
        }

        if let Ok(timeout) = std::env::var("JUNOS_SSH_TIMEOUT_TO_ESTABLISH") {
            self.ssh_timeout_to_establish = parse_env("JUNOS_SSH_TIMEOUT_TO_ESTABLISH", &timeout)?;
        }

        if let Ok(retry) = std::env::var("JUNOS_SSH_RETRY_TO_ESTABLISH") {
            self.ssh_retry_to_establish = parse_env("JUNOS_SSH_RETRY_TO_ESTABLISH", &retry)?;
        }

        if let Ok(permission) = std::env::var("JUNOS_FILE_PERMISSION") {
            self.file_permission = permission;
        }

        if let Ok(path) = std::env::var("JUNOS_FAKECREATE_SETFILE") {
            self.fake_create_with_setfile = Some(PathBuf::from(path));
        }

        if let Ok(value) = std::env::var("JUNOS_FAKEUPDATE_ALSO") {
            self.fake_update_also = parse_bool("JUNOS_FAKEUPDATE_ALSO", &value)?;
        }

        if let Ok(value) = std::env::var("JUNOS_FAKEDELETE_ALSO") {
            self.fake_delete_also = parse_bool("JUNOS_FAKEDELETE_ALSO", &value)?;
        }

        if let Ok(path) = std::env::var("JUNOS_LOG_PATH") {
            self.log_path = Some(PathBuf::from(path));
        }

        Ok(())
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if (self.fake_update_also || self.fake_delete_also)
            && self.fake_create_with_setfile.is_none()
        {
            return Err(Error::Config(
                "fake_update_also and fake_delete_also need fake_create_with_setfile".to_string(),
            ));
        }

        if !(1..=10).contains(&self.ssh_retry_to_establish) {
            return Err(Error::Config(format!(
                "ssh_retry_to_establish must be between 1 and 10, got {}",
                self.ssh_retry_to_establish
            )));
        }

        self.file_mode()?;
        Ok(())
    }

    /// Fake-mode file permission as a mode value
    pub fn file_mode(&self) -> Result<u32> {
        u32::from_str_radix(self.file_permission.trim_start_matches("0o"), 8)
            .ok()
            .filter(|mode| *mode <= 0o777)
            .ok_or_else(|| {
                Error::Config(format!(
                    "file_permission '{}' is not an octal permission",
                    self.file_permission
                ))
            })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("invalid {} '{}': {}", name, value, e)))
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" => Ok(true),
        "0" | "false" | "f" | "no" | "" => Ok(false),
        _ => Err(Error::Config(format!("invalid {} '{}': not a boolean", name, value))),
    }
}

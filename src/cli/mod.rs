//! CLI module for junos-provider
//!
//! Argument parsing and subcommand dispatch for driving the resource
//! lifecycle from the command line.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Manage Junos configuration objects over NETCONF
#[derive(Parser, Debug, Clone)]
#[command(name = "junos-provider")]
#[command(version)]
#[command(about = "Declarative create/read/update/delete/import of Junos configuration objects", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "JUNOS_PROVIDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty JSON state, colored diagnostics
    #[default]
    Text,
    /// Compact JSON state, JSON diagnostics
    Json,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print resource schemas as JSON
    Schema(commands::schema::SchemaArgs),

    /// Create an object
    Create(commands::resource::WriteArgs),

    /// Read an object by id
    Read(commands::resource::IdArgs),

    /// Replace the configuration of an existing object
    Update(commands::resource::WriteArgs),

    /// Delete an object by id
    Delete(commands::resource::IdArgs),

    /// Import an existing object by id (its name)
    Import(commands::resource::IdArgs),
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-3)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }

    /// Check if JSON output is requested
    pub fn is_json(&self) -> bool {
        matches!(self.output, OutputFormat::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "junos-provider",
            "create",
            "junos_application",
            "-a",
            "name=ssh-app",
            "-a",
            "protocol=tcp",
        ])
        .unwrap();
        match cli.command {
            Commands::Create(args) => {
                assert_eq!(args.resource_type, "junos_application");
                assert_eq!(args.attributes.len(), 2);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_verbosity_and_output() {
        let cli = Cli::try_parse_from([
            "junos-provider",
            "-vvvv",
            "--output",
            "json",
            "read",
            "junos_application",
            "ssh-app",
        ])
        .unwrap();
        assert_eq!(cli.verbosity(), 3);
        assert!(cli.is_json());
    }

    #[test]
    fn test_id_required() {
        assert!(Cli::try_parse_from(["junos-provider", "import", "junos_application"]).is_err());
    }
}

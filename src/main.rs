//! junos-provider - Junos configuration objects over NETCONF
//!
//! This is the main entry point for the junos-provider CLI.

mod cli;

use anyhow::Result;
use cli::commands::CommandContext;
use cli::{Cli, Commands};
use junos_provider::config::ProviderConfig;
use junos_provider::logging::init_logging;
use junos_provider::VERSION;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Commands that never reach a device run without provider configuration
    let config = match &cli.command {
        Commands::Schema(_) => None,
        _ => match ProviderConfig::load(cli.config.as_ref()) {
            Ok(config) => Some(config),
            Err(e) => {
                init_logging(cli.verbosity(), None)?;
                let ctx = CommandContext::new(&cli, None);
                std::process::exit(ctx.fail(&e));
            }
        },
    };

    let log_path = config.as_ref().and_then(|c| c.log_path.clone());
    init_logging(cli.verbosity(), log_path.as_deref())?;

    if cli.verbosity() >= 2 {
        eprintln!("junos-provider v{}", VERSION);
    }

    let ctx = CommandContext::new(&cli, config);

    // Execute the appropriate command
    let exit_code = match &cli.command {
        Commands::Schema(args) => args.execute(&ctx)?,
        Commands::Create(args) => args.create(&ctx).await?,
        Commands::Read(args) => args.read(&ctx).await?,
        Commands::Update(args) => args.update(&ctx).await?,
        Commands::Delete(args) => args.delete(&ctx).await?,
        Commands::Import(args) => args.import(&ctx).await?,
    };

    std::process::exit(exit_code);
}

//! chamictl - command-line client for cluster boot, inventory, cloud-init
//! and power services.
//!
//! Each subcommand resolves a base URI and access token from the layered
//! configuration and global flags, issues HTTP requests and prints the
//! response bodies in the requested format.

mod cli;
mod commands;
mod context;
mod error;
mod logging;
mod output;
mod prompt;

use clap::Parser;
use tracing::instrument::WithSubscriber;

use chamictl_core::config::{Config, ConfigStore};

use cli::{Cli, Commands};
use context::Context;
use error::{exit_codes, CliError};
use logging::LogSettings;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            if e.is_reportable() {
                eprintln!("Error: {}", e);
            }
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let early = LogSettings::resolve(None, None, cli.log_level, cli.log_format);
    let config = load_config(&cli)
        .with_subscriber(logging::dispatch(&early))
        .await?;

    let settings = LogSettings::resolve(
        config.log.level.as_deref(),
        config.log.format.as_deref(),
        cli.log_level,
        cli.log_format,
    );
    logging::init(&settings);
    tracing::debug!(?settings, "logging initialized");

    let ctx = Context::new(config, cli.conn, cli.format_output);

    match cli.command {
        Commands::Config(args) => commands::run_config(args, cli.config.as_deref(), &ctx).await,
        Commands::Bss(args) => commands::run_bss(args, &ctx).await,
        Commands::Smd(args) => commands::run_smd(args, &ctx).await,
        Commands::CloudInit(args) => commands::run_cloud_init(args, &ctx).await,
        Commands::Pcs(args) => commands::run_pcs(args, &ctx).await,
    }
}

/// Configuration the command runs with. `config` subcommands may target a
/// file that does not exist yet, so a missing `--config` file is not an
/// error for them.
async fn load_config(cli: &Cli) -> Result<Config, CliError> {
    if cli.ignore_config {
        return Ok(Config::default());
    }

    if let (Commands::Config(_), Some(path)) = (&cli.command, cli.config.as_deref()) {
        if !path.exists() {
            return Ok(Config::default());
        }
    }

    Ok(ConfigStore::default().load(cli.config.as_deref()).await?)
}

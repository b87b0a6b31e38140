//! Bankeu CLI entry point.

use clap::Parser;

use bankeu::cli::{commands, handle_error, Cli, Commands};
use bankeu::infrastructure::config::ConfigLoader;
use bankeu::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => handle_error(err.context("Failed to load configuration"), cli.json),
    };

    // Keep the guard alive so buffered file logs are flushed on exit
    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => Some(logger),
        Err(err) => {
            eprintln!("warning: logging disabled: {err:#}");
            None
        }
    };

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args, cli.json).await,
        Commands::Proposal(args) => commands::proposal::execute(args, config, cli.json).await,
        Commands::Setup(args) => commands::setup::execute(args, config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}

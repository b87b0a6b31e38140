//! CLI type definitions
//!
//! Top-level clap structures; each subcommand's arguments live next to its
//! implementation in `cli::commands`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::init::InitArgs;
use crate::cli::commands::proposal::ProposalArgs;
use crate::cli::commands::setup::SetupArgs;

#[derive(Parser, Debug)]
#[command(name = "bankeu")]
#[command(about = "Bankeu - regional-assistance proposal verification", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this file instead of .bankeu/config.yaml
    #[arg(short, long, global = true, env = "BANKEU_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize bankeu configuration and database
    Init(InitArgs),

    /// List, inspect and decide on proposals
    Proposal(ProposalArgs),

    /// Manage the signing setup required before approving
    Setup(SetupArgs),
}

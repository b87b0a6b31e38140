//! Implementation of the `bankeu init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::fs;

use crate::adapters::sqlite::initialize_database;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::CONFIG_DIR;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub initialized_path: PathBuf,
    pub directories_created: Vec<String>,
    pub config_written: bool,
    pub database_path: PathBuf,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if !self.directories_created.is_empty() {
            lines.push("\nCreated directories:".to_string());
            for dir in &self.directories_created {
                lines.push(format!("  - {dir}"));
            }
        }
        if self.config_written {
            lines.push(format!("\nWrote {CONFIG_DIR}/config.yaml"));
        }
        lines.push(format!("Database ready at {}", self.database_path.display()));
        lines.join("\n")
    }
}

/// Starter configuration written by `init`.
pub fn starter_config() -> Result<String> {
    let yaml =
        serde_yaml::to_string(&Config::default()).context("Failed to render default config")?;
    Ok(format!(
        "# bankeu configuration. Values here are overridden by {CONFIG_DIR}/local.yaml\n\
         # and BANKEU_* environment variables (BANKEU_ACTOR__ROLE=superadmin).\n{yaml}"
    ))
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(&args.path)
    };

    let bankeu_dir = target_path.join(CONFIG_DIR);
    let config_path = bankeu_dir.join("config.yaml");

    let mut directories_created = vec![];
    for dir in [bankeu_dir.clone(), bankeu_dir.join("logs")] {
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .await
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let relative = dir
                .strip_prefix(&target_path)
                .unwrap_or(&dir)
                .to_string_lossy()
                .to_string();
            directories_created.push(relative);
        }
    }

    let config_written = if !config_path.exists() || args.force {
        fs::write(&config_path, starter_config()?)
            .await
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        true
    } else {
        false
    };

    let database_path = bankeu_dir.join("bankeu.db");
    let db_url = format!("sqlite:{}", database_path.display());
    initialize_database(&db_url, None)
        .await
        .context("Failed to initialize database")?;

    let message = match (config_written, args.force) {
        (true, true) => "Project reinitialized.",
        (true, false) => "Project initialized.",
        (false, _) => {
            "Project already initialized; database schema is up to date. \
             Use --force to rewrite the config."
        }
    };

    output(
        &InitOutput {
            success: true,
            message: message.to_string(),
            initialized_path: target_path,
            directories_created,
            config_written,
            database_path,
        },
        json_mode,
    );
    Ok(())
}

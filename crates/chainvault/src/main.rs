// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chainvault - a password vault unlocked by a chain of hinted passwords.
//!
//! This is the command-line front-end. Every vault operation runs on the
//! keeper worker; the CLI blocks on each command handle in turn.

mod commands;
mod prompt;
mod session;

use std::path::PathBuf;

use chainvault_config::ChainVaultConfig;
use chainvault_core::ChainVaultError;
use chainvault_keeper::VaultContext;
use clap::{Parser, Subcommand};

use crate::prompt::PasswordSource;

/// Chainvault - a password vault unlocked by a chain of hinted passwords.
#[derive(Parser, Debug)]
#[command(name = "chainvault", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the usual locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an empty vault protected by one password per hint.
    Create {
        path: PathBuf,
        /// Hint shown before the matching password is asked for. Repeat in
        /// unlock order.
        #[arg(long = "hint", required = true)]
        hints: Vec<String>,
    },
    /// List entry names and kinds.
    List { path: PathBuf },
    /// Print the value of a text entry.
    Show { path: PathBuf, name: String },
    /// Add a text entry or replace its value.
    Put { path: PathBuf, name: String },
    /// Store a file as an entry.
    Attach {
        path: PathBuf,
        name: String,
        file: PathBuf,
    },
    /// Write a file entry back to disk.
    Extract {
        path: PathBuf,
        name: String,
        out: PathBuf,
    },
    /// Delete an entry.
    Remove { path: PathBuf, name: String },
}

fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => chainvault_config::load_and_validate_path(path),
        None => chainvault_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            chainvault_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.log_level);

    if let Err(e) = run(cli.command, &config) {
        eprintln!("chainvault: {e}");
        std::process::exit(1);
    }
}

fn run(command: Commands, config: &ChainVaultConfig) -> Result<(), ChainVaultError> {
    let mut context = VaultContext::from_config(config)?;
    let mut passwords = PasswordSource::detect()?;
    let result = match &command {
        Commands::Create { path, hints } => {
            commands::create(&mut context, path, hints, &mut passwords)
        }
        Commands::List { path } => commands::list(&mut context, path, &mut passwords),
        Commands::Show { path, name } => commands::show(&mut context, path, name, &mut passwords),
        Commands::Put { path, name } => commands::put(&mut context, path, name, &mut passwords),
        Commands::Attach { path, name, file } => {
            commands::attach(&mut context, path, name, file, &mut passwords)
        }
        Commands::Extract { path, name, out } => {
            commands::extract(&mut context, path, name, out, &mut passwords)
        }
        Commands::Remove { path, name } => {
            commands::remove(&mut context, path, name, &mut passwords)
        }
    };
    context.shutdown();
    result
}

/// Initializes the tracing subscriber with the given log level.
///
/// Output goes to stderr so entry values on stdout stay pipeable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("chainvault={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(true)
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn create_requires_a_hint() {
        assert!(Cli::try_parse_from(["chainvault", "create", "v.bin"]).is_err());
        let cli = Cli::try_parse_from([
            "chainvault",
            "create",
            "v.bin",
            "--hint",
            "pet",
            "--hint",
            "city",
        ])
        .unwrap();
        match cli.command {
            Commands::Create { hints, .. } => assert_eq!(hints, ["pet", "city"]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli =
            Cli::try_parse_from(["chainvault", "list", "v.bin", "--config", "alt.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
    }
}

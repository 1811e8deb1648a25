//! typo3-config - Inspect and apply layered TYPO3 configuration.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Build the runtime environment (project path, context, interactivity).
//! - Run the configuration loaders and print or apply their output.
//!
//! Does NOT handle:
//! - Reading or merging configuration (see `typo3-config-loader`).
//!
//! Invariants:
//! - `load_dotenv()` is called BEFORE CLI parsing to allow `.env` to provide clap defaults.
//! - Logs go to stderr; stdout carries command output only.

mod args;
mod commands;
mod error;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use commands::LoadOptions;
use error::{ExitCode, ExitCodeExt};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use typo3_config_loader::{Environment, load_dotenv};

fn main() {
    // Load .env file BEFORE CLI parsing so clap env defaults can read .env values
    if let Err(e) = load_dotenv() {
        eprintln!("Failed to load environment: {}", e);
        std::process::exit(ExitCode::GeneralError.as_i32());
    }

    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{:#}", e);
            e.exit_code().as_i32()
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let environment = build_environment(&cli)?;

    match cli.command {
        Commands::Show { cached, output } => {
            commands::show::run(environment, cached, output)?;
        }
        Commands::Env {
            cached,
            no_solr,
            output,
        } => {
            let options = LoadOptions {
                cached,
                solr: !no_solr,
            };
            commands::env::run(environment, options, output)?;
        }
        Commands::Exec {
            cached,
            no_solr,
            command,
        } => {
            let options = LoadOptions {
                cached,
                solr: !no_solr,
            };
            return commands::exec::run(environment, options, &command);
        }
    }

    Ok(ExitCode::Success.as_i32())
}

/// Environment from the global flags; blank values fall back to the defaults.
fn build_environment(cli: &Cli) -> Result<Environment> {
    Ok(Environment::resolve(
        cli.context.as_deref(),
        cli.project_path.as_deref(),
    )?)
}

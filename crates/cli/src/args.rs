//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Read the project path and application context from the environment.
//!
//! Non-responsibilities:
//! - Does not load configuration (see `commands`).

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use typo3_config_loader::constants::{APPLICATION_CONTEXT_VAR, PROJECT_PATH_VAR};

#[derive(Parser, Debug)]
#[command(name = "typo3-config")]
#[command(about = "Load layered TYPO3 configuration and export it as environment variables", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  typo3-config show -o yaml\n  typo3-config env --cached\n  typo3-config --context Development/Local exec -- vendor/bin/typo3 cache:flush\n"
)]
pub struct Cli {
    /// Project root containing app/config/environment and var/
    #[arg(long, global = true, env = PROJECT_PATH_VAR, value_name = "DIR")]
    pub project_path: Option<PathBuf>,

    /// Application context, e.g. Production/Staging (default: Production)
    #[arg(long, global = true, env = APPLICATION_CONTEXT_VAR)]
    pub context: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the merged configuration
    Show {
        /// Reuse the merged configuration cached under var/cache
        #[arg(long)]
        cached: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ShowFormat::Json)]
        output: ShowFormat,
    },

    /// Print the derived environment variables
    Env {
        /// Reuse the merged configuration cached under var/cache
        #[arg(long)]
        cached: bool,

        /// Skip the PHP_SOLR_* variables
        #[arg(long)]
        no_solr: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = EnvFormat::Dotenv)]
        output: EnvFormat,
    },

    /// Run a command with the derived environment variables set
    Exec {
        /// Reuse the merged configuration cached under var/cache
        #[arg(long)]
        cached: bool,

        /// Skip the PHP_SOLR_* variables
        #[arg(long)]
        no_solr: bool,

        /// Program and arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true, value_name = "COMMAND")]
        command: Vec<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShowFormat {
    Json,
    Yaml,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvFormat {
    Dotenv,
    Json,
}

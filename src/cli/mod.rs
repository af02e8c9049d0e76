//! CLI interface and argument parsing
//!
//! Each invocation runs one leg of one exchange and exits: the surrounding
//! scheduler decides cadence. Exit codes: 0 on success, 2 for configuration
//! errors, 5 for runtime failures.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};

/// NHS registry reconciliation bridge over MESH
#[derive(Parser, Debug)]
#[command(name = "meshbridge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "meshbridge.toml", env = "MESHBRIDGE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MESHBRIDGE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send request files for a registry to MESH
    Send(commands::send::SendArgs),

    /// Retrieve and process a registry's MESH inbox
    Retrieve(commands::retrieve::RetrieveArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}

/// Which upstream registry a command targets.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Personal Demographics Service
    Pds,
    /// National Data Opt-Out
    Ndop,
}

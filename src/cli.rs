// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::types::BackendKind;

/// Command-line arguments for `stageflow`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "stageflow",
    version,
    about = "Resolve staging actions and drive condition-triggered task execution.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Stageflow.toml` in the current working directory. A missing
    /// default file means built-in defaults; an explicitly named file must
    /// exist.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `STAGEFLOW_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Load and validate the configuration, then print it.
    Check,

    /// Print the staging rule table.
    Rules {
        /// Only list rules whose mode is not `unsupported`.
        #[arg(long)]
        supported: bool,
    },

    /// Resolve an action file and print the resulting units.
    Resolve {
        /// TOML file with `[[action]]` entries.
        actions: PathBuf,

        /// Override `[backend].kind` from the config.
        #[arg(long, value_name = "KIND")]
        backend: Option<BackendKind>,
    },

    /// Run an action file as one task on the local shell backend.
    Exec {
        /// TOML file with `[[action]]` entries.
        actions: PathBuf,

        /// Working directory the commands run in.
        #[arg(long, value_name = "DIR", default_value = ".")]
        workdir: PathBuf,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

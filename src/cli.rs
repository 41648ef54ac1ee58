// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `buildagent`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "buildagent",
    version,
    about = "Run a job instance's task groups and report its lifecycle to the store.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Agent.toml` in the current working directory if it exists,
    /// built-in defaults otherwise.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Override `[store].path` from the config file.
    #[arg(long, value_name = "PATH", global = true)]
    pub store: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BUILDAGENT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Execute one job instance.
    Run {
        /// Job instance identity, e.g. `jobInstance:42`.
        #[arg(value_name = "INSTANCE")]
        instance: String,
    },

    /// Tokenize a raw command line and print the result as JSON.
    Parse {
        #[arg(value_name = "COMMAND_LINE")]
        command_line: String,
    },

    /// List freeze points currently holding task groups.
    FreezePoints {
        /// Only show freeze points of this job instance.
        #[arg(long, value_name = "INSTANCE")]
        instance: Option<String>,
    },

    /// Resume a frozen task group by removing its freeze point.
    Resume {
        #[arg(value_name = "FREEZE_POINT")]
        freeze_point: String,
    },

    /// Parse + validate the config file and print it, without running anything.
    Check,
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

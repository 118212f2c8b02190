// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `probo`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "probo",
    version,
    about = "Benchmark argumentation solvers for correctness and runtime.",
    long_about = None
)]
pub struct CliArgs {
    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PROBO_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the benchmark sweep and append to the run log.
    Run {
        /// Path to the config file (TOML).
        #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
        config: PathBuf,

        /// Validate the config and print the planned sweep without invoking
        /// any solver.
        #[arg(long)]
        dry_run: bool,

        /// Do not print a progress line per invocation.
        #[arg(long)]
        quiet: bool,
    },

    /// Replay a run log and print per-solver statistics.
    Analyze {
        /// Config the run used; its `[sampling]` section tells how many
        /// parameter records each decision problem has.
        #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
        config: PathBuf,

        /// Run log to analyse.
        #[arg(value_name = "LOG")]
        log: PathBuf,
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

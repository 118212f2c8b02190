// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Startup and analysis failures are fatal and carry a distinct process exit
//! status (see [`ProboError::exit_code`]). Per-leaf failures during a sweep
//! are logged by the driver and never reach `main`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProboError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Missing file or directory: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Unknown problem identifier: {0}")]
    UnknownProblem(String),

    #[error("Instance lists differ in length: {tgf} tgf files vs {apx} apx files")]
    InstanceMismatch { tgf: usize, apx: usize },

    #[error("Solver '{solver}' failed its capability probe: {reason}")]
    SolverProbe { solver: String, reason: String },

    #[error("Malformed timing output: {0}")]
    MalformedTimingOutput(String),

    #[error("Corrupted run log at line {line_no} ({reason}): {line}")]
    LogCorruption {
        line_no: usize,
        line: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProboError {
    /// Process exit status used by `main` for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProboError::MissingFile(_) => 3,
            ProboError::ConfigError(_) | ProboError::TomlError(_) => 4,
            ProboError::UnknownProblem(_) => 5,
            ProboError::InstanceMismatch { .. } => 6,
            ProboError::SolverProbe { .. } => 7,
            ProboError::LogCorruption { .. } => 8,
            ProboError::MalformedTimingOutput(_)
            | ProboError::IoError(_)
            | ProboError::Other(_) => 1,
        }
    }

    pub(crate) fn corruption(line_no: usize, line: &str, reason: impl Into<String>) -> Self {
        ProboError::LogCorruption {
            line_no,
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ProboError>;

// src/solver/mod.rs

//! Solvers under test.
//!
//! - [`probe`] asks a solver which problems and formats it supports.
//! - [`answer`] parses and writes the textual answer shapes.

pub mod answer;
pub mod probe;

use std::collections::BTreeSet;
use std::path::Path;

use crate::types::{Format, Problem};

pub use probe::{discover, ProbeOutcome};

/// A solver after capability discovery. Immutable for the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverDescriptor {
    /// Command line as configured (executable plus optional fixed args).
    pub command: String,
    /// File name of the executable; names the solver's error log.
    pub name: String,
    pub problems: BTreeSet<Problem>,
    pub format: Format,
}

impl SolverDescriptor {
    pub fn supports(&self, problem: &Problem) -> bool {
        self.problems.contains(problem)
    }

    pub fn argv(&self) -> Vec<String> {
        self.command.split_whitespace().map(str::to_string).collect()
    }
}

/// File name of the executable in a solver command line.
pub fn executable_name(command: &str) -> Option<String> {
    let exe = command.split_whitespace().next()?;
    Path::new(exe)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
}

/// Launchers that run the actual solver as their argument.
const LAUNCHERS: &[&str] = &[
    "sh", "bash", "dash", "zsh", "ksh", "env", "nice", "nohup", "perl", "ruby", "node", "java",
    "pypy", "pypy3",
];

fn is_launcher(name: &str) -> bool {
    LAUNCHERS.contains(&name)
        || name
            .strip_prefix("python")
            .is_some_and(|v| v.chars().all(|c| c.is_ascii_digit() || c == '.'))
}

/// Process name the solver's leftovers run under, for the reaper.
///
/// Interpreters and launchers in front of the solver are skipped along with
/// their flags and `VAR=value` assignments, so `bash /opt/solvers/run.sh`
/// yields `run.sh` rather than `bash`. `None` when only launchers remain.
pub fn reap_name(command: &str) -> Option<String> {
    command
        .split_whitespace()
        .filter(|token| !token.starts_with('-') && !token.contains('='))
        .filter_map(|token| Path::new(token).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .find(|name| !is_launcher(name))
}

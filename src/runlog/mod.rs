// src/runlog/mod.rs

//! The run log: an append-only, line-oriented record of a benchmark sweep.
//!
//! Every line is a one-character tag followed by `=` and a value:
//!
//! | tag | meaning                                   |
//! |-----|-------------------------------------------|
//! | `#` / `$` | start / end of a repetition         |
//! | `P` / `F` | start / end of a problem            |
//! | `S` | a solver supports the current problem     |
//! | `I` | instance file under test                  |
//! | `V` | solver under test                         |
//! | `A` | parameter (may be empty)                  |
//! | `C` | full command line                         |
//! | `O` | solver stdout, trimmed                    |
//! | `E` | solver stderr                             |
//! | `T` | `timeout` or `intime`                     |
//! | `R` | elapsed milliseconds, `-1` on timeout     |
//! | `X` / `Y` | general error: solver, then message |
//!
//! After `R` comes a verdict line `I;<cmd>;correct|incorrect;<ms>`.
//! Values escape `\`, newline and carriage return so each stays on one line.

pub mod reader;
pub mod record;
pub mod writer;

use std::collections::BTreeMap;

use crate::config::SamplingSection;
use crate::types::{ParameterKind, QueryKind};

pub use reader::{GeneralError, LogReader, LogReplay};
pub use record::RunRecord;
pub use writer::LogWriter;

pub const TAG_REPETITION_START: char = '#';
pub const TAG_REPETITION_END: char = '$';
pub const TAG_PROBLEM_START: char = 'P';
pub const TAG_PROBLEM_END: char = 'F';
pub const TAG_SUPPORTS: char = 'S';
pub const TAG_INSTANCE: char = 'I';
pub const TAG_SOLVER: char = 'V';
pub const TAG_PARAMETER: char = 'A';
pub const TAG_COMMAND: char = 'C';
pub const TAG_STDOUT: char = 'O';
pub const TAG_STDERR: char = 'E';
pub const TAG_TIMEOUT: char = 'T';
pub const TAG_RUNTIME: char = 'R';
pub const TAG_ERROR_SOLVER: char = 'X';
pub const TAG_ERROR_MESSAGE: char = 'Y';

pub const TIMEOUT: &str = "timeout";
pub const IN_TIME: &str = "intime";

/// Prefix of the `;`-flavored verdict line.
pub const VERDICT_PREFIX: &str = "I;";

pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape`]. Returns `None` on a dangling or unknown escape.
pub fn unescape(value: &str) -> Option<String> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '\\' => out.push('\\'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            _ => return None,
        }
    }
    Some(out)
}

/// How many parameters each query kind is sampled with per instance.
///
/// The reader uses it to decide whether the parameter index carries over to
/// the next record of the same instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterLayout {
    counts: BTreeMap<QueryKind, usize>,
}

impl ParameterLayout {
    pub fn from_sampling(sampling: &SamplingSection) -> Self {
        let counts = QueryKind::ALL
            .into_iter()
            .filter(|k| k.parameter() != ParameterKind::None)
            .map(|k| (k, sampling.count_for(k)))
            .collect();
        Self { counts }
    }

    /// Expected number of records per (solver, instance) for `kind`.
    pub fn expected(&self, kind: QueryKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(1).max(1)
    }
}

impl Default for ParameterLayout {
    fn default() -> Self {
        Self::from_sampling(&SamplingSection::default())
    }
}

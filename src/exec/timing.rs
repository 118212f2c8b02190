// src/exec/timing.rs

//! Timing wrapper handling.
//!
//! A timing wrapper (by default `time -p`) runs the solver and reports the
//! CPU time it used on stderr, after whatever the solver itself wrote:
//!
//! ```text
//! real 0.52
//! user 0.10
//! sys 0.02
//! ```

use crate::errors::{ProboError, Result};

/// Command prefix prepended to every solver invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingWrapper {
    pub prefix: Vec<String>,
}

impl TimingWrapper {
    /// Parse a wrapper command line. Returns `None` for an empty string,
    /// which disables the wrapper.
    pub fn parse(command: &str) -> Option<Self> {
        let prefix: Vec<String> = command.split_whitespace().map(str::to_string).collect();
        if prefix.is_empty() {
            None
        } else {
            Some(Self { prefix })
        }
    }

    /// Full argv for running `argv` under the wrapper.
    pub fn wrap(&self, argv: Vec<String>) -> Vec<String> {
        let mut out = self.prefix.clone();
        out.extend(argv);
        out
    }
}

/// Split wrapped stderr into the solver's own error output and the elapsed
/// CPU time in milliseconds.
///
/// The last two non-empty lines must be the `user` report followed by the
/// `sys` report, in that order. A
/// `real` line directly above them is dropped as well.
pub fn split_timing(stderr: &str) -> Result<(String, i64)> {
    let mut lines: Vec<&str> = stderr.lines().collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    if lines.len() < 2 {
        return Err(ProboError::MalformedTimingOutput(format!(
            "expected user/sys lines at the end of stderr, got {:?}",
            stderr.trim_end()
        )));
    }

    let last = lines.pop().unwrap_or_default();
    let second = lines.pop().unwrap_or_default();
    let (user_key, user_secs) = parse_timing_line(second)?;
    let (sys_key, sys_secs) = parse_timing_line(last)?;
    if (user_key, sys_key) != ("user", "sys") {
        return Err(ProboError::MalformedTimingOutput(format!(
            "expected a user line followed by a sys line, got {second:?} and {last:?}"
        )));
    }

    if lines
        .last()
        .is_some_and(|l| parse_timing_line(l).is_ok_and(|(key, _)| key == "real"))
    {
        lines.pop();
    }

    let elapsed_ms = (1000.0 * (user_secs + sys_secs)).round() as i64;
    Ok((lines.join("\n"), elapsed_ms))
}

fn parse_timing_line(line: &str) -> Result<(&str, f64)> {
    let mut parts = line.split_whitespace();
    let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ProboError::MalformedTimingOutput(format!(
            "not a timing line: {line:?}"
        )));
    };
    let secs: f64 = value.replace(',', ".").parse().map_err(|_| {
        ProboError::MalformedTimingOutput(format!("bad seconds value in {line:?}"))
    })?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(ProboError::MalformedTimingOutput(format!(
            "bad seconds value in {line:?}"
        )));
    }
    Ok((key, secs))
}

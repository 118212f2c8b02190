// src/solver/probe.rs

//! Capability probes: `<solver> --problems` and `<solver> --formats`.

use std::collections::BTreeSet;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, info};

use crate::errors::{ProboError, Result};
use crate::exec::{InvocationResult, Invoker};
use crate::types::{Format, Problem};

use super::{executable_name, SolverDescriptor};

static TOKEN_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\s,;\[\]]+").expect("token regex is valid"));

/// Result of probing one solver.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub descriptor: SolverDescriptor,
    /// Non-empty stderr produced by the probes, one entry per probe.
    pub diagnostics: Vec<String>,
}

/// Probe `command` for supported problems and formats.
///
/// Unrecognised tokens are skipped. The `cnf` format is dropped and the first
/// remaining format is selected.
pub async fn discover(invoker: &Invoker, command: &str, timeout: Duration) -> Result<ProbeOutcome> {
    let name = executable_name(command).ok_or_else(|| probe_error(command, "empty solver command"))?;
    let mut diagnostics = Vec::new();

    let problems_out = run_probe(invoker, command, "--problems", timeout, &mut diagnostics).await?;
    let problems: BTreeSet<Problem> = tokens(&problems_out)
        .filter_map(|t| match t.parse::<Problem>() {
            Ok(p) => Some(p),
            Err(e) => {
                debug!(solver = %command, token = %t, error = %e, "ignoring problem token");
                None
            }
        })
        .collect();
    if problems.is_empty() {
        return Err(probe_error(command, "--problems listed no known problem"));
    }

    let formats_out = run_probe(invoker, command, "--formats", timeout, &mut diagnostics).await?;
    let format = tokens(&formats_out)
        .filter_map(|t| t.parse::<Format>().ok())
        .find(|f| f.is_argumentation())
        .ok_or_else(|| probe_error(command, "--formats listed no usable format"))?;

    info!(
        solver = %command,
        problems = problems.len(),
        %format,
        "solver capabilities discovered"
    );

    Ok(ProbeOutcome {
        descriptor: SolverDescriptor {
            command: command.to_string(),
            name,
            problems,
            format,
        },
        diagnostics,
    })
}

async fn run_probe(
    invoker: &Invoker,
    command: &str,
    flag: &str,
    timeout: Duration,
    diagnostics: &mut Vec<String>,
) -> Result<String> {
    let mut argv: Vec<String> = command.split_whitespace().map(str::to_string).collect();
    argv.push(flag.to_string());

    let result = invoker
        .invoke_argv(&argv, timeout)
        .await
        .map_err(|e| probe_error(command, format!("{flag}: {e}")))?;

    match result {
        InvocationResult::Timeout => Err(probe_error(command, format!("{flag} timed out"))),
        InvocationResult::Completed(done) => {
            let stderr = done.stderr.trim();
            if !stderr.is_empty() {
                diagnostics.push(format!("{flag}: {stderr}"));
            }
            Ok(done.stdout)
        }
    }
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    TOKEN_RX.find_iter(text).map(|m| m.as_str())
}

fn probe_error(solver: &str, reason: impl Into<String>) -> ProboError {
    ProboError::SolverProbe {
        solver: solver.to_string(),
        reason: reason.into(),
    }
}

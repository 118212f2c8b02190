// src/config/validate.rs

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::model::{BenchmarkConfig, RawConfigFile};
use crate::errors::{ProboError, Result};
use crate::exec::TimingWrapper;
use crate::fs::{collect_files_with_extension, FileSystem};
use crate::instance::Instance;
use crate::types::Problem;

/// Validate a raw configuration and resolve it into a [`BenchmarkConfig`].
///
/// Every check here runs before the first solver invocation; any failure is
/// fatal for the run.
pub fn validate_config(raw: RawConfigFile, fs: &dyn FileSystem) -> Result<BenchmarkConfig> {
    let b = raw.benchmark;

    ensure_non_empty(&b.solvers, "solvers")?;
    ensure_non_empty(&b.problems, "problems")?;
    if b.repetitions == 0 {
        return Err(ProboError::ConfigError(
            "[benchmark].repetitions must be >= 1 (got 0)".to_string(),
        ));
    }
    if b.timeout == 0 {
        return Err(ProboError::ConfigError(
            "[benchmark].timeout must be >= 1 second (got 0)".to_string(),
        ));
    }

    let problems = parse_problems(&b.problems)?;

    if !fs.is_dir(&b.solutions) {
        return Err(ProboError::MissingFile(b.solutions.clone()));
    }

    let tgf = discover(fs, &b.files_tgf, "tgf")?;
    let apx = discover(fs, &b.files_apx, "apx")?;
    if tgf.len() != apx.len() {
        return Err(ProboError::InstanceMismatch {
            tgf: tgf.len(),
            apx: apx.len(),
        });
    }
    if tgf.is_empty() {
        return Err(ProboError::ConfigError(
            "no .tgf/.apx instance files found".to_string(),
        ));
    }
    let instances = tgf
        .into_iter()
        .zip(apx)
        .enumerate()
        .map(|(index, (tgf, apx))| Instance::new(index, tgf, apx))
        .collect();

    let timing_wrapper = TimingWrapper::parse(&b.timing_wrapper);

    Ok(BenchmarkConfig {
        solvers: b.solvers,
        problems,
        instances,
        solutions: b.solutions,
        timeout: Duration::from_secs(b.timeout),
        repetitions: b.repetitions,
        output: b.output,
        error_log_dir: b.error_log_dir,
        kill_processes: b.kill_processes,
        reap_solver_names: b.reap_solver_names,
        timing_wrapper,
        seed: b.seed,
        sampling: raw.sampling,
    })
}

fn ensure_non_empty(items: &[String], key: &str) -> Result<()> {
    if items.iter().all(|s| s.trim().is_empty()) {
        return Err(ProboError::ConfigError(format!(
            "[benchmark].{key} must list at least one entry"
        )));
    }
    Ok(())
}

fn parse_problems(ids: &[String]) -> Result<Vec<Problem>> {
    let mut seen = HashSet::new();
    let mut problems = Vec::with_capacity(ids.len());
    for id in ids {
        let problem: Problem = id
            .parse()
            .map_err(|_| ProboError::UnknownProblem(id.clone()))?;
        if !seen.insert(problem.clone()) {
            return Err(ProboError::ConfigError(format!(
                "problem '{problem}' is listed more than once"
            )));
        }
        problems.push(problem);
    }
    Ok(problems)
}

fn discover(fs: &dyn FileSystem, roots: &[PathBuf], ext: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for root in roots {
        if !fs.exists(root) {
            return Err(ProboError::MissingFile(root.clone()));
        }
        files.extend(collect_files_with_extension(fs, root, ext)?);
    }
    files.sort();
    files.dedup();
    Ok(files)
}

// src/analysis/mod.rs

//! Statistics recomputed from a replayed run log.
//!
//! A cell is one (instance, parameter index) pair of a solver on a problem.
//! A cell is solved when at least one of its repetitions finished in time;
//! timed-out repetitions never enter a mean.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::runlog::{LogReplay, RunRecord};
use crate::types::{Outcome, Problem};

#[derive(Debug, Clone, PartialEq)]
pub struct CellStats {
    pub instance: String,
    pub parameter_index: Option<usize>,
    pub repetitions: usize,
    pub timeouts: usize,
    /// Mean over the repetitions that finished in time.
    pub mean_runtime_ms: Option<f64>,
}

impl CellStats {
    pub fn solved(&self) -> bool {
        self.timeouts < self.repetitions
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverStats {
    pub solver: String,
    pub solved_instances: usize,
    pub correct: usize,
    /// Sum of the per-cell means of solved cells.
    pub total_runtime_ms: f64,
    /// Mean over every in-time repetition of solved cells.
    pub mean_runtime_ms: Option<f64>,
    pub cells: Vec<CellStats>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    pub problems: BTreeMap<Problem, Vec<SolverStats>>,
}

impl Statistics {
    pub fn solver(&self, problem: &Problem, solver: &str) -> Option<&SolverStats> {
        self.problems
            .get(problem)?
            .iter()
            .find(|s| s.solver == solver)
    }
}

type CellKey = (String, Option<usize>);

/// Aggregate a replay. Deterministic: the same replay always yields the same
/// statistics.
pub fn analyze(replay: &LogReplay) -> Statistics {
    let mut grouped: BTreeMap<Problem, BTreeMap<String, Vec<&RunRecord>>> = BTreeMap::new();

    for (problem, solvers) in &replay.supporting {
        let entry = grouped.entry(problem.clone()).or_default();
        for solver in solvers {
            entry.entry(solver.clone()).or_default();
        }
    }
    for record in &replay.records {
        grouped
            .entry(record.problem.clone())
            .or_default()
            .entry(record.solver.clone())
            .or_default()
            .push(record);
    }

    let problems = grouped
        .into_iter()
        .map(|(problem, solvers)| {
            let stats = solvers
                .into_iter()
                .map(|(solver, records)| solver_stats(solver, &records))
                .collect();
            (problem, stats)
        })
        .collect();

    Statistics { problems }
}

fn solver_stats(solver: String, records: &[&RunRecord]) -> SolverStats {
    let mut cells: BTreeMap<CellKey, Vec<&RunRecord>> = BTreeMap::new();
    for r in records {
        cells
            .entry((r.instance.clone(), r.parameter_index))
            .or_default()
            .push(r);
    }

    let mut pooled_sum = 0.0;
    let mut pooled_count = 0usize;
    let mut total_runtime_ms = 0.0;

    let cells: Vec<CellStats> = cells
        .into_iter()
        .map(|((instance, parameter_index), runs)| {
            let in_time: Vec<f64> = runs
                .iter()
                .filter(|r| !r.timed_out)
                .map(|r| r.elapsed_ms as f64)
                .collect();
            let mean_runtime_ms = mean(&in_time);
            if let Some(m) = mean_runtime_ms {
                total_runtime_ms += m;
                pooled_sum += in_time.iter().sum::<f64>();
                pooled_count += in_time.len();
            }
            CellStats {
                instance,
                parameter_index,
                repetitions: runs.len(),
                timeouts: runs.len() - in_time.len(),
                mean_runtime_ms,
            }
        })
        .collect();

    tracing::trace!(%solver, cells = cells.len(), "aggregated solver");

    SolverStats {
        solved_instances: cells.iter().filter(|c| c.solved()).count(),
        correct: records
            .iter()
            .filter(|r| r.outcome == Outcome::Correct)
            .count(),
        total_runtime_ms,
        mean_runtime_ms: (pooled_count > 0).then(|| pooled_sum / pooled_count as f64),
        cells,
        solver,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Render statistics as one tab-separated block per problem.
pub fn render_table(stats: &Statistics) -> String {
    let mut out = String::new();
    for (problem, solvers) in &stats.problems {
        let _ = writeln!(out, "Problem {problem}");
        let _ = writeln!(out, "solver\tsolved\ttotal\tmean\tcorrect");
        for s in solvers {
            let mean = s
                .mean_runtime_ms
                .map_or_else(|| "-".to_string(), |m| format!("{m:.2}ms"));
            let _ = writeln!(
                out,
                "{}\t{}\t{:.0}ms\t{}\t{}",
                s.solver, s.solved_instances, s.total_runtime_ms, mean, s.correct
            );
        }
        out.push('\n');
    }
    out
}

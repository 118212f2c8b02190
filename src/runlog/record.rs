// src/runlog/record.rs

use crate::types::{Outcome, Problem};

/// One solver invocation. Written once, never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    pub repetition: u32,
    pub problem: Problem,
    /// Solver command as configured.
    pub solver: String,
    /// Instance file handed to the solver.
    pub instance: String,
    /// Rendered parameter for parameterised problems.
    pub parameter: Option<String>,
    /// Position of the parameter among the instance's sampled parameters.
    pub parameter_index: Option<usize>,
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    pub outcome: Outcome,
    /// `-1` when the invocation timed out.
    pub elapsed_ms: i64,
}

impl RunRecord {
    /// Record for an invocation that hit its deadline.
    pub fn timeout(
        repetition: u32,
        problem: Problem,
        solver: impl Into<String>,
        instance: impl Into<String>,
        parameter: Option<(usize, String)>,
        command: impl Into<String>,
    ) -> Self {
        let (parameter_index, parameter) = match parameter {
            Some((i, p)) => (Some(i), Some(p)),
            None => (None, None),
        };
        Self {
            repetition,
            problem,
            solver: solver.into(),
            instance: instance.into(),
            parameter,
            parameter_index,
            command: command.into(),
            stdout: String::new(),
            stderr: String::new(),
            timed_out: true,
            outcome: Outcome::Incorrect,
            elapsed_ms: -1,
        }
    }

    /// The (repetition, problem, solver, instance, parameter) coordinate.
    pub fn coordinate(&self) -> (u32, &Problem, &str, &str, Option<usize>) {
        (
            self.repetition,
            &self.problem,
            &self.solver,
            &self.instance,
            self.parameter_index,
        )
    }
}

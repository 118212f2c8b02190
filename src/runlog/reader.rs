// src/runlog/reader.rs

//! Replays a run log into [`RunRecord`]s.
//!
//! Replay state is updated strictly in line order. Any line that does not
//! fit the state it arrives in is a corruption and aborts the replay.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use tracing::{debug, warn};

use crate::errors::{ProboError, Result};
use crate::fs::FileSystem;
use crate::types::{Outcome, ParameterKind, Problem};

use super::record::RunRecord;
use super::{
    unescape, ParameterLayout, IN_TIME, TAG_COMMAND, TAG_ERROR_MESSAGE, TAG_ERROR_SOLVER,
    TAG_INSTANCE, TAG_PARAMETER, TAG_PROBLEM_END, TAG_PROBLEM_START, TAG_REPETITION_END,
    TAG_REPETITION_START, TAG_RUNTIME, TAG_SOLVER, TAG_STDERR, TAG_STDOUT, TAG_SUPPORTS,
    TAG_TIMEOUT, TIMEOUT, VERDICT_PREFIX,
};

/// An error reported for a solver outside any instance (`X`/`Y` pair).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralError {
    pub solver: String,
    pub message: String,
}

/// Everything recovered from one run log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogReplay {
    pub records: Vec<RunRecord>,
    /// Solvers announced (`S`) for each problem.
    pub supporting: BTreeMap<Problem, BTreeSet<String>>,
    pub general_errors: Vec<GeneralError>,
}

#[derive(Debug, Clone, Default)]
pub struct LogReader {
    layout: ParameterLayout,
}

impl LogReader {
    pub fn new(layout: ParameterLayout) -> Self {
        Self { layout }
    }

    pub fn read_file(&self, fs: &dyn FileSystem, path: &Path) -> Result<LogReplay> {
        if !fs.is_file(path) {
            return Err(ProboError::MissingFile(path.to_path_buf()));
        }
        let text = fs.read_to_string(path)?;
        self.read_str(&text)
    }

    pub fn read_str(&self, text: &str) -> Result<LogReplay> {
        let mut lines: Vec<&str> = text.split('\n').collect();
        // A log that does not end in a newline was cut off mid-line.
        if let Some(last) = lines.pop() {
            if !last.is_empty() {
                warn!(line = %last, "ignoring incomplete trailing line in run log");
            }
        }

        let mut replay = Replay::new(&self.layout);
        for (i, line) in lines.iter().enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            replay.apply(i + 1, line)?;
        }
        replay.finish()
    }
}

/// In-progress fields of the record currently being replayed.
#[derive(Debug, Default)]
struct Pending {
    parameter: Option<String>,
    command: Option<String>,
    stdout: Option<String>,
    stderr: Option<String>,
    timed_out: Option<bool>,
}

struct Replay<'a> {
    layout: &'a ParameterLayout,
    out: LogReplay,

    repetition: Option<u32>,
    problem: Option<Problem>,
    instance: Option<String>,
    solver: Option<String>,
    parameter_index: Option<usize>,
    awaiting_result: bool,
    pending: Pending,

    /// Record a verdict line may still attach to.
    last_record: Option<usize>,
    error_solver: Option<String>,
    seen: HashSet<(u32, Problem, String, String, Option<usize>)>,
}

impl<'a> Replay<'a> {
    fn new(layout: &'a ParameterLayout) -> Self {
        Self {
            layout,
            out: LogReplay::default(),
            repetition: None,
            problem: None,
            instance: None,
            solver: None,
            parameter_index: None,
            awaiting_result: false,
            pending: Pending::default(),
            last_record: None,
            error_solver: None,
            seen: HashSet::new(),
        }
    }

    fn apply(&mut self, line_no: usize, line: &str) -> Result<()> {
        if line.trim().is_empty() {
            return Ok(());
        }
        if let Some(rest) = line.strip_prefix(VERDICT_PREFIX) {
            return self.verdict(line_no, line, rest);
        }

        let corrupt = |reason: &str| ProboError::corruption(line_no, line, reason);

        let mut chars = line.chars();
        let (Some(tag), Some('=')) = (chars.next(), chars.next()) else {
            return Err(corrupt("expected '<tag>=<value>'"));
        };
        let value = unescape(chars.as_str()).ok_or_else(|| corrupt("invalid escape sequence"))?;

        if tag != TAG_ERROR_MESSAGE && self.error_solver.is_some() {
            return Err(corrupt("solver error without message"));
        }
        if tag != TAG_RUNTIME {
            self.last_record = None;
        }

        match tag {
            TAG_REPETITION_START => {
                self.ensure_idle(line_no, line)?;
                let rep = value
                    .parse::<u32>()
                    .map_err(|_| corrupt("repetition is not a number"))?;
                self.repetition = Some(rep);
                self.problem = None;
                self.reset_instance();
            }
            TAG_REPETITION_END => {
                self.ensure_idle(line_no, line)?;
                let rep = value.parse::<u32>().ok();
                if rep.is_none() || rep != self.repetition {
                    return Err(corrupt("repetition end does not match its start"));
                }
                self.repetition = None;
                self.problem = None;
                self.reset_instance();
            }
            TAG_PROBLEM_START => {
                self.ensure_idle(line_no, line)?;
                let problem: Problem = value.parse().map_err(|e: String| corrupt(&e))?;
                self.problem = Some(problem);
                self.reset_instance();
            }
            TAG_PROBLEM_END => {
                self.ensure_idle(line_no, line)?;
                let problem: Problem = value.parse().map_err(|e: String| corrupt(&e))?;
                if self.problem.as_ref() != Some(&problem) {
                    return Err(corrupt("problem end does not match its start"));
                }
                self.problem = None;
                self.reset_instance();
            }
            TAG_SUPPORTS => {
                let problem = self
                    .problem
                    .clone()
                    .ok_or_else(|| corrupt("supporting solver outside a problem"))?;
                self.out.supporting.entry(problem).or_default().insert(value);
            }
            TAG_ERROR_SOLVER => {
                self.error_solver = Some(value);
            }
            TAG_ERROR_MESSAGE => {
                let solver = self
                    .error_solver
                    .take()
                    .ok_or_else(|| corrupt("error message without solver"))?;
                self.out.general_errors.push(GeneralError {
                    solver,
                    message: value,
                });
            }
            TAG_INSTANCE => {
                self.ensure_idle(line_no, line)?;
                if self.instance.as_deref() != Some(value.as_str()) {
                    self.parameter_index = None;
                }
                self.instance = Some(value);
                self.pending = Pending::default();
            }
            TAG_SOLVER => {
                self.ensure_idle(line_no, line)?;
                if self.solver.as_deref() != Some(value.as_str()) {
                    self.parameter_index = None;
                }
                self.solver = Some(value);
            }
            TAG_PARAMETER => {
                if self.awaiting_result {
                    return Err(corrupt("parameter before the previous result"));
                }
                self.parameter_index = Some(self.parameter_index.map_or(0, |i| i + 1));
                self.pending.parameter = (!value.is_empty()).then_some(value);
                self.awaiting_result = true;
            }
            TAG_COMMAND => self.pending.command = Some(value),
            TAG_STDOUT => self.pending.stdout = Some(value),
            TAG_STDERR => self.pending.stderr = Some(value),
            TAG_TIMEOUT => {
                self.ensure_context(line_no, line)?;
                let timed_out = match value.as_str() {
                    TIMEOUT => true,
                    IN_TIME => false,
                    _ => return Err(corrupt("expected 'timeout' or 'intime'")),
                };
                self.pending.timed_out = Some(timed_out);
            }
            TAG_RUNTIME => {
                self.ensure_context(line_no, line)?;
                let elapsed_ms = value
                    .parse::<i64>()
                    .map_err(|_| corrupt("runtime is not a number"))?;
                self.complete_record(line_no, line, elapsed_ms)?;
            }
            _ => return Err(corrupt("unknown tag")),
        }
        Ok(())
    }

    fn complete_record(&mut self, line_no: usize, line: &str, elapsed_ms: i64) -> Result<()> {
        let corrupt = |reason: &str| ProboError::corruption(line_no, line, reason);

        let timed_out = self
            .pending
            .timed_out
            .ok_or_else(|| corrupt("runtime without timeout marker"))?;
        let (Some(repetition), Some(problem), Some(instance), Some(solver)) = (
            self.repetition,
            self.problem.clone(),
            self.instance.clone(),
            self.solver.clone(),
        ) else {
            return Err(corrupt("result before repetition, problem, instance and solver"));
        };

        let kind = problem.kind;
        let parameterised = kind.parameter() != ParameterKind::None;
        let parameter_index = if parameterised {
            self.parameter_index
        } else {
            None
        };

        let pending = std::mem::take(&mut self.pending);
        let record = RunRecord {
            repetition,
            problem,
            solver,
            instance,
            parameter: if parameterised { pending.parameter } else { None },
            parameter_index,
            command: pending.command.unwrap_or_default(),
            stdout: pending.stdout.unwrap_or_default(),
            stderr: pending.stderr.unwrap_or_default(),
            timed_out,
            outcome: Outcome::Incorrect,
            elapsed_ms,
        };

        let (rep, problem, solver, instance, index) = record.coordinate();
        let key = (rep, problem.clone(), solver.to_string(), instance.to_string(), index);
        if !self.seen.insert(key) {
            return Err(corrupt("duplicate record for the same coordinate"));
        }
        debug!(line_no, command = %record.command, "replayed record");

        self.out.records.push(record);
        self.last_record = Some(self.out.records.len() - 1);
        self.awaiting_result = false;

        let more_expected = parameterised
            && self
                .parameter_index
                .is_some_and(|i| i + 1 < self.layout.expected(kind));
        if !more_expected {
            self.parameter_index = None;
        }
        Ok(())
    }

    fn verdict(&mut self, line_no: usize, line: &str, rest: &str) -> Result<()> {
        let corrupt = |reason: &str| ProboError::corruption(line_no, line, reason);

        let idx = self
            .last_record
            .take()
            .ok_or_else(|| corrupt("verdict without a preceding record"))?;

        let mut parts = rest.rsplitn(3, ';');
        let (Some(ms), Some(outcome), Some(command)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(corrupt("expected 'I;<cmd>;<outcome>;<ms>'"));
        };
        let command = unescape(command).ok_or_else(|| corrupt("invalid escape sequence"))?;
        let outcome: Outcome = outcome.parse().map_err(|e: String| corrupt(&e))?;
        let ms: i64 = ms.parse().map_err(|_| corrupt("runtime is not a number"))?;

        let record = &mut self.out.records[idx];
        if record.command != command || record.elapsed_ms != ms {
            return Err(corrupt("verdict does not match the preceding record"));
        }
        record.outcome = outcome;
        Ok(())
    }

    fn ensure_idle(&self, line_no: usize, line: &str) -> Result<()> {
        if self.awaiting_result {
            return Err(ProboError::corruption(
                line_no,
                line,
                "record interrupted before its result",
            ));
        }
        Ok(())
    }

    fn ensure_context(&self, line_no: usize, line: &str) -> Result<()> {
        if self.repetition.is_none()
            || self.problem.is_none()
            || self.instance.is_none()
            || self.solver.is_none()
        {
            return Err(ProboError::corruption(
                line_no,
                line,
                "result before repetition, problem, instance and solver",
            ));
        }
        Ok(())
    }

    fn reset_instance(&mut self) {
        self.instance = None;
        self.solver = None;
        self.parameter_index = None;
        self.pending = Pending::default();
    }

    fn finish(self) -> Result<LogReplay> {
        if self.awaiting_result {
            warn!("run log ends inside a record; the last invocation is ignored");
        }
        Ok(self.out)
    }
}

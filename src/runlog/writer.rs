// src/runlog/writer.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::fs::FileSystem;
use crate::types::Problem;

use super::record::RunRecord;
use super::{
    escape, IN_TIME, TAG_COMMAND, TAG_ERROR_MESSAGE, TAG_ERROR_SOLVER, TAG_INSTANCE,
    TAG_PARAMETER, TAG_PROBLEM_END, TAG_PROBLEM_START, TAG_REPETITION_END,
    TAG_REPETITION_START, TAG_RUNTIME, TAG_SOLVER, TAG_STDERR, TAG_STDOUT, TAG_SUPPORTS,
    TAG_TIMEOUT, TIMEOUT, VERDICT_PREFIX,
};

/// Appends tagged lines to the run log. Every line is a separate
/// open-append-close, so a crashed run leaves a readable prefix.
#[derive(Debug, Clone)]
pub struct LogWriter {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl LogWriter {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn begin_repetition(&self, repetition: u32) -> Result<()> {
        self.tagged(TAG_REPETITION_START, &repetition.to_string())
    }

    pub fn end_repetition(&self, repetition: u32) -> Result<()> {
        self.tagged(TAG_REPETITION_END, &repetition.to_string())
    }

    pub fn begin_problem(&self, problem: &Problem) -> Result<()> {
        self.tagged(TAG_PROBLEM_START, &problem.to_string())
    }

    pub fn end_problem(&self, problem: &Problem) -> Result<()> {
        self.tagged(TAG_PROBLEM_END, &problem.to_string())
    }

    pub fn supporting_solver(&self, solver: &str) -> Result<()> {
        self.tagged(TAG_SUPPORTS, solver)
    }

    /// An error not tied to any instance.
    pub fn general_error(&self, solver: &str, message: &str) -> Result<()> {
        self.tagged(TAG_ERROR_SOLVER, solver)?;
        self.tagged(TAG_ERROR_MESSAGE, message)
    }

    pub fn write_record(&self, record: &RunRecord) -> Result<()> {
        self.tagged(TAG_INSTANCE, &record.instance)?;
        self.tagged(TAG_SOLVER, &record.solver)?;
        self.tagged(TAG_PARAMETER, record.parameter.as_deref().unwrap_or(""))?;
        self.tagged(TAG_COMMAND, &record.command)?;
        self.tagged(TAG_STDOUT, record.stdout.trim())?;
        self.tagged(TAG_STDERR, &record.stderr)?;
        self.tagged(TAG_TIMEOUT, if record.timed_out { TIMEOUT } else { IN_TIME })?;
        self.tagged(TAG_RUNTIME, &record.elapsed_ms.to_string())?;
        self.line(&format!(
            "{VERDICT_PREFIX}{};{};{}",
            escape(&record.command),
            record.outcome,
            record.elapsed_ms
        ))
    }

    fn tagged(&self, tag: char, value: &str) -> Result<()> {
        self.line(&format!("{tag}={}", escape(value)))
    }

    fn line(&self, line: &str) -> Result<()> {
        self.fs.append_line(&self.path, line)
    }
}

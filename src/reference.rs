// src/reference.rs

//! Reference answers.
//!
//! The trusted answers that solver output is judged against. Computing them
//! is outside this crate; [`GroundTruthSolver`] reads precomputed answers
//! from a solutions directory.

use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::fs::FileSystem;
use crate::instance::Instance;
use crate::types::Problem;

pub trait ReferenceSolver: Send + Sync + Debug {
    /// Reference answer text for `problem` on `instance`.
    fn solve(&self, problem: &Problem, instance: &Instance) -> Result<String>;
}

/// Reads `<dir>/<instance stem>.<PROBLEM-ID>`.
#[derive(Debug, Clone)]
pub struct GroundTruthSolver {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
}

impl GroundTruthSolver {
    pub fn new(fs: Arc<dyn FileSystem>, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
        }
    }

    pub fn answer_path(&self, problem: &Problem, instance: &Instance) -> PathBuf {
        self.dir.join(format!("{}.{}", instance.stem(), problem))
    }
}

impl ReferenceSolver for GroundTruthSolver {
    fn solve(&self, problem: &Problem, instance: &Instance) -> Result<String> {
        let path = self.answer_path(problem, instance);
        let text = self
            .fs
            .read_to_string(&path)
            .with_context(|| format!("no reference answer for {problem} on instance #{}", instance.index))?;
        Ok(text.trim().to_string())
    }
}

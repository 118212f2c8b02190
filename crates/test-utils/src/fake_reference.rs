//! Reference solver with canned answers.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use probo::instance::Instance;
use probo::reference::ReferenceSolver;
use probo::types::Problem;

/// Answers keyed by `(problem id, instance index)`. Also counts calls so
/// tests can check that answers are loaded once per sweep.
#[derive(Debug, Default)]
pub struct ScriptedReference {
    answers: HashMap<(String, usize), String>,
    calls: Mutex<usize>,
}

impl ScriptedReference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, problem: &str, instance: usize, text: &str) -> Self {
        self.answers
            .insert((problem.to_string(), instance), text.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl ReferenceSolver for ScriptedReference {
    fn solve(&self, problem: &Problem, instance: &Instance) -> Result<String> {
        *self.calls.lock().unwrap() += 1;
        self.answers
            .get(&(problem.to_string(), instance.index))
            .cloned()
            .ok_or_else(|| anyhow!("no scripted answer for {problem} on #{}", instance.index))
    }
}

// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::exec::TimingWrapper;
use crate::instance::Instance;
use crate::types::{Problem, QueryKind};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [benchmark]
/// solvers = ["solvers/mysolver.sh"]
/// problems = ["EE-PR", "DC-ST"]
/// files_tgf = ["instances/"]
/// files_apx = ["instances/"]
/// solutions = "solutions/"
/// timeout = 600
///
/// [sampling]
/// dc_arguments = 10
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    pub benchmark: BenchmarkSection,

    #[serde(default)]
    pub sampling: SamplingSection,
}

/// `[benchmark]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BenchmarkSection {
    /// Solver command lines (an executable, optionally with fixed leading args).
    pub solvers: Vec<String>,

    /// Problem identifiers such as `EE-PR`.
    pub problems: Vec<String>,

    /// Files or directories (searched recursively) holding `.tgf` instances.
    #[serde(default)]
    pub files_tgf: Vec<PathBuf>,

    /// Files or directories (searched recursively) holding `.apx` instances.
    #[serde(default)]
    pub files_apx: Vec<PathBuf>,

    /// Directory with ground-truth answers, `<instance stem>.<PROBLEM>`.
    pub solutions: PathBuf,

    /// Per-invocation timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_repetitions")]
    pub repetitions: u32,

    /// Run log path.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Directory for per-solver `<name>.errlog` files.
    #[serde(default = "default_error_log_dir")]
    pub error_log_dir: PathBuf,

    /// Extra process names to reap after every invocation.
    #[serde(default)]
    pub kill_processes: Vec<String>,

    /// Also reap processes named like the solver executables.
    #[serde(default = "default_true")]
    pub reap_solver_names: bool,

    /// Command prefix that reports user/sys time on stderr. Empty disables it
    /// and wall-clock time is recorded instead.
    #[serde(default = "default_timing_wrapper")]
    pub timing_wrapper: String,

    /// Seed for parameter sampling; random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_timeout() -> u64 {
    600
}

fn default_repetitions() -> u32 {
    1
}

fn default_output() -> PathBuf {
    PathBuf::from("probo.log")
}

fn default_error_log_dir() -> PathBuf {
    PathBuf::from("errlogs")
}

fn default_true() -> bool {
    true
}

fn default_timing_wrapper() -> String {
    "time -p".to_string()
}

/// `[sampling]` section: how many parameters decision problems are tested with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SamplingSection {
    #[serde(default = "default_sample")]
    pub dc_arguments: usize,
    #[serde(default = "default_sample")]
    pub ds_arguments: usize,
    #[serde(default = "default_sample")]
    pub de_extensions: usize,
    #[serde(default = "default_sample")]
    pub dl_labelings: usize,
}

fn default_sample() -> usize {
    10
}

impl Default for SamplingSection {
    fn default() -> Self {
        Self {
            dc_arguments: default_sample(),
            ds_arguments: default_sample(),
            de_extensions: default_sample(),
            dl_labelings: default_sample(),
        }
    }
}

impl SamplingSection {
    /// Configured number of parameters for `kind` (1 for kinds without one).
    pub fn count_for(&self, kind: QueryKind) -> usize {
        match kind {
            QueryKind::DecideCredulous => self.dc_arguments,
            QueryKind::DecideSkeptical => self.ds_arguments,
            QueryKind::DecideExtension => self.de_extensions,
            QueryKind::DecideLabeling => self.dl_labelings,
            _ => 1,
        }
    }
}

/// Validated benchmark registry.
///
/// Only constructed by [`crate::config::validate_config`].
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    pub solvers: Vec<String>,
    pub problems: Vec<Problem>,
    pub instances: Vec<Instance>,
    pub solutions: PathBuf,
    pub timeout: Duration,
    pub repetitions: u32,
    pub output: PathBuf,
    pub error_log_dir: PathBuf,
    pub kill_processes: Vec<String>,
    pub reap_solver_names: bool,
    pub timing_wrapper: Option<TimingWrapper>,
    pub seed: Option<u64>,
    pub sampling: SamplingSection,
}

impl BenchmarkConfig {
    /// Process names the reaper should terminate after each invocation.
    ///
    /// Solver names are derived with [`crate::solver::reap_name`], never the
    /// interpreter that launches them.
    pub fn reap_names(&self) -> Vec<String> {
        let mut names = self.kill_processes.clone();
        if self.reap_solver_names {
            for solver in &self.solvers {
                if let Some(name) = crate::solver::reap_name(solver) {
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
            }
        }
        names
    }
}

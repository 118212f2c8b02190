#![allow(dead_code)]

use std::path::PathBuf;

use probo::config::{validate_config, BenchmarkConfig, BenchmarkSection, RawConfigFile, SamplingSection};
use probo::errors::Result;
use probo::fs::FileSystem;

/// Builder for `RawConfigFile` to simplify test setup.
///
/// Defaults mirror the TOML defaults except that no timing wrapper is used
/// and no extra processes are reaped.
pub struct ConfigBuilder {
    config: RawConfigFile,
}

impl ConfigBuilder {
    pub fn new(solutions: impl Into<PathBuf>) -> Self {
        Self {
            config: RawConfigFile {
                benchmark: BenchmarkSection {
                    solvers: Vec::new(),
                    problems: Vec::new(),
                    files_tgf: Vec::new(),
                    files_apx: Vec::new(),
                    solutions: solutions.into(),
                    timeout: 10,
                    repetitions: 1,
                    output: PathBuf::from("probo.log"),
                    error_log_dir: PathBuf::from("errlogs"),
                    kill_processes: Vec::new(),
                    reap_solver_names: false,
                    timing_wrapper: String::new(),
                    seed: Some(7),
                },
                sampling: SamplingSection::default(),
            },
        }
    }

    pub fn solver(mut self, command: impl Into<String>) -> Self {
        self.config.benchmark.solvers.push(command.into());
        self
    }

    pub fn problem(mut self, id: &str) -> Self {
        self.config.benchmark.problems.push(id.to_string());
        self
    }

    /// Add the same root to both the TGF and APX lists.
    pub fn instances(mut self, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        self.config.benchmark.files_tgf.push(root.clone());
        self.config.benchmark.files_apx.push(root);
        self
    }

    pub fn tgf(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.benchmark.files_tgf.push(path.into());
        self
    }

    pub fn apx(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.benchmark.files_apx.push(path.into());
        self
    }

    pub fn timeout(mut self, secs: u64) -> Self {
        self.config.benchmark.timeout = secs;
        self
    }

    pub fn repetitions(mut self, n: u32) -> Self {
        self.config.benchmark.repetitions = n;
        self
    }

    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.benchmark.output = path.into();
        self
    }

    pub fn error_log_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.benchmark.error_log_dir = path.into();
        self
    }

    pub fn kill_process(mut self, name: &str) -> Self {
        self.config.benchmark.kill_processes.push(name.to_string());
        self
    }

    pub fn timing_wrapper(mut self, wrapper: &str) -> Self {
        self.config.benchmark.timing_wrapper = wrapper.to_string();
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.config.benchmark.seed = seed;
        self
    }

    pub fn sampling(mut self, sampling: SamplingSection) -> Self {
        self.config.sampling = sampling;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self, fs: &dyn FileSystem) -> Result<BenchmarkConfig> {
        validate_config(self.config, fs)
    }
}

// src/driver/mod.rs

//! The benchmark sweep.
//!
//! `RunDriver::run` probes every solver, draws the decision-problem samples,
//! then walks repetition → problem → supporting solver → instance →
//! parameter, invoking the solver once per leaf and appending one record per
//! invocation to the run log.
//!
//! Per-leaf failures (a spawn error, malformed timing output) are logged and
//! skipped; only startup errors and run-log write failures end the sweep.

pub mod errlog;
pub mod sampling;
pub mod verdict;

use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

use crate::config::BenchmarkConfig;
use crate::errors::Result;
use crate::exec::{InvocationResult, Invoker};
use crate::fs::FileSystem;
use crate::instance::Instance;
use crate::reference::ReferenceSolver;
use crate::runlog::{LogWriter, RunRecord};
use crate::solver::{discover, SolverDescriptor};
use crate::types::{Outcome, ParameterKind, Problem, QueryKind};

pub use errlog::ErrorLog;
pub use sampling::Parameter;
pub use verdict::{judge, Judgement, ReferenceAnswer};

/// Counters for one finished sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub records: usize,
    pub correct: usize,
    pub timeouts: usize,
    /// Leaves aborted by an invocation error (no record written).
    pub failed_leaves: usize,
}

/// Reference answers and sampled parameters, fixed before the sweep starts.
#[derive(Debug, Clone, Default)]
pub struct SweepPlan {
    /// Keyed by the reference problem and instance index.
    references: HashMap<(Problem, usize), ReferenceAnswer>,
    /// Keyed by the problem under test and instance index.
    parameters: HashMap<(Problem, usize), Vec<Parameter>>,
}

impl SweepPlan {
    pub fn reference(&self, problem: &Problem, instance: usize) -> Option<&ReferenceAnswer> {
        self.references
            .get(&(problem.reference_problem(), instance))
    }

    pub fn parameters(&self, problem: &Problem, instance: usize) -> &[Parameter] {
        self.parameters
            .get(&(problem.clone(), instance))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// One leaf of the sweep.
struct Leaf<'a> {
    repetition: u32,
    problem: &'a Problem,
    solver: &'a SolverDescriptor,
    instance: &'a Instance,
    parameter: Option<(usize, &'a Parameter)>,
    reference: &'a ReferenceAnswer,
}

#[derive(Debug)]
pub struct RunDriver {
    config: BenchmarkConfig,
    fs: Arc<dyn FileSystem>,
    invoker: Invoker,
    reference: Arc<dyn ReferenceSolver>,
    writer: LogWriter,
    errlog: ErrorLog,
    progress: bool,
}

impl RunDriver {
    pub fn new(
        config: BenchmarkConfig,
        fs: Arc<dyn FileSystem>,
        invoker: Invoker,
        reference: Arc<dyn ReferenceSolver>,
    ) -> Self {
        let writer = LogWriter::new(fs.clone(), config.output.clone());
        let errlog = ErrorLog::new(fs.clone(), config.error_log_dir.clone());
        Self {
            config,
            fs,
            invoker,
            reference,
            writer,
            errlog,
            progress: false,
        }
    }

    /// Print one progress line per record to stdout.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    pub async fn run(&self) -> Result<SweepSummary> {
        let solvers = self.discover_solvers().await?;
        let plan = self.plan(&solvers)?;
        self.sweep(&solvers, &plan).await
    }

    /// Probe every configured solver. Probe stderr goes to the run log as a
    /// general error and to the solver's error log.
    pub async fn discover_solvers(&self) -> Result<Vec<SolverDescriptor>> {
        let probe_invoker = self.invoker.without_timing();
        let mut solvers = Vec::with_capacity(self.config.solvers.len());

        for command in &self.config.solvers {
            let probed = discover(&probe_invoker, command, self.config.timeout).await?;
            for diagnostic in &probed.diagnostics {
                self.writer.general_error(command, diagnostic)?;
                self.errlog.append(&probed.descriptor.name, diagnostic);
            }
            solvers.push(probed.descriptor);
        }
        Ok(solvers)
    }

    /// Load reference answers and draw parameter samples for every problem
    /// at least one solver supports.
    pub fn plan(&self, solvers: &[SolverDescriptor]) -> Result<SweepPlan> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let mut plan = SweepPlan::default();
        let mut arguments: HashMap<usize, Vec<String>> = HashMap::new();
        let mut argument_samples: HashMap<(QueryKind, usize), Vec<String>> = HashMap::new();

        let problems = self
            .config
            .problems
            .iter()
            .filter(|p| solvers.iter().any(|s| s.supports(p)));

        for problem in problems {
            let reference_problem = problem.reference_problem();
            let n = self.config.sampling.count_for(problem.kind);

            for instance in &self.config.instances {
                let key = (reference_problem.clone(), instance.index);
                if !plan.references.contains_key(&key) {
                    match self.load_reference(&reference_problem, instance) {
                        Some(answer) => {
                            plan.references.insert(key.clone(), answer);
                        }
                        None => continue,
                    }
                }
                let Some(reference) = plan.references.get(&key) else {
                    continue;
                };

                let kind = problem.kind;
                if kind.parameter() == ParameterKind::None {
                    continue;
                }

                if !arguments.contains_key(&instance.index) {
                    match instance.read_arguments(self.fs.as_ref()) {
                        Ok(args) => {
                            arguments.insert(instance.index, args);
                        }
                        Err(err) => {
                            error!(instance = instance.index, error = %err, "cannot read instance arguments; skipping");
                            continue;
                        }
                    }
                }
                let args = &arguments[&instance.index];

                let params: Vec<Parameter> = match (kind.parameter(), reference) {
                    (ParameterKind::Argument, _) => argument_samples
                        .entry((kind, instance.index))
                        .or_insert_with(|| sampling::sample_arguments(&mut rng, args, n))
                        .iter()
                        .cloned()
                        .map(Parameter::Argument)
                        .collect(),
                    (ParameterKind::Extension, ReferenceAnswer::Extensions(exts)) => {
                        sampling::sample_extensions(&mut rng, args, exts, n)
                            .into_iter()
                            .map(Parameter::Extension)
                            .collect()
                    }
                    (ParameterKind::Labeling, ReferenceAnswer::Labelings(labs)) => {
                        sampling::sample_labelings(&mut rng, args, labs, n)
                            .into_iter()
                            .map(Parameter::Labeling)
                            .collect()
                    }
                    _ => Vec::new(),
                };
                debug!(%problem, instance = instance.index, count = params.len(), "sampled parameters");
                plan.parameters.insert((problem.clone(), instance.index), params);
            }
        }
        Ok(plan)
    }

    fn load_reference(&self, problem: &Problem, instance: &Instance) -> Option<ReferenceAnswer> {
        let text = match self.reference.solve(problem, instance) {
            Ok(text) => text,
            Err(err) => {
                error!(%problem, instance = instance.index, error = %err, "reference answer unavailable; skipping instance");
                return None;
            }
        };
        let parsed = ReferenceAnswer::parse(problem.kind, &text);
        if parsed.is_none() {
            error!(%problem, instance = instance.index, "reference answer does not parse; skipping instance");
        }
        parsed
    }

    pub async fn sweep(&self, solvers: &[SolverDescriptor], plan: &SweepPlan) -> Result<SweepSummary> {
        let mut summary = SweepSummary::default();

        for repetition in 1..=self.config.repetitions {
            info!(repetition, total = self.config.repetitions, "starting repetition");
            self.writer.begin_repetition(repetition)?;

            for problem in &self.config.problems {
                let supporting: Vec<&SolverDescriptor> =
                    solvers.iter().filter(|s| s.supports(problem)).collect();
                if supporting.is_empty() {
                    warn!(%problem, "no solver supports this problem");
                }

                self.writer.begin_problem(problem)?;
                for solver in &supporting {
                    self.writer.supporting_solver(&solver.command)?;
                }

                for solver in &supporting {
                    for instance in &self.config.instances {
                        let Some(reference) = plan.reference(problem, instance.index) else {
                            continue;
                        };

                        let parameters: Vec<Option<(usize, &Parameter)>> =
                            if problem.kind.parameter() == ParameterKind::None {
                                vec![None]
                            } else {
                                plan.parameters(problem, instance.index)
                                    .iter()
                                    .enumerate()
                                    .map(Some)
                                    .collect()
                            };

                        for parameter in parameters {
                            let leaf = Leaf {
                                repetition,
                                problem,
                                solver,
                                instance,
                                parameter,
                                reference,
                            };
                            self.run_leaf(&leaf, &mut summary).await?;
                        }
                    }
                }
                self.writer.end_problem(problem)?;
            }
            self.writer.end_repetition(repetition)?;
        }

        info!(
            records = summary.records,
            correct = summary.correct,
            timeouts = summary.timeouts,
            failed = summary.failed_leaves,
            "sweep finished"
        );
        Ok(summary)
    }

    async fn run_leaf(&self, leaf: &Leaf<'_>, summary: &mut SweepSummary) -> Result<()> {
        let solver = leaf.solver;
        let Some(file) = leaf.instance.file_for(solver.format) else {
            warn!(solver = %solver.command, format = %solver.format, "solver format has no instance file");
            return Ok(());
        };
        let instance_file = file.display().to_string();

        let mut argv = solver.argv();
        argv.extend([
            "-p".to_string(),
            leaf.problem.to_string(),
            "-f".to_string(),
            instance_file.clone(),
            "-fo".to_string(),
            solver.format.to_string(),
        ]);
        let rendered = leaf.parameter.map(|(i, p)| (i, p.render()));
        if let Some((_, value)) = &rendered {
            argv.push("-a".to_string());
            argv.push(value.clone());
        }
        let command = argv.join(" ");

        let result = match self.invoker.invoke_argv(&argv, self.config.timeout).await {
            Ok(result) => result,
            Err(err) => {
                error!(solver = %solver.command, %command, error = %err, "invocation failed; skipping");
                self.errlog.append(&solver.name, &format!("{command}: {err}"));
                summary.failed_leaves += 1;
                return Ok(());
            }
        };

        let record = match result {
            InvocationResult::Timeout => {
                summary.timeouts += 1;
                RunRecord::timeout(
                    leaf.repetition,
                    leaf.problem.clone(),
                    &solver.command,
                    instance_file,
                    rendered,
                    command,
                )
            }
            InvocationResult::Completed(done) => {
                let stdout = done.stdout.trim().to_string();
                let judgement = judge(
                    leaf.problem.kind,
                    leaf.reference,
                    leaf.parameter.map(|(_, p)| p),
                    &stdout,
                );
                if judgement == Judgement::Malformed {
                    warn!(solver = %solver.command, %command, "solver output has unexpected shape");
                    self.errlog.append(
                        &solver.name,
                        &format!("malformed output for {command}: {stdout}"),
                    );
                }
                if !done.stderr.trim().is_empty() {
                    self.errlog.append(&solver.name, &done.stderr);
                }

                let (parameter_index, parameter) = match rendered {
                    Some((i, p)) => (Some(i), Some(p)),
                    None => (None, None),
                };
                RunRecord {
                    repetition: leaf.repetition,
                    problem: leaf.problem.clone(),
                    solver: solver.command.clone(),
                    instance: instance_file,
                    parameter,
                    parameter_index,
                    command,
                    stdout,
                    stderr: done.stderr,
                    timed_out: false,
                    outcome: judgement.outcome(),
                    elapsed_ms: done.elapsed_ms,
                }
            }
        };

        self.writer.write_record(&record)?;
        summary.records += 1;
        if record.outcome == Outcome::Correct {
            summary.correct += 1;
        }

        if self.progress {
            println!(
                "[{}] {} {} {}{} -> {} ({} ms)",
                record.repetition,
                record.problem,
                solver.name,
                record.instance,
                record
                    .parameter
                    .as_deref()
                    .map(|p| format!(" -a {p}"))
                    .unwrap_or_default(),
                if record.timed_out { "timeout".to_string() } else { record.outcome.to_string() },
                record.elapsed_ms
            );
        }
        Ok(())
    }
}

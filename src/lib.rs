// src/lib.rs

pub mod analysis;
pub mod cli;
pub mod config;
pub mod driver;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod instance;
pub mod logging;
pub mod reference;
pub mod runlog;
pub mod solver;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, info, warn};

use crate::analysis::{analyze, render_table, Statistics};
use crate::cli::{CliArgs, Command};
use crate::config::{load_and_validate, load_from_path, BenchmarkConfig};
use crate::driver::{RunDriver, SweepSummary};
use crate::errors::Result;
use crate::exec::{Invoker, ProcessTable, Reaper, SysinfoProcessTable};
use crate::fs::{FileSystem, RealFileSystem};
use crate::reference::GroundTruthSolver;
use crate::runlog::{LogReader, ParameterLayout};
use crate::types::ParameterKind;

/// High-level entry point used by `main.rs`.
pub async fn run(args: CliArgs) -> Result<()> {
    match args.command {
        Command::Run {
            config,
            dry_run,
            quiet,
        } => {
            let cfg = load_and_validate(&config)?;
            if dry_run {
                print_dry_run(&cfg);
                return Ok(());
            }
            let summary = run_benchmark(cfg, !quiet).await?;
            debug!(?summary, "benchmark finished");
            Ok(())
        }
        Command::Analyze { config, log } => {
            let stats = analyze_with_config(&RealFileSystem, &log, &config)?;
            print!("{}", render_table(&stats));
            Ok(())
        }
    }
}

/// Run the full sweep against the real filesystem and process table.
///
/// Ctrl-C stops the sweep; the running solver is killed and the run log
/// keeps every record written so far.
pub async fn run_benchmark(cfg: BenchmarkConfig, progress: bool) -> Result<SweepSummary> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let table: Arc<dyn ProcessTable> = Arc::new(SysinfoProcessTable::new());
    let reaper = Reaper::new(table, cfg.reap_names());
    let invoker = Invoker::new(cfg.timing_wrapper.clone(), reaper);
    let reference = Arc::new(GroundTruthSolver::new(fs.clone(), cfg.solutions.clone()));

    info!(
        solvers = cfg.solvers.len(),
        problems = cfg.problems.len(),
        instances = cfg.instances.len(),
        repetitions = cfg.repetitions,
        output = %cfg.output.display(),
        "starting benchmark"
    );

    let driver = RunDriver::new(cfg, fs, invoker, reference).with_progress(progress);

    tokio::select! {
        summary = driver.run() => summary,
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "failed to listen for Ctrl+C");
            }
            Err(anyhow!("interrupted").into())
        }
    }
}

/// Replay a run log and aggregate it.
pub fn analyze_log(fs: &dyn FileSystem, path: &Path, layout: ParameterLayout) -> Result<Statistics> {
    let replay = LogReader::new(layout).read_file(fs, path)?;
    if !replay.general_errors.is_empty() {
        warn!(count = replay.general_errors.len(), "run log contains general solver errors");
    }
    Ok(analyze(&replay))
}

/// Replay a run log with the parameter layout of the config that produced it.
pub fn analyze_with_config(fs: &dyn FileSystem, log: &Path, config: &Path) -> Result<Statistics> {
    let raw = load_from_path(fs, config)?;
    debug!(config = %config.display(), sampling = ?raw.sampling, "using sampling layout");
    analyze_log(fs, log, ParameterLayout::from_sampling(&raw.sampling))
}

/// Print the validated registry and an upper bound of the planned sweep.
fn print_dry_run(cfg: &BenchmarkConfig) {
    println!("probo dry-run");
    println!("  timeout = {}s", cfg.timeout.as_secs());
    println!("  repetitions = {}", cfg.repetitions);
    println!("  output = {}", cfg.output.display());
    println!("  error_log_dir = {}", cfg.error_log_dir.display());
    match &cfg.timing_wrapper {
        Some(w) => println!("  timing_wrapper = {}", w.prefix.join(" ")),
        None => println!("  timing_wrapper = (none, wall-clock)"),
    }
    let reap = cfg.reap_names();
    if !reap.is_empty() {
        println!("  reap = {:?}", reap);
    }
    if let Some(seed) = cfg.seed {
        println!("  seed = {seed}");
    }
    println!();

    println!("solvers ({}):", cfg.solvers.len());
    for s in &cfg.solvers {
        println!("  - {s}");
    }

    println!("instances ({}):", cfg.instances.len());
    for i in &cfg.instances {
        println!("  #{}: {} | {}", i.index, i.tgf.display(), i.apx.display());
    }

    println!("problems ({}):", cfg.problems.len());
    for p in &cfg.problems {
        let per_instance = match p.kind.parameter() {
            ParameterKind::None => 1,
            _ => cfg.sampling.count_for(p.kind),
        };
        println!(
            "  - {p}: up to {} invocations per solver per repetition (reference {})",
            per_instance * cfg.instances.len(),
            p.reference_problem()
        );
    }

    debug!("dry-run complete (no execution)");
}

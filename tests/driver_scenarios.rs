#![cfg(unix)]

mod common;
use crate::common::{init_tracing, instance, script, solver, write_file};

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::{tempdir, TempDir};

use probo::config::{BenchmarkConfig, SamplingSection};
use probo::driver::RunDriver;
use probo::errors::ProboError;
use probo::exec::{Invoker, ProcessTable, Reaper, SysinfoProcessTable};
use probo::fs::{FileSystem, RealFileSystem};
use probo::reference::{GroundTruthSolver, ReferenceSolver};
use probo::runlog::{LogReader, LogReplay, ParameterLayout};
use probo::types::Outcome;
use probo_test_utils::builders::ConfigBuilder;
use probo_test_utils::fake_reference::ScriptedReference;
use probo_test_utils::with_timeout;

type TestResult = Result<(), Box<dyn Error>>;

/// Benchmark directory: `instances/`, `solutions/`, `bin/`.
struct Bench {
    dir: TempDir,
}

impl Bench {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("solutions")).unwrap();
        fs::create_dir_all(dir.path().join("bin")).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn bin(&self) -> PathBuf {
        self.path().join("bin")
    }

    fn instances(&self) -> PathBuf {
        self.path().join("instances")
    }

    fn config(&self) -> ConfigBuilder {
        ConfigBuilder::new(self.path().join("solutions"))
            .instances(self.instances())
            .output(self.path().join("probo.log"))
            .error_log_dir(self.path().join("errlogs"))
    }

    fn errlog(&self, name: &str) -> String {
        fs::read_to_string(self.path().join("errlogs").join(format!("{name}.errlog")))
            .unwrap_or_default()
    }
}

fn driver(cfg: BenchmarkConfig, reference: Arc<dyn ReferenceSolver>) -> RunDriver {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let table: Arc<dyn ProcessTable> = Arc::new(SysinfoProcessTable::new());
    let invoker = Invoker::new(cfg.timing_wrapper.clone(), Reaper::new(table, cfg.reap_names()));
    RunDriver::new(cfg, fs, invoker, reference)
}

fn ground_truth(cfg: &BenchmarkConfig) -> Arc<dyn ReferenceSolver> {
    Arc::new(GroundTruthSolver::new(Arc::new(RealFileSystem), cfg.solutions.clone()))
}

fn replay(cfg: &BenchmarkConfig) -> LogReplay {
    LogReader::new(ParameterLayout::from_sampling(&cfg.sampling))
        .read_file(&RealFileSystem, &cfg.output)
        .unwrap()
}

#[tokio::test]
async fn matching_answer_is_recorded_as_correct() -> TestResult {
    init_tracing();
    let bench = Bench::new();
    instance(&bench.instances(), "g1", &["a", "b", "c"], &[("a", "c")]);
    write_file(&bench.path().join("solutions"), "g1.EC-ST", "[a,b]\n");
    let cmd = solver(&bench.bin(), "ec.sh", "EC-ST", "tgf", "echo '[b, a]'");

    let cfg = bench
        .config()
        .solver(&cmd)
        .problem("EC-ST")
        .problem("EE-PR")
        .build(&RealFileSystem)?;
    let reference = ground_truth(&cfg);

    let summary = with_timeout(driver(cfg.clone(), reference).run()).await?;
    assert_eq!(summary.records, 1);
    assert_eq!(summary.correct, 1);
    assert_eq!(summary.timeouts, 0);

    let log = replay(&cfg);
    assert_eq!(log.records.len(), 1);
    let r = &log.records[0];
    assert_eq!(r.repetition, 1);
    assert_eq!(r.problem.to_string(), "EC-ST");
    assert_eq!(r.solver, cmd);
    assert!(r.instance.ends_with("g1.tgf"));
    assert_eq!(r.stdout, "[b, a]");
    assert!(!r.timed_out);
    assert!(r.elapsed_ms >= 0);
    assert_eq!(r.outcome, Outcome::Correct);
    assert_eq!(r.command, format!("{cmd} -p EC-ST -f {} -fo tgf", r.instance));

    // EE-PR has no supporting solver: announced, but empty.
    let text = fs::read_to_string(&cfg.output)?;
    assert!(text.contains("P=EE-PR\nF=EE-PR\n"));
    assert_eq!(log.supporting.len(), 1);
    Ok(())
}

#[tokio::test]
async fn hanging_solver_times_out_and_is_killed() -> TestResult {
    init_tracing();
    let bench = Bench::new();
    instance(&bench.instances(), "g1", &["a"], &[]);
    write_file(&bench.path().join("solutions"), "g1.EE-PR", "[[a]]");
    let pid_file = bench.path().join("solver.pid");
    let cmd = solver(
        &bench.bin(),
        "hang.sh",
        "EE-PR",
        "tgf",
        &format!("echo $$ > {}\nsleep 30", pid_file.display()),
    );

    let cfg = bench
        .config()
        .solver(&cmd)
        .problem("EE-PR")
        .timeout(1)
        .build(&RealFileSystem)?;
    let reference = ground_truth(&cfg);

    let summary = with_timeout(driver(cfg.clone(), reference).run()).await?;
    assert_eq!(summary.records, 1);
    assert_eq!(summary.timeouts, 1);

    let log = replay(&cfg);
    let r = &log.records[0];
    assert!(r.timed_out);
    assert_eq!(r.elapsed_ms, -1);
    assert_eq!(r.outcome, Outcome::Incorrect);

    let pid: u32 = fs::read_to_string(&pid_file)?.trim().parse()?;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!SysinfoProcessTable::new().is_alive(pid), "solver {pid} survived its timeout");
    Ok(())
}

#[tokio::test]
async fn decision_problem_runs_once_per_sampled_argument() -> TestResult {
    init_tracing();
    let bench = Bench::new();
    instance(&bench.instances(), "g1", &["a", "b", "c", "d", "e"], &[("b", "a")]);
    let cmd = solver(&bench.bin(), "dc.sh", "DC-ST,EE-ST", "apx,tgf", "echo YES");

    let cfg = bench
        .config()
        .solver(&cmd)
        .problem("DC-ST")
        .repetitions(2)
        .sampling(SamplingSection {
            dc_arguments: 3,
            ..SamplingSection::default()
        })
        .build(&RealFileSystem)?;
    let reference = Arc::new(ScriptedReference::new().answer("EC-ST", 0, "[a,c]"));

    let summary = with_timeout(driver(cfg.clone(), reference.clone()).run()).await?;
    assert_eq!(summary.records, 6);
    assert_eq!(reference.calls(), 1);

    let log = replay(&cfg);
    assert_eq!(log.records.len(), 6);
    for (i, r) in log.records.iter().enumerate() {
        assert_eq!(r.repetition, if i < 3 { 1 } else { 2 });
        assert_eq!(r.parameter_index, Some(i % 3));
        // apx comes first in the solver's format list.
        assert!(r.instance.ends_with("g1.apx"));

        let arg = r.parameter.as_deref().unwrap();
        assert!(["a", "b", "c", "d", "e"].contains(&arg));
        assert!(r.command.ends_with(&format!("-fo apx -a {arg}")));
        let accepted = arg == "a" || arg == "c";
        assert_eq!(r.outcome == Outcome::Correct, accepted, "argument {arg}");
    }

    // Every repetition asks the same questions.
    let first: Vec<_> = log.records[..3].iter().map(|r| r.parameter.clone()).collect();
    let second: Vec<_> = log.records[3..].iter().map(|r| r.parameter.clone()).collect();
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn failed_capability_probe_aborts_the_run() -> TestResult {
    let bench = Bench::new();
    instance(&bench.instances(), "g1", &["a"], &[]);
    let cmd = solver(&bench.bin(), "mute.sh", "", "tgf", "echo '[]'");

    let cfg = bench
        .config()
        .solver(&cmd)
        .problem("EE-PR")
        .build(&RealFileSystem)?;
    let reference = ground_truth(&cfg);

    let err = with_timeout(driver(cfg.clone(), reference).run())
        .await
        .unwrap_err();
    assert!(matches!(err, ProboError::SolverProbe { .. }), "got {err:?}");
    assert_eq!(err.exit_code(), 7);
    assert!(!cfg.output.exists());
    Ok(())
}

#[tokio::test]
async fn probe_diagnostics_are_general_errors() -> TestResult {
    init_tracing();
    let bench = Bench::new();
    instance(&bench.instances(), "g1", &["a"], &[]);
    let cmd = script(
        &bench.bin(),
        "noisy.sh",
        r#"case "$1" in
  --problems) echo "[EE-PR]"; echo "flag --problems is deprecated" >&2; exit 0 ;;
  --formats) echo "[cnf,tgf]"; exit 0 ;;
esac
echo "[[a]]""#,
    );

    let cfg = bench
        .config()
        .solver(&cmd)
        .problem("EE-PR")
        .build(&RealFileSystem)?;
    let reference = Arc::new(ScriptedReference::new().answer("EE-PR", 0, "[[a]]"));

    let summary = with_timeout(driver(cfg.clone(), reference).run()).await?;
    assert_eq!(summary.correct, 1);

    let log = replay(&cfg);
    assert_eq!(log.general_errors.len(), 1);
    assert_eq!(log.general_errors[0].solver, cmd);
    assert!(log.general_errors[0].message.contains("deprecated"));
    assert!(bench.errlog("sh").contains("deprecated"));
    // cnf is skipped in favour of the next format.
    assert!(log.records[0].command.ends_with("-fo tgf"));
    Ok(())
}

#[tokio::test]
async fn solver_stderr_goes_to_its_error_log() -> TestResult {
    let bench = Bench::new();
    instance(&bench.instances(), "g1", &["a", "b"], &[]);
    write_file(&bench.path().join("solutions"), "g1.EC-CO", "[a,b]");
    let cmd = solver(
        &bench.bin(),
        "warn.sh",
        "EC-CO",
        "tgf",
        "echo '[a,b]'\necho 'parse warning: line 3' >&2",
    );

    let cfg = bench
        .config()
        .solver(&cmd)
        .problem("EC-CO")
        .build(&RealFileSystem)?;
    let reference = ground_truth(&cfg);

    with_timeout(driver(cfg.clone(), reference).run()).await?;

    assert!(bench.errlog("sh").contains("parse warning: line 3"));
    let log = replay(&cfg);
    assert_eq!(log.records[0].stderr.trim(), "parse warning: line 3");
    assert_eq!(log.records[0].outcome, Outcome::Correct);
    Ok(())
}

#[tokio::test]
async fn invocation_errors_skip_the_leaf() -> TestResult {
    init_tracing();
    let bench = Bench::new();
    instance(&bench.instances(), "g1", &["a"], &[]);
    write_file(&bench.path().join("solutions"), "g1.EE-PR", "[[a]]");
    let cmd = solver(&bench.bin(), "ee.sh", "EE-PR", "tgf", "echo '[[a]]'");
    // Never prints user/sys lines.
    let wrapper = script(&bench.bin(), "badtime.sh", "\"$@\"");

    let cfg = bench
        .config()
        .solver(&cmd)
        .problem("EE-PR")
        .timing_wrapper(&wrapper)
        .build(&RealFileSystem)?;
    let reference = ground_truth(&cfg);

    let summary = with_timeout(driver(cfg.clone(), reference).run()).await?;
    assert_eq!(summary.failed_leaves, 1);
    assert_eq!(summary.records, 0);

    assert!(replay(&cfg).records.is_empty());
    assert!(bench.errlog("sh").contains("Malformed timing output"));
    Ok(())
}

#[tokio::test]
async fn missing_reference_skips_the_instance() -> TestResult {
    let bench = Bench::new();
    instance(&bench.instances(), "g1", &["a"], &[]);
    instance(&bench.instances(), "g2", &["b"], &[]);
    write_file(&bench.path().join("solutions"), "g2.EE-PR", "[[b]]");
    let cmd = solver(&bench.bin(), "ee.sh", "EE-PR", "tgf", "echo '[[b]]'");

    let cfg = bench
        .config()
        .solver(&cmd)
        .problem("EE-PR")
        .build(&RealFileSystem)?;
    let reference = ground_truth(&cfg);

    let summary = with_timeout(driver(cfg.clone(), reference).run()).await?;
    assert_eq!(summary.records, 1);

    let log = replay(&cfg);
    assert!(log.records[0].instance.ends_with("g2.tgf"));
    assert_eq!(log.records[0].outcome, Outcome::Correct);
    Ok(())
}

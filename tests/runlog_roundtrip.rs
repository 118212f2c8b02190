use std::path::Path;
use std::sync::Arc;

use proptest::prelude::*;

use probo::config::SamplingSection;
use probo::errors::ProboError;
use probo::fs::mock::MockFileSystem;
use probo::fs::FileSystem;
use probo::runlog::{escape, unescape, GeneralError, LogReader, LogWriter, ParameterLayout, RunRecord};
use probo::types::{Outcome, Problem};
use probo_test_utils::init_tracing;

const LOG: &str = "/bench/probo.log";

fn problem(id: &str) -> Problem {
    id.parse().unwrap()
}

fn record(rep: u32, problem_id: &str, instance: &str, param: Option<(usize, &str)>) -> RunRecord {
    let mut command = format!("solver -p {problem_id} -f {instance} -fo tgf");
    if let Some((_, p)) = param {
        command.push_str(&format!(" -a {p}"));
    }
    RunRecord {
        repetition: rep,
        problem: problem(problem_id),
        solver: "solver".to_string(),
        instance: instance.to_string(),
        parameter: param.map(|(_, p)| p.to_string()),
        parameter_index: param.map(|(i, _)| i),
        command,
        stdout: "[[a]]".to_string(),
        stderr: String::new(),
        timed_out: false,
        outcome: Outcome::Correct,
        elapsed_ms: 42,
    }
}

fn writer() -> (MockFileSystem, LogWriter) {
    let fs = MockFileSystem::new();
    let w = LogWriter::new(Arc::new(fs.clone()), LOG);
    (fs, w)
}

fn layout(dc: usize) -> ParameterLayout {
    ParameterLayout::from_sampling(&SamplingSection {
        dc_arguments: dc,
        ..SamplingSection::default()
    })
}

fn expect_corruption(text: &str, reason_part: &str) {
    match LogReader::default().read_str(text) {
        Err(ProboError::LogCorruption { reason, .. }) => {
            assert!(reason.contains(reason_part), "reason {reason:?} lacks {reason_part:?}");
        }
        other => panic!("expected corruption ({reason_part}) for {text:?}, got {other:?}"),
    }
}

#[test]
fn written_log_replays_to_the_same_records() {
    init_tracing();
    let (fs, w) = writer();
    let ee = problem("EE-PR");

    let timed_out = RunRecord::timeout(
        1,
        ee.clone(),
        "solver",
        "/i/g2.tgf",
        None,
        "solver -p EE-PR -f /i/g2.tgf -fo tgf",
    );
    let first = record(1, "EE-PR", "/i/g1.tgf", None);

    w.begin_repetition(1).unwrap();
    w.begin_problem(&ee).unwrap();
    w.supporting_solver("solver").unwrap();
    w.write_record(&first).unwrap();
    w.write_record(&timed_out).unwrap();
    w.end_problem(&ee).unwrap();
    w.end_repetition(1).unwrap();

    let replay = LogReader::default().read_file(&fs, Path::new(LOG)).unwrap();

    assert_eq!(replay.records, vec![first, timed_out]);
    assert_eq!(replay.supporting[&ee].iter().collect::<Vec<_>>(), vec!["solver"]);
    assert!(replay.general_errors.is_empty());
}

#[test]
fn multi_line_output_is_escaped_onto_one_line() {
    let (fs, w) = writer();
    let ee = problem("EE-ST");
    let mut r = record(1, "EE-ST", "/i/g1.tgf", None);
    r.stdout = "[[a],\n[b]]".to_string();
    r.stderr = "line one\r\nC:\\temp\\x\nlast".to_string();
    r.outcome = Outcome::Incorrect;

    w.begin_repetition(1).unwrap();
    w.begin_problem(&ee).unwrap();
    w.write_record(&r).unwrap();

    let text = fs.contents(LOG).unwrap();
    assert!(text.lines().all(|l| !l.is_empty()));
    assert!(text.contains("E=line one\\r\\nC:\\\\temp\\\\x\\nlast"));
    assert!(text.ends_with(";incorrect;42\n"));

    let replay = LogReader::default().read_str(&text).unwrap();
    assert_eq!(replay.records, vec![r]);
}

#[test]
fn parameter_indices_follow_the_sampling_layout() {
    let (fs, w) = writer();
    let dc = problem("DC-CO");

    w.begin_repetition(1).unwrap();
    w.begin_problem(&dc).unwrap();
    for (i, arg) in ["a", "b", "a"].iter().enumerate() {
        w.write_record(&record(1, "DC-CO", "/i/g1.tgf", Some((i, arg)))).unwrap();
    }
    for (i, arg) in ["x", "y", "z"].iter().enumerate() {
        w.write_record(&record(1, "DC-CO", "/i/g2.tgf", Some((i, arg)))).unwrap();
    }
    w.end_problem(&dc).unwrap();
    w.end_repetition(1).unwrap();
    // Same coordinates again in a second repetition.
    w.begin_repetition(2).unwrap();
    w.begin_problem(&dc).unwrap();
    w.write_record(&record(2, "DC-CO", "/i/g1.tgf", Some((0, "a")))).unwrap();

    let replay = LogReader::new(layout(3))
        .read_file(&fs, Path::new(LOG))
        .unwrap();

    let indices: Vec<(String, Option<usize>, Option<String>)> = replay
        .records
        .iter()
        .map(|r| (r.instance.clone(), r.parameter_index, r.parameter.clone()))
        .collect();
    assert_eq!(
        indices,
        vec![
            ("/i/g1.tgf".into(), Some(0), Some("a".into())),
            ("/i/g1.tgf".into(), Some(1), Some("b".into())),
            ("/i/g1.tgf".into(), Some(2), Some("a".into())),
            ("/i/g2.tgf".into(), Some(0), Some("x".into())),
            ("/i/g2.tgf".into(), Some(1), Some("y".into())),
            ("/i/g2.tgf".into(), Some(2), Some("z".into())),
            ("/i/g1.tgf".into(), Some(0), Some("a".into())),
        ]
    );
}

#[test]
fn non_parameterised_records_have_no_parameter() {
    let text = "#=1\nP=EE-PR\nI=/i/g1.tgf\nV=solver\nA=\nC=cmd\nO=[]\nE=\nT=intime\nR=5\n";
    let replay = LogReader::default().read_str(text).unwrap();
    assert_eq!(replay.records.len(), 1);
    assert_eq!(replay.records[0].parameter, None);
    assert_eq!(replay.records[0].parameter_index, None);
    // No verdict line: judged incorrect.
    assert_eq!(replay.records[0].outcome, Outcome::Incorrect);
}

#[test]
fn general_errors_are_collected() {
    let (fs, w) = writer();
    w.general_error("solver", "unknown option --formats").unwrap();
    w.begin_repetition(1).unwrap();

    let replay = LogReader::default().read_file(&fs, Path::new(LOG)).unwrap();
    assert_eq!(
        replay.general_errors,
        vec![GeneralError {
            solver: "solver".into(),
            message: "unknown option --formats".into(),
        }]
    );
    assert!(replay.records.is_empty());
}

#[test]
fn incomplete_trailing_line_is_ignored() {
    let full = "#=1\nP=EE-PR\nI=g\nV=s\nA=\nC=c\nO=[]\nE=\nT=intime\nR=5\nI;c;correct;5\n";
    let cut = format!("{full}I=g2\nV=s\nA=\nC=c2\nO=[]\nE=\nT=int");

    let replay = LogReader::default().read_str(&cut).unwrap();
    assert_eq!(replay.records.len(), 1);
    assert_eq!(replay.records[0].outcome, Outcome::Correct);
}

#[test]
fn missing_log_file_is_missing_file() {
    let fs = MockFileSystem::new();
    let err = LogReader::default()
        .read_file(&fs, Path::new("/nope/probo.log"))
        .unwrap_err();
    assert!(matches!(err, ProboError::MissingFile(_)));
    assert!(!fs.exists(Path::new("/nope/probo.log")));
}

#[test]
fn corrupted_logs_are_rejected() {
    init_tracing();

    expect_corruption("#=1\nP=EE-PR\nT=intime\n", "before repetition");
    expect_corruption("#=1\nI=g\nV=s\nA=\nT=intime\n", "before repetition");
    expect_corruption("#=1\nP=EE-PR\nQ=what\n", "unknown tag");
    expect_corruption("garbage\n", "expected '<tag>=<value>'");
    expect_corruption("#=1\nP=EE-PR\nI=g\nV=s\nA=\nA=\n", "parameter before the previous result");
    expect_corruption(
        "#=1\nP=EE-PR\nI=g\nV=s\nA=\nT=intime\nR=1\nI=g\nV=s\nA=\nT=intime\nR=2\n",
        "duplicate",
    );
    expect_corruption("#=1\nI;c;correct;5\n", "verdict without a preceding record");
    expect_corruption(
        "#=1\nP=EE-PR\nI=g\nV=s\nA=\nC=c\nT=intime\nR=5\nI;other;correct;5\n",
        "does not match",
    );
    expect_corruption(
        "#=1\nP=EE-PR\nI=g\nV=s\nA=\nC=c\nT=intime\nR=5\nI;c;correct;6\n",
        "does not match",
    );
    expect_corruption("#=1\nP=EE-PR\nI=g\nV=s\nA=\nC=c\nT=late\n", "'timeout' or 'intime'");
    expect_corruption("X=solver\n#=1\n", "without message");
    expect_corruption("Y=orphan\n", "without solver");
    expect_corruption("#=1\n$=2\n", "repetition end");
    expect_corruption("#=1\nP=EE-PR\nF=EE-ST\n", "problem end");
    expect_corruption("#=1\nP=EE-PR\nO=bad\\q\n", "escape");
    expect_corruption("#=1\nP=ZZ-PR\n", "invalid problem identifier");
}

#[test]
fn corruption_reports_the_line_number() {
    let err = LogReader::default()
        .read_str("#=1\nP=EE-PR\n\nQ=x\n")
        .unwrap_err();
    match err {
        ProboError::LogCorruption { line_no, line, .. } => {
            assert_eq!(line_no, 4);
            assert_eq!(line, "Q=x");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(
        LogReader::default().read_str("Q=x\n").unwrap_err().exit_code(),
        8
    );
}

proptest! {
    #[test]
    fn escaped_values_never_span_lines(value in "[a-z\\\\\n\r ;=\\[\\],]{0,40}") {
        let escaped = escape(&value);
        prop_assert!(!escaped.contains('\n'));
        prop_assert!(!escaped.contains('\r'));
        prop_assert_eq!(unescape(&escaped), Some(value));
    }

    #[test]
    fn any_record_survives_the_log(
        stdout in "[a-z\\[\\],\n ]{0,30}",
        stderr in "[a-z:\\\\\n]{0,30}",
        elapsed in 0i64..100_000,
        timed_out in any::<bool>(),
        correct in any::<bool>(),
    ) {
        let (fs, w) = writer();
        let mut r = record(1, "SE-GR", "/i/g1.apx", None);
        r.stdout = stdout.trim().to_string();
        r.stderr = stderr;
        r.timed_out = timed_out;
        r.elapsed_ms = if timed_out { -1 } else { elapsed };
        r.outcome = if correct { Outcome::Correct } else { Outcome::Incorrect };

        w.begin_repetition(1).unwrap();
        w.begin_problem(&r.problem).unwrap();
        w.write_record(&r).unwrap();

        let replay = LogReader::default().read_file(&fs, Path::new(LOG)).unwrap();
        prop_assert_eq!(replay.records, vec![r]);
    }
}

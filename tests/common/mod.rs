#![allow(dead_code)]

//! On-disk fixtures shared by the integration tests.
//!
//! Solver scripts are run as `sh <script>` rather than executed directly, so
//! a concurrently forking test thread can never make the exec fail with
//! "text file busy".

use std::fs;
use std::path::{Path, PathBuf};

pub use probo_test_utils::init_tracing;

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

/// Write a shell script and return the command line that runs it.
pub fn script(dir: &Path, name: &str, body: &str) -> String {
    let path = write_file(dir, name, &format!("#!/bin/sh\n{body}\n"));
    format!("sh {}", path.display())
}

/// A solver script that answers the capability probes and otherwise runs
/// `body` with `$ARG` set to the `-a` value (if any).
pub fn solver(dir: &Path, name: &str, problems: &str, formats: &str, body: &str) -> String {
    script(
        dir,
        name,
        &format!(
            r#"case "$1" in
  --problems) echo "[{problems}]"; exit 0 ;;
  --formats) echo "[{formats}]"; exit 0 ;;
esac
ARG=""
while [ $# -gt 0 ]; do
  case "$1" in
    -a) ARG="$2"; shift ;;
  esac
  shift
done
{body}"#
        ),
    )
}

/// Write `<stem>.tgf` and `<stem>.apx` describing the same graph.
pub fn instance(dir: &Path, stem: &str, args: &[&str], attacks: &[(&str, &str)]) -> (PathBuf, PathBuf) {
    let mut tgf = String::new();
    for a in args {
        tgf.push_str(&format!("{a}\n"));
    }
    tgf.push_str("#\n");
    for (from, to) in attacks {
        tgf.push_str(&format!("{from} {to}\n"));
    }

    let mut apx = String::new();
    for a in args {
        apx.push_str(&format!("arg({a}).\n"));
    }
    for (from, to) in attacks {
        apx.push_str(&format!("att({from},{to}).\n"));
    }

    (
        write_file(dir, &format!("{stem}.tgf"), &tgf),
        write_file(dir, &format!("{stem}.apx"), &apx),
    )
}

// src/exec/invoker.rs

//! Single solver invocation with a hard deadline.
//!
//! The child is awaited on a dedicated worker task which is raced against a
//! timer. When the timer wins, the child's process tree is killed and the
//! worker is dropped; the caller sees [`InvocationResult::Timeout`], never an
//! error. The reaper runs on every exit path, on the blocking pool since
//! its grace wait sleeps.

use std::process::Stdio;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};
use tokio::process::Command;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::errors::Result;

use super::reaper::Reaper;
use super::timing::{split_timing, TimingWrapper};

/// How long to wait for the worker after killing a timed-out child.
const KILL_GRACE: Duration = Duration::from_secs(2);

/// Output of a child that finished before its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completed {
    pub stdout: String,
    /// Solver stderr with the timing wrapper's report removed.
    pub stderr: String,
    pub elapsed_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationResult {
    Timeout,
    Completed(Completed),
}

#[derive(Debug, Clone)]
pub struct Invoker {
    timing: Option<TimingWrapper>,
    reaper: Reaper,
}

/// Reaps in the background if the invocation future is dropped before its
/// own cleanup ran.
struct ReapOnCancel(Option<Reaper>);

impl Drop for ReapOnCancel {
    fn drop(&mut self) {
        let Some(reaper) = self.0.take() else {
            return;
        };
        if let Ok(handle) = Handle::try_current() {
            handle.spawn_blocking(move || reaper.cleanup());
        }
    }
}

async fn reap(reaper: Reaper) {
    match tokio::task::spawn_blocking(move || reaper.cleanup()).await {
        Ok(0) => {}
        Ok(reaped) => debug!(reaped, "cleanup terminated leftover processes"),
        Err(err) => warn!(error = %err, "cleanup task failed"),
    }
}

impl Invoker {
    pub fn new(timing: Option<TimingWrapper>, reaper: Reaper) -> Self {
        Self { timing, reaper }
    }

    /// Same invoker without the timing wrapper; elapsed time is wall-clock.
    pub fn without_timing(&self) -> Self {
        Self {
            timing: None,
            reaper: self.reaper.clone(),
        }
    }

    /// Run a whitespace-separated command line.
    pub async fn invoke(&self, command: &str, timeout: Duration) -> Result<InvocationResult> {
        let argv: Vec<String> = command.split_whitespace().map(str::to_string).collect();
        self.invoke_argv(&argv, timeout).await
    }

    /// Run `argv` directly (no shell).
    pub async fn invoke_argv(&self, argv: &[String], timeout: Duration) -> Result<InvocationResult> {
        let mut on_cancel = ReapOnCancel(Some(self.reaper.clone()));
        let result = self.run(argv, timeout).await;
        on_cancel.0 = None;
        reap(self.reaper.clone()).await;
        result
    }

    async fn run(&self, argv: &[String], timeout: Duration) -> Result<InvocationResult> {
        let argv = match &self.timing {
            Some(wrapper) => wrapper.wrap(argv.to_vec()),
            None => argv.to_vec(),
        };
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| anyhow!("empty command line"))?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let started = Instant::now();
        let child = cmd
            .spawn()
            .with_context(|| format!("spawning process '{}'", argv.join(" ")))?;
        let pid = child.id();
        debug!(?pid, cmd = %argv.join(" "), "spawned solver process");

        let mut worker = tokio::spawn(async move { child.wait_with_output().await });

        tokio::select! {
            joined = &mut worker => {
                let output = joined
                    .context("invocation worker failed")?
                    .with_context(|| format!("waiting for process '{}'", argv.join(" ")))?;
                let wall_ms = started.elapsed().as_millis() as i64;

                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                let raw_stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                let (stderr, elapsed_ms) = match &self.timing {
                    Some(_) => split_timing(&raw_stderr)?,
                    None => (raw_stderr, wall_ms),
                };

                debug!(?pid, elapsed_ms, exit = ?output.status.code(), "solver process finished");
                Ok(InvocationResult::Completed(Completed { stdout, stderr, elapsed_ms }))
            }

            _ = tokio::time::sleep(timeout) => {
                warn!(?pid, timeout_secs = timeout.as_secs_f64(), "solver process timed out; killing");
                if let Some(pid) = pid {
                    let reaper = self.reaper.clone();
                    if let Err(err) = tokio::task::spawn_blocking(move || reaper.terminate_tree(pid)).await {
                        warn!(pid, error = %err, "tree termination task failed");
                    }
                }
                if tokio::time::timeout(KILL_GRACE, &mut worker).await.is_err() {
                    worker.abort();
                }
                Ok(InvocationResult::Timeout)
            }
        }
    }
}

// src/exec/reaper.rs

//! Process reaper.
//!
//! Solvers are opaque binaries that may fork SAT/ASP back-ends which outlive
//! them. After every invocation the reaper scans the whole process table and
//! kills anything whose name matches a configured process name. The
//! orchestrator's own pid and its ancestors, such as the shell that
//! launched it, are never touched.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::process_table::{ProcessEntry, ProcessTable};

const DEFAULT_GRACE: Duration = Duration::from_millis(500);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Linux truncates process names to this many bytes.
const COMM_LEN: usize = 15;

#[derive(Debug, Clone)]
pub struct Reaper {
    table: Arc<dyn ProcessTable>,
    names: Vec<String>,
    own_pid: u32,
    grace: Duration,
}

impl Reaper {
    pub fn new(table: Arc<dyn ProcessTable>, names: Vec<String>) -> Self {
        Self {
            table,
            names: names.into_iter().filter(|n| !n.is_empty()).collect(),
            own_pid: std::process::id(),
            grace: DEFAULT_GRACE,
        }
    }

    pub fn with_own_pid(mut self, pid: u32) -> Self {
        self.own_pid = pid;
        self
    }

    /// How long to wait for terminated processes to disappear.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Terminate every process whose name matches a configured name.
    ///
    /// Best effort: failures are logged and skipped. Returns the number of
    /// processes a termination was issued for.
    pub fn cleanup(&self) -> usize {
        if self.names.is_empty() {
            return 0;
        }

        let entries = self.table.list_processes();
        let protected = ancestors_of(&entries, self.own_pid);
        let targets: Vec<u32> = entries
            .iter()
            .filter(|p| !protected.contains(&p.pid) && self.matches(&p.name))
            .map(|p| p.pid)
            .collect();

        self.terminate_all(&targets)
    }

    /// Terminate `root` and all of its descendants, leaves first.
    pub fn terminate_tree(&self, root: u32) -> usize {
        if root == self.own_pid {
            warn!(pid = root, "refusing to terminate own process tree");
            return 0;
        }
        let entries = self.table.list_processes();
        let mut order = descendants_leaves_first(&entries, root);
        order.retain(|pid| *pid != self.own_pid);
        order.push(root);
        self.terminate_all(&order)
    }

    fn terminate_all(&self, pids: &[u32]) -> usize {
        let mut issued = Vec::with_capacity(pids.len());
        for &pid in pids {
            match self.table.terminate(pid) {
                Ok(()) => {
                    debug!(pid, "terminated process");
                    issued.push(pid);
                }
                Err(err) => warn!(pid, error = %err, "failed to terminate process"),
            }
        }
        self.wait_for_exit(&issued);
        issued.len()
    }

    fn wait_for_exit(&self, pids: &[u32]) {
        if pids.is_empty() {
            return;
        }
        let deadline = Instant::now() + self.grace;
        let mut pending: Vec<u32> = pids.to_vec();
        loop {
            pending.retain(|pid| self.table.is_alive(*pid));
            if pending.is_empty() {
                return;
            }
            if Instant::now() >= deadline {
                warn!(?pending, "processes still alive after termination");
                return;
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    fn matches(&self, process_name: &str) -> bool {
        self.names.iter().any(|n| name_matches(process_name, n))
    }
}

/// A process name matches a configured name when it equals it, extends it
/// (`clingo` matches `clingo-dl`), or is its kernel-truncated form.
pub fn name_matches(process_name: &str, configured: &str) -> bool {
    if process_name.is_empty() || configured.is_empty() {
        return false;
    }
    process_name.starts_with(configured)
        || (process_name.len() >= COMM_LEN && configured.starts_with(process_name))
}

/// `pid` itself plus every process above it in the parent chain.
fn ancestors_of(entries: &[ProcessEntry], pid: u32) -> HashSet<u32> {
    let parents: HashMap<u32, u32> = entries
        .iter()
        .filter_map(|e| e.parent.map(|parent| (e.pid, parent)))
        .collect();

    let mut chain = HashSet::from([pid]);
    let mut current = pid;
    while let Some(&parent) = parents.get(&current) {
        if !chain.insert(parent) {
            break;
        }
        current = parent;
    }
    chain
}

/// Descendants of `root` in post-order: every child appears before its parent.
fn descendants_leaves_first(entries: &[ProcessEntry], root: u32) -> Vec<u32> {
    let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
    for e in entries {
        if let Some(parent) = e.parent {
            if parent != e.pid {
                children.entry(parent).or_default().push(e.pid);
            }
        }
    }

    let mut out = Vec::new();
    let mut seen = HashSet::from([root]);
    // (pid, children already expanded)
    let mut stack: Vec<(u32, bool)> = children
        .get(&root)
        .into_iter()
        .flatten()
        .map(|&c| (c, false))
        .collect();

    while let Some((pid, expanded)) = stack.pop() {
        if expanded {
            out.push(pid);
            continue;
        }
        if !seen.insert(pid) {
            continue;
        }
        stack.push((pid, true));
        if let Some(kids) = children.get(&pid) {
            stack.extend(kids.iter().map(|&c| (c, false)));
        }
    }
    out
}

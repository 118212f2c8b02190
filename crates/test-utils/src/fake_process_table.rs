//! In-memory process table for reaper tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use probo::exec::{ProcessEntry, ProcessTable};

#[derive(Debug, Default)]
struct State {
    processes: BTreeMap<u32, ProcessEntry>,
    terminated: Vec<u32>,
    refuse: HashSet<u32>,
    linger: HashSet<u32>,
}

/// Scripted process table. `terminate` removes the process and records the
/// pid, unless the pid was marked with [`FakeProcessTable::refuse_kill`] or
/// [`FakeProcessTable::linger`].
#[derive(Debug, Default)]
pub struct FakeProcessTable {
    state: Mutex<State>,
}

impl FakeProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&self, pid: u32, parent: Option<u32>, name: &str) -> &Self {
        self.state.lock().unwrap().processes.insert(
            pid,
            ProcessEntry {
                pid,
                parent,
                name: name.to_string(),
            },
        );
        self
    }

    /// Make `terminate(pid)` fail and leave the process running.
    pub fn refuse_kill(&self, pid: u32) -> &Self {
        self.state.lock().unwrap().refuse.insert(pid);
        self
    }

    /// Accept `terminate(pid)` but keep the process listed as alive.
    pub fn linger(&self, pid: u32) -> &Self {
        self.state.lock().unwrap().linger.insert(pid);
        self
    }

    /// Pids terminated so far, in call order.
    pub fn terminated(&self) -> Vec<u32> {
        self.state.lock().unwrap().terminated.clone()
    }

    pub fn alive(&self) -> Vec<u32> {
        self.state.lock().unwrap().processes.keys().copied().collect()
    }
}

impl ProcessTable for FakeProcessTable {
    fn list_processes(&self) -> Vec<ProcessEntry> {
        self.state.lock().unwrap().processes.values().cloned().collect()
    }

    fn terminate(&self, pid: u32) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.refuse.contains(&pid) {
            return Err(anyhow!("operation not permitted (pid {pid})"));
        }
        if state.linger.contains(&pid) {
            state.terminated.push(pid);
        } else if state.processes.remove(&pid).is_some() {
            state.terminated.push(pid);
        }
        Ok(())
    }

    fn is_alive(&self, pid: u32) -> bool {
        self.state.lock().unwrap().processes.contains_key(&pid)
    }
}

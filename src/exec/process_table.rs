// src/exec/process_table.rs

//! OS process table abstraction.
//!
//! The reaper only needs to list processes and kill them by pid. Production
//! code uses [`SysinfoProcessTable`]; tests swap in a scripted fake.

use std::fmt::Debug;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use sysinfo::{Pid, ProcessStatus, ProcessesToUpdate, Signal, System};

/// One row of the process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub parent: Option<u32>,
    pub name: String,
}

pub trait ProcessTable: Send + Sync + Debug {
    /// Snapshot of the currently running processes.
    fn list_processes(&self) -> Vec<ProcessEntry>;

    /// Forcibly terminate `pid`. Terminating a process that is already gone
    /// is not an error.
    fn terminate(&self, pid: u32) -> Result<()>;

    /// Whether `pid` is still running. Zombies count as dead.
    fn is_alive(&self, pid: u32) -> bool;
}

/// Process table backed by `sysinfo`.
#[derive(Debug)]
pub struct SysinfoProcessTable {
    sys: Mutex<System>,
}

impl SysinfoProcessTable {
    pub fn new() -> Self {
        Self {
            sys: Mutex::new(System::new()),
        }
    }

    fn with_system<T>(&self, f: impl FnOnce(&mut System) -> T) -> T {
        let mut guard = match self.sys.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

impl Default for SysinfoProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable for SysinfoProcessTable {
    fn list_processes(&self) -> Vec<ProcessEntry> {
        self.with_system(|sys| {
            sys.refresh_processes(ProcessesToUpdate::All, true);
            let mut entries: Vec<ProcessEntry> = sys
                .processes()
                .iter()
                .filter(|(_, p)| p.status() != ProcessStatus::Zombie)
                .map(|(pid, p)| ProcessEntry {
                    pid: pid.as_u32(),
                    parent: p.parent().map(|pp| pp.as_u32()),
                    name: p.name().to_string_lossy().into_owned(),
                })
                .collect();
            entries.sort_by_key(|e| e.pid);
            entries
        })
    }

    fn terminate(&self, pid: u32) -> Result<()> {
        self.with_system(|sys| {
            let target = Pid::from_u32(pid);
            sys.refresh_processes(ProcessesToUpdate::Some(&[target]), true);
            let Some(process) = sys.process(target) else {
                return Ok(());
            };
            if process.status() == ProcessStatus::Zombie {
                return Ok(());
            }
            let sent = match process.kill_with(Signal::Kill) {
                Some(sent) => sent,
                None => process.kill(),
            };
            if sent {
                return Ok(());
            }
            // The signal may have failed because the process exited meanwhile.
            sys.refresh_processes(ProcessesToUpdate::Some(&[target]), true);
            match sys.process(target) {
                Some(p) if p.status() != ProcessStatus::Zombie => {
                    Err(anyhow!("failed to send kill signal to pid {pid}"))
                }
                _ => Ok(()),
            }
        })
    }

    fn is_alive(&self, pid: u32) -> bool {
        self.with_system(|sys| {
            let target = Pid::from_u32(pid);
            sys.refresh_processes(ProcessesToUpdate::Some(&[target]), true);
            sys.process(target)
                .is_some_and(|p| p.status() != ProcessStatus::Zombie)
        })
    }
}

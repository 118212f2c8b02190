// src/driver/errlog.rs

use std::path::PathBuf;
use std::sync::Arc;

use tracing::warn;

use crate::fs::FileSystem;

/// Per-solver error logs: `<dir>/<solver name>.errlog`.
///
/// Writes are best effort; a failed write is reported through `tracing`
/// and never interrupts the sweep.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
}

impl ErrorLog {
    pub fn new(fs: Arc<dyn FileSystem>, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
        }
    }

    pub fn path_for(&self, solver_name: &str) -> PathBuf {
        self.dir.join(format!("{solver_name}.errlog"))
    }

    pub fn append(&self, solver_name: &str, message: &str) {
        let path = self.path_for(solver_name);
        for line in message.lines() {
            if let Err(err) = self.fs.append_line(&path, line) {
                warn!(solver = %solver_name, error = %err, "failed to write error log");
                return;
            }
        }
    }
}

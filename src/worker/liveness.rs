//! Parent process liveness.

use std::path::PathBuf;

/// Answers whether a process still exists.
pub trait ParentLivenessCheck: Send + Sync {
    fn is_alive(&self, pid: u32) -> bool;
}

/// Checks for `/proc/<pid>`.
#[derive(Debug, Clone)]
pub struct ProcfsLiveness {
    root: PathBuf,
}

impl ProcfsLiveness {
    /// Uses a different procfs mount point.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        ProcfsLiveness { root: root.into() }
    }
}

impl Default for ProcfsLiveness {
    fn default() -> Self {
        Self::with_root("/proc")
    }
}

impl ParentLivenessCheck for ProcfsLiveness {
    fn is_alive(&self, pid: u32) -> bool {
        self.root.join(pid.to_string()).exists()
    }
}

//! Canonical paths within a driver workspace.

use std::path::{Path, PathBuf};

/// All canonical paths for a workspace root.
#[derive(Debug, Clone)]
pub struct DriverPaths {
    pub root: PathBuf,
    pub driver_dir: PathBuf,
    pub state_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub run_state_path: PathBuf,
    pub options_path: PathBuf,
}

impl DriverPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let driver_dir = root.join(".driver");
        let state_dir = driver_dir.join("state");
        let logs_dir = driver_dir.join("logs");
        Self {
            root: root.clone(),
            driver_dir: driver_dir.clone(),
            state_dir: state_dir.clone(),
            logs_dir,
            run_state_path: state_dir.join("run_state.json"),
            options_path: root.join("BOUT.inp"),
        }
    }

    /// Log file for mesh generation in step `step`.
    pub fn gridgen_log(&self, step: u32) -> PathBuf {
        self.logs_dir.join(format!("step-{step}.gridgen.log"))
    }

    /// Log file for the transport solver launch in step `step`.
    pub fn transport_log(&self, step: u32) -> PathBuf {
        self.logs_dir.join(format!("step-{step}.transport.log"))
    }

    /// Resolve a configured path against the workspace root.
    ///
    /// Absolute paths are returned unchanged.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

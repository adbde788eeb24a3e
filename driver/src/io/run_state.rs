//! Run state storage for step bookkeeping.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::run_mode::RunMode;

/// Persisted bookkeeping for the current run (`.driver/state/run_state.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunState {
    /// Whether the next solver launch restarts from previous output.
    pub mode: RunMode,
    /// Number of driver steps completed successfully.
    pub steps_completed: u32,
    /// Processor count used by the last successful solver launch.
    pub last_processor_count: Option<u32>,
}

/// Load run state from disk.
pub fn load_run_state(path: &Path) -> Result<RunState> {
    debug!(path = %path.display(), "loading run state");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read run state {}", path.display()))?;
    let state: RunState = serde_json::from_str(&contents)
        .with_context(|| format!("parse run state {}", path.display()))?;
    debug!(mode = ?state.mode, steps_completed = state.steps_completed, "run state loaded");
    Ok(state)
}

/// Load run state, treating a missing file as a fresh run.
pub fn load_or_default_run_state(path: &Path) -> Result<RunState> {
    if !path.exists() {
        return Ok(RunState::default());
    }
    load_run_state(path)
}

/// Atomically write run state to disk (temp file + rename).
pub fn write_run_state(path: &Path, state: &RunState) -> Result<()> {
    debug!(path = %path.display(), mode = ?state.mode, steps_completed = state.steps_completed, "writing run state");
    let mut buf = serde_json::to_string_pretty(state)?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("run state path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp run state {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace run state {}", path.display()))?;
    Ok(())
}

//! Transport worker: choose a decomposition, render options, launch the solver.

use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::core::run_mode::RunMode;
use crate::io::config::TransportConfig;
use crate::io::launcher::{LaunchRequest, Launcher};
use crate::io::options::{OptionsInputs, write_options};
use crate::io::paths::DriverPaths;
use crate::nproc::{ProcessorChoice, choose_processor_count};

/// Result of one successful transport step.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportOutcome {
    pub choice: ProcessorChoice,
    /// Mode the solver was launched in.
    pub launched_as: RunMode,
    /// Mode for the next step.
    pub next_mode: RunMode,
}

/// Runs the Hermes-3 solver for one time window.
pub struct TransportWorker<'a, L: Launcher> {
    pub config: &'a TransportConfig,
    pub paths: &'a DriverPaths,
    pub launcher: &'a L,
}

impl<L: Launcher> TransportWorker<'_, L> {
    /// Run one solver step in `mode`.
    ///
    /// Nothing is launched unless a valid processor count was found. On
    /// failure the caller keeps its current mode.
    pub fn step(&self, mode: RunMode, step_index: u32, timestamp: f64) -> Result<TransportOutcome> {
        info!(timestamp, ?mode, "transport step");
        let metadata_path = self.paths.resolve(self.config.metadata_path());
        let choice = choose_processor_count(
            &metadata_path,
            self.config.guard_x,
            self.config.guard_y,
            self.config.max_processors,
        )?;

        let options_path = self.paths.options_path.clone();
        write_options(
            &options_path,
            &OptionsInputs {
                options: &self.config.options,
                gridfile: &self.config.gridfile,
                topology: &choice.topology,
            },
        )?;

        let request = LaunchRequest {
            workdir: self.paths.root.clone(),
            bin_path: self.config.bin_path.clone(),
            options_path,
            processors: choice.decomposition.total_processors,
            mode,
            log_path: self.paths.transport_log(step_index),
            timeout: Duration::from_secs(self.config.timeout_secs),
            output_limit_bytes: self.config.output_limit_bytes,
        };
        self.launcher.launch(&request)?;

        info!(processors = request.processors, "finished transport step");
        Ok(TransportOutcome {
            choice,
            launched_as: mode,
            next_mode: mode.after_step(),
        })
    }

    /// Reset so the next step starts a new solve.
    pub fn restart(&self) -> RunMode {
        info!("transport restart requested");
        RunMode::Fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedLauncher, TestWorkspace, single_null_topology};

    #[test]
    fn step_launches_with_chosen_count_and_advances_mode() {
        let workspace = TestWorkspace::new(&single_null_topology(), 8).expect("workspace");
        let launcher = ScriptedLauncher::succeeding();
        let worker = TransportWorker {
            config: &workspace.config.transport,
            paths: &workspace.paths,
            launcher: &launcher,
        };

        let outcome = worker.step(RunMode::Fresh, 1, 0.0).expect("step");
        assert_eq!(outcome.choice.decomposition.total_processors, 8);
        assert_eq!(outcome.next_mode, RunMode::Restarting);

        let requests = launcher.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].processors, 8);
        assert_eq!(requests[0].mode, RunMode::Fresh);
        assert!(workspace.paths.options_path.exists());
    }

    #[test]
    fn step_does_not_launch_without_decomposition() {
        let workspace = TestWorkspace::new(&single_null_topology(), 3).expect("workspace");
        let launcher = ScriptedLauncher::succeeding();
        let worker = TransportWorker {
            config: &workspace.config.transport,
            paths: &workspace.paths,
            launcher: &launcher,
        };

        assert!(worker.step(RunMode::Fresh, 1, 0.0).is_err());
        assert!(launcher.requests().is_empty());
    }

    #[test]
    fn restart_returns_fresh() {
        let workspace = TestWorkspace::new(&single_null_topology(), 8).expect("workspace");
        let launcher = ScriptedLauncher::succeeding();
        let worker = TransportWorker {
            config: &workspace.config.transport,
            paths: &workspace.paths,
            launcher: &launcher,
        };
        assert_eq!(worker.restart(), RunMode::Fresh);
    }
}

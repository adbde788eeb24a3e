//! Orchestration for driver `step` and `restart` calls.
//!
//! A step runs the optional GRIDGEN port (mesh generation) and then the
//! TRANSPORT port (solver launch). The run mode is loaded from, threaded
//! through, and written back to `.driver/state/run_state.json`; a failed step
//! leaves the stored state untouched.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::core::run_mode::RunMode;
use crate::io::config::DriverConfig;
use crate::io::gridgen::{GridgenRequest, MeshGenerator};
use crate::io::launcher::Launcher;
use crate::io::paths::DriverPaths;
use crate::io::run_state::{RunState, load_or_default_run_state, write_run_state};
use crate::transport::TransportWorker;

/// Operations the driver accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Call {
    Step { timestamp: f64 },
    Restart,
}

/// Result of a dispatched [`Call`].
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    Stepped(StepOutcome),
    Restarted(RunState),
}

/// Result of a single driver step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Step number (1-indexed).
    pub step: u32,
    pub timestamp: f64,
    /// Whether the mesh generator ran this step.
    pub generated_grid: bool,
    /// Processor count the solver was launched with.
    pub processors: u32,
    /// Mode the solver was launched in.
    pub launched_as: RunMode,
    /// Run state persisted after the step.
    pub state: RunState,
}

/// Driver bound to a workspace, its configuration and collaborators.
pub struct Driver<'a, G: MeshGenerator, L: Launcher> {
    pub paths: DriverPaths,
    pub config: &'a DriverConfig,
    pub generator: &'a G,
    pub launcher: &'a L,
}

impl<'a, G: MeshGenerator, L: Launcher> Driver<'a, G, L> {
    pub fn new(root: &Path, config: &'a DriverConfig, generator: &'a G, launcher: &'a L) -> Self {
        Self {
            paths: DriverPaths::new(root),
            config,
            generator,
            launcher,
        }
    }

    pub fn call(&self, call: Call) -> Result<CallOutcome> {
        match call {
            Call::Step { timestamp } => self.step(timestamp).map(CallOutcome::Stepped),
            Call::Restart => run_restart(&self.paths.root).map(CallOutcome::Restarted),
        }
    }

    /// Execute one step: optional mesh generation, then the transport solver.
    pub fn step(&self, timestamp: f64) -> Result<StepOutcome> {
        let state = load_or_default_run_state(&self.paths.run_state_path)?;
        let step = state.steps_completed + 1;
        info!(step, timestamp, mode = ?state.mode, "driver step");

        let generated_grid = self.generate_grid(step)?;

        let worker = TransportWorker {
            config: &self.config.transport,
            paths: &self.paths,
            launcher: self.launcher,
        };
        let outcome = worker
            .step(state.mode, step, timestamp)
            .with_context(|| format!("transport step {step}"))?;

        let processors = outcome.choice.decomposition.total_processors;
        let next = RunState {
            mode: outcome.next_mode,
            steps_completed: step,
            last_processor_count: Some(processors),
        };
        write_run_state(&self.paths.run_state_path, &next)?;
        info!(step, processors, "finished driver step");

        Ok(StepOutcome {
            step,
            timestamp,
            generated_grid,
            processors,
            launched_as: outcome.launched_as,
            state: next,
        })
    }

    fn generate_grid(&self, step: u32) -> Result<bool> {
        let Some(gridgen) = &self.config.gridgen else {
            info!("skipping grid generation");
            return Ok(false);
        };
        let request = GridgenRequest {
            workdir: self.paths.root.clone(),
            geqdsk: self.paths.resolve(&gridgen.geqdsk),
            options_yaml: gridgen
                .options_yaml
                .as_deref()
                .map(|path| self.paths.resolve(path)),
            gridfile: self.paths.resolve(&self.config.transport.gridfile),
            log_path: self.paths.gridgen_log(step),
            timeout: Duration::from_secs(gridgen.timeout_secs),
            output_limit_bytes: gridgen.output_limit_bytes,
        };
        self.generator
            .generate(&request)
            .with_context(|| format!("generate grid for step {step}"))?;
        Ok(true)
    }
}

/// Reset the persisted run so the next step starts a fresh solve.
pub fn run_restart(root: &Path) -> Result<RunState> {
    let paths = DriverPaths::new(root);
    let mut state = load_or_default_run_state(&paths.run_state_path)?;
    state.mode = RunMode::Fresh;
    write_run_state(&paths.run_state_path, &state)?;
    info!(steps_completed = state.steps_completed, "driver restart");
    Ok(state)
}

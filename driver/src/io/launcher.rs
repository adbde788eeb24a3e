//! Launcher abstraction for the parallel transport solver.
//!
//! The [`Launcher`] trait decouples step orchestration from the MPI runtime.
//! Tests use scripted launchers that record requests without spawning
//! processes.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument, warn};

use crate::core::run_mode::RunMode;
use crate::io::process::run_command_with_timeout;

/// Parameters for one solver launch.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchRequest {
    /// Working directory for the solver process.
    pub workdir: PathBuf,
    /// Solver executable.
    pub bin_path: PathBuf,
    /// Rendered options file passed with `-f`.
    pub options_path: PathBuf,
    /// Validated total number of MPI processes.
    pub processors: u32,
    /// Whether to append the restart directive.
    pub mode: RunMode,
    /// Path to write solver stdout/stderr log.
    pub log_path: PathBuf,
    pub timeout: Duration,
    pub output_limit_bytes: usize,
}

/// Abstraction over parallel job launch backends.
pub trait Launcher {
    /// Run the solver to completion. Errors if it fails or times out.
    fn launch(&self, request: &LaunchRequest) -> Result<()>;
}

/// Launcher that runs the solver under an MPI launcher such as `mpirun -np`.
#[derive(Debug, Clone)]
pub struct MpiLauncher {
    /// Launcher program and its process-count flag.
    pub command: Vec<String>,
}

impl MpiLauncher {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    /// Build `<command...> <processors> <bin_path> -f <options> [restart]`.
    pub fn build_command(&self, request: &LaunchRequest) -> Result<Command> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| anyhow!("launch command is empty"))?;
        let mut cmd = Command::new(program);
        cmd.args(args)
            .arg(request.processors.to_string())
            .arg(&request.bin_path)
            .arg("-f")
            .arg(&request.options_path)
            .current_dir(&request.workdir);
        if let Some(directive) = request.mode.restart_directive() {
            cmd.arg(directive);
        }
        Ok(cmd)
    }
}

impl Launcher for MpiLauncher {
    #[instrument(skip_all, fields(processors = request.processors, mode = ?request.mode))]
    fn launch(&self, request: &LaunchRequest) -> Result<()> {
        info!(
            workdir = %request.workdir.display(),
            bin_path = %request.bin_path.display(),
            "launching transport solver"
        );
        let cmd = self.build_command(request)?;
        debug!(args = ?cmd.get_args().collect::<Vec<_>>(), "solver command line");

        let output = run_command_with_timeout(cmd, request.timeout, request.output_limit_bytes)
            .context("run transport solver")?;
        output.write_log(&request.log_path, "solver", request.output_limit_bytes)?;

        if output.timed_out {
            warn!(
                timeout_secs = request.timeout.as_secs(),
                "transport solver timed out"
            );
            return Err(anyhow!(
                "transport solver timed out after {:?}",
                request.timeout
            ));
        }
        if !output.status.success() {
            warn!(exit_code = ?output.status.code(), "transport solver failed");
            return Err(anyhow!(
                "transport solver failed with status {:?} (see {})",
                output.status.code(),
                request.log_path.display()
            ));
        }

        debug!("transport solver completed successfully");
        Ok(())
    }
}

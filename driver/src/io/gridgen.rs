//! Mesh generator adapter: equilibrium file in, grid file out.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument, warn};

use crate::io::process::run_command_with_timeout;

/// Parameters for one mesh generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GridgenRequest {
    pub workdir: PathBuf,
    /// Equilibrium in G-EQDSK format.
    pub geqdsk: PathBuf,
    /// Mesh generation options (YAML), if any.
    pub options_yaml: Option<PathBuf>,
    /// Grid file the generator is expected to produce.
    pub gridfile: PathBuf,
    pub log_path: PathBuf,
    pub timeout: Duration,
    pub output_limit_bytes: usize,
}

pub trait MeshGenerator {
    fn generate(&self, request: &GridgenRequest) -> Result<()>;
}

/// Generator that runs an external command: `<command...> <geqdsk> [options_yaml]`.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    pub command: Vec<String>,
}

impl CommandGenerator {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    pub fn build_command(&self, request: &GridgenRequest) -> Result<Command> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| anyhow!("gridgen command is empty"))?;
        let mut cmd = Command::new(program);
        cmd.args(args).arg(&request.geqdsk);
        if let Some(options) = &request.options_yaml {
            cmd.arg(options);
        }
        cmd.current_dir(&request.workdir);
        Ok(cmd)
    }
}

impl MeshGenerator for CommandGenerator {
    #[instrument(skip_all, fields(geqdsk = %request.geqdsk.display()))]
    fn generate(&self, request: &GridgenRequest) -> Result<()> {
        if !request.geqdsk.exists() {
            return Err(anyhow!(
                "missing equilibrium file {}",
                request.geqdsk.display()
            ));
        }
        match &request.options_yaml {
            Some(path) => debug!(options = %path.display(), "using mesh options"),
            None => debug!("no mesh options file, using generator defaults"),
        }

        info!(gridfile = %request.gridfile.display(), "generating grid");
        let cmd = self.build_command(request)?;
        let output = run_command_with_timeout(cmd, request.timeout, request.output_limit_bytes)
            .context("run mesh generator")?;
        output.write_log(&request.log_path, "gridgen", request.output_limit_bytes)?;

        if output.timed_out {
            warn!(
                timeout_secs = request.timeout.as_secs(),
                "mesh generator timed out"
            );
            return Err(anyhow!(
                "mesh generator timed out after {:?}",
                request.timeout
            ));
        }
        if !output.status.success() {
            return Err(anyhow!(
                "mesh generator failed with status {:?} (see {})",
                output.status.code(),
                request.log_path.display()
            ));
        }
        if !request.gridfile.exists() {
            return Err(anyhow!(
                "mesh generator did not produce {}",
                request.gridfile.display()
            ));
        }
        info!("finished generating grid");
        Ok(())
    }
}

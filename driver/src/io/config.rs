//! Driver configuration stored in `driver.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::topology::DEFAULT_GUARD_CELLS;

/// Driver configuration (TOML).
///
/// The `[gridgen]` table is optional: without it the driver skips mesh
/// generation and runs the transport solver on an existing grid file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DriverConfig {
    pub gridgen: Option<GridgenConfig>,
    pub transport: TransportConfig,
    pub launch: LaunchConfig,
}

/// Mesh generation from a G-EQDSK equilibrium.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GridgenConfig {
    /// Equilibrium file in G-EQDSK format.
    pub geqdsk: PathBuf,
    /// Mesh generation options (YAML). Optional.
    pub options_yaml: Option<PathBuf>,
    /// Generator executable and leading arguments.
    pub command: Vec<String>,
    pub timeout_secs: u64,
    pub output_limit_bytes: usize,
}

impl Default for GridgenConfig {
    fn default() -> Self {
        Self {
            geqdsk: PathBuf::new(),
            options_yaml: None,
            command: vec!["hypnotoad_geqdsk".to_string()],
            timeout_secs: 60 * 60,
            output_limit_bytes: 1_000_000,
        }
    }
}

/// Hermes-3 transport solver settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransportConfig {
    /// Grid file handed to the solver (and produced by gridgen, if enabled).
    pub gridfile: PathBuf,
    /// Text metadata with the mesh topology fields. Defaults to `gridfile`.
    pub mesh_metadata: Option<PathBuf>,
    /// Solver executable.
    pub bin_path: PathBuf,
    /// Upper bound on the number of MPI processes.
    pub max_processors: u32,
    /// Guard cells in x (MXG).
    pub guard_x: u32,
    /// Guard cells in y (MYG).
    pub guard_y: u32,
    pub timeout_secs: u64,
    pub output_limit_bytes: usize,
    pub options: TransportOptions,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            gridfile: PathBuf::new(),
            mesh_metadata: None,
            bin_path: PathBuf::new(),
            max_processors: 1,
            guard_x: DEFAULT_GUARD_CELLS,
            guard_y: DEFAULT_GUARD_CELLS,
            timeout_secs: 24 * 60 * 60,
            output_limit_bytes: 1_000_000,
            options: TransportOptions::default(),
        }
    }
}

impl TransportConfig {
    /// File the mesh topology is read from.
    pub fn metadata_path(&self) -> &Path {
        self.mesh_metadata.as_deref().unwrap_or(&self.gridfile)
    }
}

/// Physics inputs substituted into the BOUT.inp template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransportOptions {
    /// Number of output steps.
    pub nout: u32,
    /// Output timestep, normalised ion cyclotron times.
    pub timestep: f64,
    pub scale_t: f64,
    pub scale_n: f64,
    /// Core boundary electron temperature [eV].
    pub core_te: f64,
    /// Core boundary ion temperature [eV].
    pub core_ti: f64,
    /// Core boundary density [m^-3].
    pub core_ne: f64,
    pub d_core: f64,
    pub d_sol: f64,
    pub chi_e_core: f64,
    pub chi_e_sol: f64,
    pub chi_i_core: f64,
    pub chi_i_sol: f64,
    /// Recycling fraction at the targets.
    pub target_recycle_multiplier: f64,
    /// Last x cell before the separatrix (ixseps - 1), excluding guards.
    pub xsep_inner: i64,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            nout: 10,
            timestep: 100.0,
            scale_t: 0.01,
            scale_n: 0.1,
            core_te: 2000.0,
            core_ti: 2000.0,
            core_ne: 1e20,
            d_core: 0.3,
            d_sol: 0.3,
            chi_e_core: 0.5,
            chi_e_sol: 1.0,
            chi_i_core: 0.5,
            chi_i_sol: 1.0,
            target_recycle_multiplier: 0.995,
            xsep_inner: 7,
        }
    }
}

/// How the parallel solver is launched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LaunchConfig {
    /// MPI launcher and its process-count flag; the count is appended.
    pub command: Vec<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            command: vec!["mpirun".to_string(), "-np".to_string()],
        }
    }
}

impl DriverConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(gridgen) = &self.gridgen {
            if gridgen.geqdsk.as_os_str().is_empty() {
                return Err(anyhow!("gridgen.geqdsk must be set to the equilibrium file"));
            }
            if gridgen.command.is_empty() || gridgen.command[0].trim().is_empty() {
                return Err(anyhow!("gridgen.command must be a non-empty array"));
            }
            if gridgen.timeout_secs == 0 {
                return Err(anyhow!("gridgen.timeout_secs must be > 0"));
            }
        }
        let transport = &self.transport;
        if transport.gridfile.as_os_str().is_empty() {
            return Err(anyhow!("transport.gridfile must be set to the input grid file"));
        }
        if transport.bin_path.as_os_str().is_empty() {
            return Err(anyhow!(
                "transport.bin_path must be set to a BOUT++ executable"
            ));
        }
        if transport.max_processors == 0 {
            return Err(anyhow!("transport.max_processors must be > 0"));
        }
        if transport.timeout_secs == 0 {
            return Err(anyhow!("transport.timeout_secs must be > 0"));
        }
        if transport.output_limit_bytes == 0 {
            return Err(anyhow!("transport.output_limit_bytes must be > 0"));
        }
        if self.launch.command.is_empty() || self.launch.command[0].trim().is_empty() {
            return Err(anyhow!("launch.command must be a non-empty array"));
        }
        Ok(())
    }
}

/// Load and validate config from a TOML file.
pub fn load_config(path: &Path) -> Result<DriverConfig> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: DriverConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Write config to disk as pretty TOML.
pub fn write_config(path: &Path, cfg: &DriverConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    fs::write(path, buf).with_context(|| format!("write {}", path.display()))
}

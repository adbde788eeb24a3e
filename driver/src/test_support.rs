//! Test-only fixtures and scripted collaborators.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use tempfile::TempDir;

use crate::core::topology::MeshTopology;
use crate::io::config::{DriverConfig, TransportConfig, write_config};
use crate::io::gridgen::{GridgenRequest, MeshGenerator};
use crate::io::launcher::{LaunchRequest, Launcher};
use crate::io::mesh::format_topology;
use crate::io::paths::DriverPaths;

/// Single-null mesh: 20 interior x-points, 16 y-rows, cuts at 3/7/7/11.
///
/// Usable totals up to 64: 4, 8, 16, 20, 32, 40.
pub fn single_null_topology() -> MeshTopology {
    MeshTopology {
        nx: 24,
        ny: 16,
        jyseps1_1: 3,
        jyseps1_2: 7,
        jyseps2_1: 7,
        jyseps2_2: 11,
        ny_inner: 8,
        guard_x: 2,
        guard_y: 2,
    }
}

/// Double-null mesh: cuts at 3/5/11/13 with the inner boundary at 8.
///
/// Usable totals up to 64: 8, 16, 32, 40.
pub fn double_null_topology() -> MeshTopology {
    MeshTopology {
        nx: 24,
        ny: 16,
        jyseps1_1: 3,
        jyseps1_2: 11,
        jyseps2_1: 5,
        jyseps2_2: 13,
        ny_inner: 8,
        guard_x: 2,
        guard_y: 2,
    }
}

/// Core-only mesh with a prime `ny`: only the single-process split is usable.
pub fn prime_core_topology() -> MeshTopology {
    MeshTopology {
        nx: 20,
        ny: 17,
        jyseps1_1: -1,
        jyseps1_2: 8,
        jyseps2_1: 8,
        jyseps2_2: 16,
        ny_inner: 8,
        guard_x: 2,
        guard_y: 2,
    }
}

/// Temporary workspace with mesh metadata and a valid config.
pub struct TestWorkspace {
    temp: TempDir,
    pub paths: DriverPaths,
    pub config: DriverConfig,
}

impl TestWorkspace {
    pub const CONFIG_FILE: &'static str = "driver.toml";
    pub const METADATA_FILE: &'static str = "grid.txt";

    pub fn new(topology: &MeshTopology, max_processors: u32) -> Result<Self> {
        let temp = tempfile::tempdir()?;
        let paths = DriverPaths::new(temp.path());
        fs::write(
            temp.path().join(Self::METADATA_FILE),
            format_topology(topology),
        )?;
        let config = DriverConfig {
            transport: TransportConfig {
                gridfile: PathBuf::from("bout.grd.nc"),
                mesh_metadata: Some(PathBuf::from(Self::METADATA_FILE)),
                bin_path: PathBuf::from("hermes-3"),
                max_processors,
                guard_x: topology.guard_x,
                guard_y: topology.guard_y,
                ..TransportConfig::default()
            },
            ..DriverConfig::default()
        };
        Ok(Self {
            temp,
            paths,
            config,
        })
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Write the current config to `driver.toml` and return its path.
    pub fn write_config(&self) -> Result<PathBuf> {
        let path = self.root().join(Self::CONFIG_FILE);
        write_config(&path, &self.config)?;
        Ok(path)
    }
}

/// Launcher that records requests and replays scripted outcomes.
///
/// Once the script is exhausted every launch uses the fallback outcome.
pub struct ScriptedLauncher {
    script: RefCell<VecDeque<bool>>,
    fallback: bool,
    requests: RefCell<Vec<LaunchRequest>>,
}

impl ScriptedLauncher {
    pub fn new(script: Vec<bool>, fallback: bool) -> Self {
        Self {
            script: RefCell::new(script.into()),
            fallback,
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(Vec::new(), true)
    }

    pub fn failing() -> Self {
        Self::new(Vec::new(), false)
    }

    pub fn requests(&self) -> Vec<LaunchRequest> {
        self.requests.borrow().clone()
    }
}

impl Launcher for ScriptedLauncher {
    fn launch(&self, request: &LaunchRequest) -> Result<()> {
        self.requests.borrow_mut().push(request.clone());
        let ok = self.script.borrow_mut().pop_front().unwrap_or(self.fallback);
        if ok {
            Ok(())
        } else {
            Err(anyhow!("scripted launch failure"))
        }
    }
}

/// Mesh generator that records requests and always succeeds.
#[derive(Default)]
pub struct ScriptedGenerator {
    requests: RefCell<Vec<GridgenRequest>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn requests(&self) -> Vec<GridgenRequest> {
        self.requests.borrow().clone()
    }
}

impl MeshGenerator for ScriptedGenerator {
    fn generate(&self, request: &GridgenRequest) -> Result<()> {
        self.requests.borrow_mut().push(request.clone());
        Ok(())
    }
}

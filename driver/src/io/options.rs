//! BOUT.inp options file for the Hermes-3 transport model.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use minijinja::Environment;
use serde::Serialize;
use tracing::{debug, info};

use crate::core::topology::MeshTopology;
use crate::io::config::TransportOptions;

const TRANSPORT_TEMPLATE: &str = include_str!("templates/hermes_transport.inp");

/// Inputs for one rendering of the options file.
#[derive(Debug, Clone)]
pub struct OptionsInputs<'a> {
    pub options: &'a TransportOptions,
    /// Grid file path as the solver should see it.
    pub gridfile: &'a Path,
    pub topology: &'a MeshTopology,
}

/// Variables visible to the template.
#[derive(Debug, Serialize)]
struct TemplateContext<'a> {
    gridfile: String,
    nx: i64,
    mxg: u32,
    #[serde(flatten)]
    options: &'a TransportOptions,
}

/// Template engine wrapper around minijinja.
pub struct OptionsRenderer {
    env: Environment<'static>,
}

impl OptionsRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("transport", TRANSPORT_TEMPLATE)
            .context("load transport options template")?;
        Ok(Self { env })
    }

    pub fn render(&self, inputs: &OptionsInputs<'_>) -> Result<String> {
        let template = self.env.get_template("transport")?;
        let rendered = template
            .render(TemplateContext {
                gridfile: inputs.gridfile.display().to_string(),
                nx: inputs.topology.nx,
                mxg: inputs.topology.guard_x,
                options: inputs.options,
            })
            .context("render transport options")?;
        Ok(rendered)
    }
}

/// Render the options file and write it to `path`.
pub fn write_options(path: &Path, inputs: &OptionsInputs<'_>) -> Result<()> {
    let rendered = OptionsRenderer::new()?.render(inputs)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create options dir {}", parent.display()))?;
    }
    fs::write(path, &rendered).with_context(|| format!("write options {}", path.display()))?;
    info!(path = %path.display(), "options file written");
    debug!(options = ?inputs.options, "transport options");
    Ok(())
}

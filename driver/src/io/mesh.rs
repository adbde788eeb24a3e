//! Mesh metadata files: `name = value` text describing a generated grid.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::core::topology::{MeshFields, MeshTopology, TOPOLOGY_FIELDS};

static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*([^\s#]+)\s*(?:#.*)?$").expect("field regex is valid")
});

/// Named scalar fields parsed from a mesh metadata file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridMetadata {
    fields: HashMap<String, String>,
}

impl GridMetadata {
    /// Parse metadata text. Blank lines, `#` comments and lines that are not
    /// scalar assignments are skipped; a trailing `# ...` after a value is
    /// ignored. A repeated name keeps the last value.
    pub fn parse(text: &str) -> Self {
        let fields = text
            .lines()
            .filter(|line| !line.trim_start().starts_with('#'))
            .filter_map(|line| FIELD_RE.captures(line))
            .map(|caps| (caps[1].to_string(), caps[2].to_string()))
            .collect();
        Self { fields }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read mesh metadata {}", path.display()))?;
        let metadata = Self::parse(&text);
        debug!(path = %path.display(), fields = metadata.fields.len(), "mesh metadata loaded");
        Ok(metadata)
    }
}

impl MeshFields for GridMetadata {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Read the (raw, unnormalized) topology from a metadata file.
pub fn read_topology(path: &Path, guard_x: u32, guard_y: u32) -> Result<MeshTopology> {
    let metadata = GridMetadata::load(path)?;
    let topology = MeshTopology::from_fields(&metadata, guard_x, guard_y)
        .with_context(|| format!("read topology from {}", path.display()))?;
    Ok(topology)
}

/// Render a topology as metadata text readable by [`GridMetadata::parse`].
pub fn format_topology(topology: &MeshTopology) -> String {
    let mut out = String::from("# mesh topology\n");
    for (name, value) in TOPOLOGY_FIELDS.iter().zip(topology.values()) {
        out.push_str(&format!("{name} = {value}\n"));
    }
    out
}

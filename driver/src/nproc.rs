//! Processor-count selection for a mesh on disk.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::core::decomposition::{Decomposition, find_decomposition};
use crate::core::topology::MeshTopology;
use crate::io::mesh::read_topology;

/// Topology as read and normalized, with the decomposition chosen for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorChoice {
    pub topology: MeshTopology,
    pub decomposition: Decomposition,
}

/// Read the topology from `metadata_path`, normalize it, and pick the
/// largest usable processor count not exceeding `max_processors`.
///
/// Failures carry a [`crate::core::error::DecompositionError`] that callers
/// can recover with `downcast_ref`.
pub fn choose_processor_count(
    metadata_path: &Path,
    guard_x: u32,
    guard_y: u32,
    max_processors: u32,
) -> Result<ProcessorChoice> {
    let raw = read_topology(metadata_path, guard_x, guard_y)?;
    let topology = raw.normalized();
    if topology != raw {
        info!(?raw, ?topology, "normalized mesh branch cuts");
    }
    let decomposition = find_decomposition(&topology, max_processors)
        .with_context(|| format!("decompose mesh {}", metadata_path.display()))?;
    info!(
        processors = decomposition.total_processors,
        nxpe = decomposition.row_count,
        max_processors,
        double_null = topology.is_double_null(),
        "chose processor count"
    );
    Ok(ProcessorChoice {
        topology,
        decomposition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{DecompositionError, RequestFailure};
    use crate::io::mesh::format_topology;
    use crate::test_support::{double_null_topology, single_null_topology};
    use std::fs;

    #[test]
    fn chooses_count_for_single_null_mesh() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("grid.txt");
        fs::write(&path, format_topology(&single_null_topology())).expect("write");

        let choice = choose_processor_count(&path, 2, 2, 8).expect("choose");
        assert_eq!(choice.decomposition.total_processors, 8);
        assert_eq!(choice.topology, single_null_topology());
    }

    #[test]
    fn reports_unsatisfiable_bound() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("grid.txt");
        fs::write(&path, format_topology(&double_null_topology())).expect("write");

        let err = choose_processor_count(&path, 2, 2, 6).unwrap_err();
        assert_eq!(
            err.downcast_ref::<DecompositionError>(),
            Some(&DecompositionError::InvalidRequest {
                max_processors: 6,
                reason: RequestFailure::NoValidDecomposition,
            })
        );
    }

    #[test]
    fn returns_normalized_topology() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("grid.txt");
        let raw = MeshTopology {
            jyseps2_2: 40,
            ..single_null_topology()
        };
        fs::write(&path, format_topology(&raw)).expect("write");

        let choice = choose_processor_count(&path, 2, 2, 4).expect("choose");
        assert_eq!(choice.topology.jyseps2_2, 15);
    }
}

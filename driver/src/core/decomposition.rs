//! Processor-count search for the mesh's 2D domain decomposition.
//!
//! A total of `p` processes is split into `row_count` processes along x and
//! `p / row_count` along y. A split is only usable if every process receives
//! the same number of interior x-points and y-rows, and if every branch cut of
//! the topology falls on a process boundary. The search picks the largest `p`
//! not exceeding the caller's budget for which some split is usable.

use tracing::debug;

use crate::core::error::{DecompositionError, RequestFailure};
use crate::core::topology::MeshTopology;

/// A certified split: `total_processors` processes, `row_count` of them along x.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decomposition {
    pub total_processors: u32,
    pub row_count: u32,
}

impl Decomposition {
    /// Number of processes along y.
    pub fn column_count(&self) -> u32 {
        self.total_processors / self.row_count
    }
}

/// Decide whether `row_count` x-processes out of `total_processors` is a
/// legal split of `topology`.
///
/// `topology` is expected to be normalized. Returns `false` for zero counts,
/// for `row_count` values that do not divide `total_processors`, and for
/// cut spans that do not fit in an `i64`.
pub fn is_valid_split(topology: &MeshTopology, row_count: u32, total_processors: u32) -> bool {
    if row_count == 0 || total_processors == 0 || total_processors % row_count != 0 {
        return false;
    }
    let rows = i64::from(row_count);
    if topology.interior_x() % rows != 0 {
        return false;
    }

    let column_count = i64::from(total_processors / row_count);
    if topology.ny % column_count != 0 {
        return false;
    }
    let rows_per_proc = topology.ny / column_count;
    if rows_per_proc < 1 {
        return false;
    }
    if rows_per_proc < i64::from(topology.guard_y) && column_count != 1 {
        return false;
    }

    let aligned = |span: Option<i64>| span.is_some_and(|span| span % rows_per_proc == 0);
    let t = topology;

    if !aligned(t.jyseps1_1.checked_add(1)) {
        return false;
    }

    let cuts_aligned = if t.is_double_null() {
        aligned(t.jyseps2_1.checked_sub(t.jyseps1_1))
            && aligned(t.jyseps2_2.checked_sub(t.jyseps1_2))
            && aligned(
                t.ny_inner
                    .checked_sub(t.jyseps2_1)
                    .and_then(|v| v.checked_sub(1)),
            )
            && aligned(
                t.jyseps1_2
                    .checked_sub(t.ny_inner)
                    .and_then(|v| v.checked_add(1)),
            )
    } else {
        aligned(t.jyseps2_2.checked_sub(t.jyseps1_1))
    };
    if !cuts_aligned {
        return false;
    }

    aligned(t.ny.checked_sub(t.jyseps2_2).and_then(|v| v.checked_sub(1)))
}

/// Row counts tried for a total of `total_processors`, in ascending order.
///
/// Proper divisors of the total; the single-process total contributes `1`
/// so the all-in-one split is checked like any other.
pub fn candidate_row_counts(total_processors: u32) -> Vec<u32> {
    if total_processors <= 1 {
        return if total_processors == 1 { vec![1] } else { Vec::new() };
    }
    let mut small = Vec::new();
    let mut large = Vec::new();
    let mut d = 1u32;
    while u64::from(d) * u64::from(d) <= u64::from(total_processors) {
        if total_processors % d == 0 {
            small.push(d);
            let pair = total_processors / d;
            if pair != d && pair != total_processors {
                large.push(pair);
            }
        }
        d += 1;
    }
    small.extend(large.into_iter().rev());
    small
}

/// Find the largest usable processor count in `[1, max_processors]`, along
/// with the first row count (ascending) that certifies it.
///
/// The topology is normalized and shape-checked before searching.
pub fn find_decomposition(
    topology: &MeshTopology,
    max_processors: u32,
) -> Result<Decomposition, DecompositionError> {
    let topology = topology.normalized();
    topology.check()?;
    if max_processors == 0 {
        return Err(DecompositionError::InvalidRequest {
            max_processors,
            reason: RequestFailure::NonPositiveBound,
        });
    }

    for total_processors in (1..=max_processors).rev() {
        let found = candidate_row_counts(total_processors)
            .into_iter()
            .find(|&row_count| is_valid_split(&topology, row_count, total_processors));
        if let Some(row_count) = found {
            debug!(
                total_processors,
                row_count, max_processors, "found valid decomposition"
            );
            return Ok(Decomposition {
                total_processors,
                row_count,
            });
        }
    }

    Err(DecompositionError::InvalidRequest {
        max_processors,
        reason: RequestFailure::NoValidDecomposition,
    })
}

/// Largest usable total processor count not exceeding `max_processors`.
pub fn find_processor_count(
    topology: &MeshTopology,
    max_processors: u32,
) -> Result<u32, DecompositionError> {
    find_decomposition(topology, max_processors).map(|d| d.total_processors)
}

//! Mesh topology: global grid size, branch cuts and guard cells.
//!
//! Branch-cut indices (`jyseps*`) delimit the poloidal regions of a tokamak
//! mesh. Mesh generators do not always emit them in a self-consistent order,
//! so every topology is normalized before it is used for decomposition.

use serde::{Deserialize, Serialize};

use crate::core::error::DecompositionError;

/// Default number of guard cells per processor in each direction.
pub const DEFAULT_GUARD_CELLS: u32 = 2;

/// Largest magnitude accepted for any topology field.
pub const MAX_FIELD_MAGNITUDE: i64 = i32::MAX as i64;

/// Field names read from mesh metadata, in reading order.
pub const TOPOLOGY_FIELDS: [&str; 7] = [
    "nx",
    "ny",
    "jyseps1_1",
    "jyseps1_2",
    "jyseps2_1",
    "jyseps2_2",
    "ny_inner",
];

/// Source of named numeric fields (a grid file, a metadata sidecar, ...).
pub trait MeshFields {
    /// Raw textual value of `name`, or `None` if the field is absent.
    fn field(&self, name: &str) -> Option<&str>;
}

/// Immutable description of one mesh's global grid and branch cuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshTopology {
    /// Global x size, including guard cells.
    pub nx: i64,
    /// Global y size.
    pub ny: i64,
    pub jyseps1_1: i64,
    pub jyseps1_2: i64,
    pub jyseps2_1: i64,
    pub jyseps2_2: i64,
    /// Y index of the inner-divertor boundary (double-null only).
    pub ny_inner: i64,
    pub guard_x: u32,
    pub guard_y: u32,
}

impl MeshTopology {
    /// Read the topology fields from `fields`.
    ///
    /// Values may be written as integers or as integral floats (`16.0`).
    /// The result is not normalized.
    pub fn from_fields<F: MeshFields + ?Sized>(
        fields: &F,
        guard_x: u32,
        guard_y: u32,
    ) -> Result<Self, DecompositionError> {
        let read = |name: &str| -> Result<i64, DecompositionError> {
            let raw = fields
                .field(name)
                .ok_or_else(|| DecompositionError::malformed(name, "is missing"))?;
            let value = parse_integer_like(raw).ok_or_else(|| {
                DecompositionError::malformed(name, format!("is not an integer (got '{raw}')"))
            })?;
            check_magnitude(name, value)?;
            Ok(value)
        };
        Ok(Self {
            nx: read("nx")?,
            ny: read("ny")?,
            jyseps1_1: read("jyseps1_1")?,
            jyseps1_2: read("jyseps1_2")?,
            jyseps2_1: read("jyseps2_1")?,
            jyseps2_2: read("jyseps2_2")?,
            ny_inner: read("ny_inner")?,
            guard_x,
            guard_y,
        })
    }

    /// Interior x-width (`nx` minus the x guard cells on both sides).
    pub fn interior_x(&self) -> i64 {
        self.nx.saturating_sub(2 * i64::from(self.guard_x))
    }

    /// Double-null meshes have two distinct inner branch cuts.
    pub fn is_double_null(&self) -> bool {
        self.jyseps2_1 != self.jyseps1_2
    }

    /// Clamp branch cuts into a monotone, in-range ordering.
    ///
    /// Rules are applied in order; later rules see earlier clamped values.
    /// Never fails: shape problems that clamping cannot recover are reported
    /// by [`MeshTopology::check`].
    pub fn normalized(&self) -> Self {
        let mut t = *self;
        if t.jyseps1_1 < -1 {
            t.jyseps1_1 = -1;
        }
        if t.jyseps2_1 <= t.jyseps1_1 {
            t.jyseps2_1 = t.jyseps1_1.saturating_add(1);
        }
        if t.jyseps1_2 < t.jyseps2_1 {
            t.jyseps1_2 = t.jyseps2_1;
        }
        if t.jyseps2_2 >= t.ny {
            t.jyseps2_2 = t.ny.saturating_sub(1);
        }
        if t.jyseps2_2 < t.jyseps1_2 {
            t.jyseps2_2 = t.jyseps1_2;
        }
        t
    }

    /// Reject shapes no decomposition can be built on.
    ///
    /// Expects a normalized topology.
    pub fn check(&self) -> Result<(), DecompositionError> {
        for (name, value) in TOPOLOGY_FIELDS.iter().zip(self.values()) {
            check_magnitude(name, value)?;
        }
        if self.ny < 1 {
            return Err(DecompositionError::malformed(
                "ny",
                format!("must be >= 1 (got {})", self.ny),
            ));
        }
        if self.interior_x() < 1 {
            return Err(DecompositionError::malformed(
                "nx",
                format!(
                    "must exceed 2 * guard_x = {} (got {})",
                    2 * i64::from(self.guard_x),
                    self.nx
                ),
            ));
        }
        if self.jyseps1_2 > self.ny - 1 {
            return Err(DecompositionError::malformed(
                "jyseps1_2",
                format!("must be <= ny - 1 = {} (got {})", self.ny - 1, self.jyseps1_2),
            ));
        }
        Ok(())
    }

    /// Field values in [`TOPOLOGY_FIELDS`] order.
    pub fn values(&self) -> [i64; 7] {
        [
            self.nx,
            self.ny,
            self.jyseps1_1,
            self.jyseps1_2,
            self.jyseps2_1,
            self.jyseps2_2,
            self.ny_inner,
        ]
    }
}

fn check_magnitude(name: &str, value: i64) -> Result<(), DecompositionError> {
    if (-MAX_FIELD_MAGNITUDE..=MAX_FIELD_MAGNITUDE).contains(&value) {
        return Ok(());
    }
    Err(DecompositionError::malformed(
        name,
        format!("is out of range (got {value}, limit {MAX_FIELD_MAGNITUDE})"),
    ))
}

fn parse_integer_like(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    let value = raw.parse::<f64>().ok()?;
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    if value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return None;
    }
    Some(value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn topology(jyseps1_1: i64, jyseps2_1: i64, jyseps1_2: i64, jyseps2_2: i64) -> MeshTopology {
        MeshTopology {
            nx: 24,
            ny: 16,
            jyseps1_1,
            jyseps1_2,
            jyseps2_1,
            jyseps2_2,
            ny_inner: 8,
            guard_x: 2,
            guard_y: 2,
        }
    }

    impl MeshFields for HashMap<&str, &str> {
        fn field(&self, name: &str) -> Option<&str> {
            self.get(name).copied()
        }
    }

    fn fields(pairs: &[(&'static str, &'static str)]) -> HashMap<&'static str, &'static str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn normalize_leaves_ordered_topology_untouched() {
        let t = topology(3, 7, 7, 11);
        assert_eq!(t.normalized(), t);
    }

    #[test]
    fn normalize_clamps_lower_sentinel() {
        let t = topology(-5, 7, 7, 15).normalized();
        assert_eq!(t.jyseps1_1, -1);
    }

    #[test]
    fn normalize_separates_coincident_lower_cuts() {
        let t = topology(3, 3, 11, 11).normalized();
        assert_eq!(t.jyseps2_1, 4);
        assert_eq!(t.jyseps1_2, 11);
    }

    #[test]
    fn normalize_cascades_through_later_rules() {
        let t = topology(9, 2, 1, 0).normalized();
        assert_eq!(
            (t.jyseps1_1, t.jyseps2_1, t.jyseps1_2, t.jyseps2_2),
            (9, 10, 10, 10)
        );
    }

    #[test]
    fn normalize_clamps_upper_cut_to_grid() {
        let t = topology(3, 7, 7, 40).normalized();
        assert_eq!(t.jyseps2_2, 15);
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = topology(-3, -7, 20, 99).normalized();
        assert_eq!(once.normalized(), once);
    }

    #[test]
    fn check_rejects_non_positive_ny() {
        let mut t = topology(-1, 0, 0, 0);
        t.ny = -4;
        let err = t.normalized().check().unwrap_err();
        assert!(matches!(
            err,
            DecompositionError::MalformedTopology { ref field, .. } if field == "ny"
        ));
    }

    #[test]
    fn check_rejects_mesh_without_interior_x() {
        let mut t = topology(3, 7, 7, 11);
        t.nx = 4;
        let err = t.check().unwrap_err();
        assert!(err.to_string().contains("'nx'"));
    }

    #[test]
    fn check_rejects_branch_cut_beyond_grid() {
        let t = topology(20, 21, 21, 21).normalized();
        let err = t.check().unwrap_err();
        assert!(err.to_string().contains("jyseps1_2"));
    }

    #[test]
    fn from_fields_accepts_integral_floats() {
        let f = fields(&[
            ("nx", "24"),
            ("ny", "16.0"),
            ("jyseps1_1", "3"),
            ("jyseps1_2", "7"),
            ("jyseps2_1", "7"),
            ("jyseps2_2", " 11 "),
            ("ny_inner", "8.0"),
        ]);
        let t = MeshTopology::from_fields(&f, 2, 2).expect("read");
        assert_eq!(t, topology(3, 7, 7, 11));
        assert!(!t.is_double_null());
    }

    #[test]
    fn from_fields_reports_missing_field() {
        let f = fields(&[("nx", "24"), ("ny", "16")]);
        let err = MeshTopology::from_fields(&f, 2, 2).unwrap_err();
        assert_eq!(
            err,
            DecompositionError::MalformedTopology {
                field: "jyseps1_1".to_string(),
                reason: "is missing".to_string(),
            }
        );
    }

    #[test]
    fn from_fields_rejects_fractional_value() {
        let f = fields(&[
            ("nx", "24"),
            ("ny", "16.5"),
            ("jyseps1_1", "3"),
            ("jyseps1_2", "7"),
            ("jyseps2_1", "7"),
            ("jyseps2_2", "11"),
            ("ny_inner", "8"),
        ]);
        let err = MeshTopology::from_fields(&f, 2, 2).unwrap_err();
        assert!(err.to_string().contains("'ny' is not an integer"));
    }

    #[test]
    fn parse_integer_like_rejects_non_numeric() {
        assert_eq!(parse_integer_like("sixteen"), None);
        assert_eq!(parse_integer_like("nan"), None);
        assert_eq!(parse_integer_like("-1"), Some(-1));
        assert_eq!(parse_integer_like("1e2"), Some(100));
    }

    #[test]
    fn parse_integer_like_rejects_float_at_i64_limit() {
        assert_eq!(parse_integer_like("9223372036854775808.0"), None);
        assert_eq!(parse_integer_like("9223372036854775807"), Some(i64::MAX));
    }

    #[test]
    fn from_fields_rejects_out_of_range_value() {
        let f = fields(&[
            ("nx", "24"),
            ("ny", "16"),
            ("jyseps1_1", "9223372036854775807"),
            ("jyseps1_2", "7"),
            ("jyseps2_1", "7"),
            ("jyseps2_2", "11"),
            ("ny_inner", "8"),
        ]);
        let err = MeshTopology::from_fields(&f, 2, 2).unwrap_err();
        assert!(err.to_string().contains("'jyseps1_1' is out of range"));
    }

    #[test]
    fn extreme_cuts_normalize_and_fail_check() {
        let t = topology(i64::MAX, 7, 7, 11).normalized();
        assert_eq!(t.jyseps2_1, i64::MAX);
        let err = t.check().unwrap_err();
        assert!(matches!(
            err,
            DecompositionError::MalformedTopology { ref field, .. } if field == "jyseps1_1"
        ));

        let mut t = topology(3, 7, 7, 11);
        t.ny = i64::MIN;
        t.nx = i64::MIN;
        assert!(t.normalized().check().is_err());
    }
}

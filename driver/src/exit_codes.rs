//! Stable exit codes for driver CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to invalid config/mesh or any other error.
pub const INVALID: i32 = 1;
/// `driver nproc` or `driver step` found no usable processor count within the bound.
pub const NO_DECOMPOSITION: i32 = 2;

//! Driver for a Hermes-3 transport pipeline: generate a mesh from an
//! equilibrium, then run the parallel transport solver on it across
//! restartable time windows.
//!
//! - **[`core`]**: Pure, deterministic logic (topology normalization,
//!   decomposition search, run mode). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config, mesh metadata, options
//!   rendering, process launch). Isolated behind traits for tests.
//!
//! Orchestration modules ([`nproc`], [`transport`], [`step`]) coordinate core
//! logic with I/O to implement CLI commands.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod nproc;
pub mod step;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod transport;

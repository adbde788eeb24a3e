//! Deterministic, pure logic shared by the driver.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! values and return deterministic outputs suitable for tests, and are safe
//! to call concurrently.

pub mod decomposition;
pub mod error;
pub mod run_mode;
pub mod topology;

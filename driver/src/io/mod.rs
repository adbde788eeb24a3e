//! I/O adapters for driver commands.

pub mod config;
pub mod gridgen;
pub mod launcher;
pub mod mesh;
pub mod options;
pub mod paths;
pub mod process;
pub mod run_state;

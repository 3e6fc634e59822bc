//! CLI command implementations.

pub mod bench;
pub mod common;
pub mod devices;
pub mod process;
pub mod run;

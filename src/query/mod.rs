//! Statement execution and result rendering for Airgraph.
//!
//! This module isolates the per-phase execution policies and the tabular
//! renderer from the pipeline driver.

pub mod render;
pub mod runner;

pub use render::{format_row, render, RenderedReport};
pub use runner::{run_mutating, run_read_only, PhaseReport};

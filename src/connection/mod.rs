//! Connection management for Airgraph.
//!
//! Centralizes the connection lifecycle for a pipeline run.

pub mod manager;

pub use manager::ConnectionManager;

//! Airgraph - Provision a Neo4j flight network from CSV files and analyze it.
//!
//! This library exposes the core modules for use by the binary and in
//! integration tests.

pub mod catalog;
pub mod config;
pub mod connection;
pub mod console;
pub mod db;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod query;

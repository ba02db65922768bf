//! Integration tests for Airgraph.
//!
//! Live tests are skipped unless NEO4J_TEST_URI is set.

pub mod catalog_test;
pub mod connection_test;
pub mod neo4j_test;
pub mod pipeline_test;

//! Test Module
//!
//! Suite tests for the review analyzer.
//!
//! ## Test Categories
//! - `pipeline_tests`: language, sentiment and theme stages, single-record analysis
//! - `capability_tests`: HTTP sidecar adapter and preflight
//! - `storage_tests`: review store persistence and verification queries
//! - `resilience_tests`: batch behavior under failing, slow and panicking capabilities

mod mocks;

pub mod resilience_tests;

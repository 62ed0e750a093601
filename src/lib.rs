//! locustgen - generate LocustTest custom resource manifests from YAML
//! test configurations.
//!
//! The pipeline is a synchronous transformation: load YAML, validate it
//! against the configuration schema, derive command seeds and resource
//! names, and write one manifest file per configured test.

pub mod config;
pub mod error;
pub mod locust;

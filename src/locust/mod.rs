//! LocustTest manifest generation domain.
//!
//! `config` holds the validated configuration schema, `resource` the
//! generated custom resource model, `generator` the derivation rules
//! (names and command seeds), and `pipeline` the load/validate/write
//! driver tying them together.

pub mod config;
pub mod generator;
pub mod pipeline;
pub mod resource;

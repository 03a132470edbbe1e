//! Document loading.
//!
//! This module reads `.prompty`, JSON and YAML files, expands references,
//! and binds them into typed documents. Workspace settings come from
//! `prompty.toml`.

pub mod error;
pub mod loader;
pub mod models;
pub mod references;

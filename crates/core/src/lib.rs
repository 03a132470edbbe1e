//! # prompty-core
//!
//! File-level tooling around the prompty document model.
//!
//! This crate provides:
//! - Parsing of JSON, YAML and `.prompty` (Markdown front matter) files
//! - `${env:...}` and `${file:...}` reference expansion
//! - Workspace discovery with settings from `prompty.toml`
//!
//! ## Modules
//!
//! - [`config`]: Document loading and workspace settings

pub mod config;

pub use config::error::ConfigError;
pub use config::error::ConfigResult;
pub use config::loader::load_document;
pub use config::loader::load_workspace;
pub use config::models::DocumentFormat;
pub use config::models::Workspace;

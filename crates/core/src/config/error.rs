//! Error types for document loading.
//!
//! This module defines all errors that can occur while reading, parsing,
//! expanding and binding document files.

use prompty_protocol::BindError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during document loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a file from disk.
    #[error("Failed to read file at {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML file at {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Failed to parse YAML text.
    #[error("Failed to parse YAML in {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// Failed to parse JSON text.
    #[error("Failed to parse JSON in {path}: {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Failed to split or parse Markdown front matter.
    #[error("Failed to parse Markdown front matter in {path}: {reason}")]
    MarkdownParse { path: PathBuf, reason: String },

    /// Failed to walk directory structure.
    #[error("Failed to traverse directory {path}: {source}")]
    DirectoryWalk {
        path: PathBuf,
        source: walkdir::Error,
    },

    /// The file extension does not name a document format.
    #[error("Unsupported document format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// A `${env:...}` or `${file:...}` reference could not be resolved.
    #[error("Failed to resolve reference for key `{key}` in {path}: {reason}")]
    Reference {
        path: PathBuf,
        key: String,
        reason: String,
    },

    /// The parsed tree did not bind to a document.
    #[error("Invalid document {path}: {source}")]
    Bind { path: PathBuf, source: BindError },
}

/// Type alias for Result with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;

//! Workspace models: formats, settings and loaded documents.

use prompty_protocol::config_models::BindOptions;
use prompty_protocol::Document;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Name of the optional workspace settings file.
pub const WORKSPACE_CONFIG_FILE: &str = "prompty.toml";

/// Text format of a document file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Markdown with YAML front matter (`.prompty`).
    Prompty,
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Format for `path`, or `None` when the extension is not a document one.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("prompty") => Some(Self::Prompty),
            Some("json") => Some(Self::Json),
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Settings from `prompty.toml`.
///
/// # Example
///
/// ```toml
/// [bind]
/// max-depth = 32
/// name-policy = "strict"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct WorkspaceConfig {
    /// Options applied to every document in the workspace.
    #[serde(default)]
    pub bind: BindOptions,
}

/// A document together with the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub path: PathBuf,
    pub document: Document,
}

/// Every document found directly under a workspace root.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    pub config: WorkspaceConfig,

    /// Documents in path order.
    pub documents: Vec<LoadedDocument>,
}

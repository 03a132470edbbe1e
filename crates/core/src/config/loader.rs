//! Document loader for `.prompty`, JSON and YAML files.
//!
//! Loading a file runs the whole pipeline:
//! - parse the text into a generic tree (front matter for `.prompty`)
//! - expand `${env:...}` and `${file:...}` references
//! - bind the tree into a [`Document`]

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::DocumentFormat;
use crate::config::models::LoadedDocument;
use crate::config::models::Workspace;
use crate::config::models::WorkspaceConfig;
use crate::config::models::WORKSPACE_CONFIG_FILE;
use crate::config::references::expand_references;
use gray_matter::engine::YAML;
use gray_matter::Matter;
use prompty_protocol::bind_with;
use prompty_protocol::config_models::BindOptions;
use prompty_protocol::Document;
use prompty_protocol::Map;
use prompty_protocol::Value;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;
use tracing::info;
use walkdir::WalkDir;

/// Parses JSON or YAML text into a generic tree.
///
/// `origin` only labels errors. `.prompty` text is handled by
/// [`split_front_matter`].
pub fn parse_text(text: &str, format: DocumentFormat, origin: &Path) -> ConfigResult<Value> {
    match format {
        DocumentFormat::Json => serde_json::from_str(text).map_err(|source| ConfigError::JsonParse {
            path: origin.to_path_buf(),
            source,
        }),
        DocumentFormat::Yaml => serde_yaml::from_str(text).map_err(|source| ConfigError::YamlParse {
            path: origin.to_path_buf(),
            source,
        }),
        DocumentFormat::Prompty => split_front_matter(text, origin).map(Value::Object),
    }
}

/// Splits a `.prompty` file into its front matter map and Markdown body.
///
/// The body becomes `instructions` unless the front matter already sets it.
/// A file without front matter is body-only: `{instructions: <body>}`.
/// `kind` defaults to `prompt`.
pub fn split_front_matter(text: &str, origin: &Path) -> ConfigResult<Map> {
    let matter = Matter::<YAML>::new();
    let parsed = matter.parse(text);

    let mut map = if parsed.matter.trim().is_empty() {
        Map::new()
    } else {
        match serde_yaml::from_str::<Value>(&parsed.matter) {
            Ok(Value::Object(map)) => map,
            Ok(Value::Null) => Map::new(),
            Ok(other) => {
                return Err(ConfigError::MarkdownParse {
                    path: origin.to_path_buf(),
                    reason: format!("front matter must be a map, found {other}"),
                })
            }
            Err(e) => {
                return Err(ConfigError::MarkdownParse {
                    path: origin.to_path_buf(),
                    reason: format!("Failed to parse front matter: {e}"),
                })
            }
        }
    };

    let body = parsed.content.trim_start();
    if !body.trim().is_empty() && !map.contains_key("instructions") {
        map.insert("instructions".to_string(), Value::String(body.to_string()));
    }
    if !map.contains_key("kind") {
        map.insert("kind".to_string(), Value::String("prompt".to_string()));
    }
    Ok(map)
}

/// Loads and binds one document file.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The extension is not `.prompty`, `.json`, `.yaml` or `.yml`
/// - The file cannot be read or parsed
/// - A reference cannot be resolved
/// - The tree does not bind to a document
///
/// # Example
///
/// ```rust,no_run
/// use prompty_core::config::loader::load_document;
/// use prompty_protocol::BindOptions;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let document = load_document(Path::new("basic.prompty"), &BindOptions::default())?;
/// println!("Loaded {}", document.name);
/// # Ok(())
/// # }
/// ```
pub fn load_document(path: &Path, options: &BindOptions) -> ConfigResult<Document> {
    let format = DocumentFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut tree = parse_text(&content, format, path)?;
    expand_references(&mut tree, path)?;

    debug!(path = %path.display(), ?format, "binding document");
    bind_with(tree, options).map_err(|source| ConfigError::Bind {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads `prompty.toml` from `root`, or defaults when it does not exist.
pub fn load_workspace_config(root: &Path) -> ConfigResult<WorkspaceConfig> {
    let config_path = root.join(WORKSPACE_CONFIG_FILE);

    if !config_path.exists() {
        return Ok(WorkspaceConfig::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path,
        source,
    })
}

/// Lists document files directly under `root`, in path order.
///
/// A missing root yields no files.
pub fn discover_documents(root: &Path) -> ConfigResult<Vec<PathBuf>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = entry.map_err(|source| ConfigError::DirectoryWalk {
            path: root.to_path_buf(),
            source,
        })?;

        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if DocumentFormat::from_path(path).is_some() {
            debug!(path = %path.display(), "discovered document");
            paths.push(path.to_path_buf());
        } else {
            debug!(path = %path.display(), "skipping non-document file");
        }
    }

    Ok(paths)
}

/// Loads every document directly under `root`.
///
/// Settings come from `root/prompty.toml` when present. Loading stops at the
/// first document that fails.
pub fn load_workspace(root: &Path) -> ConfigResult<Workspace> {
    if !root.exists() {
        return Ok(Workspace::default());
    }

    let config = load_workspace_config(root)?;
    let documents = discover_documents(root)?
        .into_iter()
        .map(|path| {
            let document = load_document(&path, &config.bind)?;
            Ok(LoadedDocument { path, document })
        })
        .collect::<ConfigResult<Vec<_>>>()?;

    info!(root = %root.display(), count = documents.len(), "loaded workspace");
    Ok(Workspace { config, documents })
}

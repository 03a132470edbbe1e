//! `${protocol:value}` reference expansion.
//!
//! A string value that is exactly one reference is replaced before binding:
//!
//! - `${env:NAME}`: the environment variable, which must be set
//! - `${env:NAME:default}`: the variable, or `default` when unset
//! - `${file:relative/path}`: the file's content, relative to the document.
//!   `.json`, `.yaml` and `.yml` files are parsed; anything else is text.
//!
//! Strings with other protocols, or with text around the reference, are
//! left untouched.

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::loader::parse_text;
use crate::config::models::DocumentFormat;
use prompty_protocol::Value;
use std::path::Path;
use tracing::debug;

/// Expands references in every map value of `node`, recursing into nested
/// maps and lists.
///
/// `origin` is the document being loaded; file references resolve against
/// its directory.
pub fn expand_references(node: &mut Value, origin: &Path) -> ConfigResult<()> {
    match node {
        Value::Object(map) => {
            for (key, value) in map.iter_mut() {
                if let Value::String(text) = value {
                    if let Some(expanded) = resolve_reference(key, text, origin)? {
                        *value = expanded;
                    }
                } else {
                    expand_references(value, origin)?;
                }
            }
            Ok(())
        }
        Value::Array(items) => items
            .iter_mut()
            .try_for_each(|item| expand_references(item, origin)),
        _ => Ok(()),
    }
}

fn resolve_reference(key: &str, text: &str, origin: &Path) -> ConfigResult<Option<Value>> {
    let Some(inner) = text.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) else {
        return Ok(None);
    };
    let (protocol, reference) = inner.split_once(':').unwrap_or((inner, ""));

    match protocol.to_ascii_lowercase().as_str() {
        "env" => {
            let (name, default) = reference.split_once(':').unwrap_or((reference, ""));
            match std::env::var(name) {
                Ok(found) => Ok(Some(Value::String(found))),
                Err(_) if !default.is_empty() => Ok(Some(Value::String(default.to_string()))),
                Err(_) => Err(ConfigError::Reference {
                    path: origin.to_path_buf(),
                    key: key.to_string(),
                    reason: format!("environment variable `{name}` is not set"),
                }),
            }
        }
        "file" => {
            let base = origin.parent().unwrap_or_else(|| Path::new("."));
            let target = base.join(reference);
            debug!(key, path = %target.display(), "expanding file reference");
            if !target.is_file() {
                return Err(ConfigError::Reference {
                    path: origin.to_path_buf(),
                    key: key.to_string(),
                    reason: format!("referenced file `{}` not found", target.display()),
                });
            }
            let content = std::fs::read_to_string(&target).map_err(|source| ConfigError::FileRead {
                path: target.clone(),
                source,
            })?;
            match DocumentFormat::from_path(&target) {
                Some(format @ (DocumentFormat::Json | DocumentFormat::Yaml)) => {
                    parse_text(&content, format, &target).map(Some)
                }
                _ => Ok(Some(Value::String(content))),
            }
        }
        _ => Ok(None),
    }
}

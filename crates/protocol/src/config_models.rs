//! Binding options, usually read from the `[bind]` table of `prompty.toml`.
//!
//! These settings tune how tolerant the binder is. None of them change the
//! meaning of a well-formed document.

use serde::{Deserialize, Serialize};

/// Default recursion limit for nested entities.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// How a map-form collection entry resolves its name when the map key and an
/// explicit `name` field disagree.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NamePolicy {
    /// The explicit `name` field wins over the map key.
    #[default]
    PreferExplicit,

    /// The map key overwrites the explicit `name` field.
    PreferKey,

    /// Disagreement is a `BindError::NameConflict`.
    Strict,
}

/// Settings applied to one bind invocation.
///
/// # Example
///
/// ```toml
/// # prompty.toml
/// [bind]
/// max-depth = 32
/// name-policy = "strict"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct BindOptions {
    /// Maximum entity nesting depth before binding is rejected.
    ///
    /// Well-formed documents are shallow; the guard only rejects
    /// pathological input.
    pub max_depth: usize,

    /// Resolution of map key vs. explicit `name` in named collections.
    pub name_policy: NamePolicy,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            name_policy: NamePolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = BindOptions::default();
        assert_eq!(options.max_depth, 64);
        assert_eq!(options.name_policy, NamePolicy::PreferExplicit);
    }

    #[test]
    fn test_partial_options_keep_defaults() {
        let options: BindOptions =
            serde_json::from_str(r#"{"name-policy": "prefer-key"}"#).unwrap();
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(options.name_policy, NamePolicy::PreferKey);
    }
}

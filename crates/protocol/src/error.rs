//! Error types for binding a generic tree into typed entities.
//!
//! Every variant carries `path`, a JSON-path-like location of the offending
//! node (`$`, `$.tools[0].connection`, `$.inputs.firstName`), plus the
//! entity and field involved, so callers can point at the source line.

use thiserror::Error;

/// Errors raised while normalizing or binding a document.
///
/// Binding fails closed: the first error aborts the whole transform.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindError {
    /// A node's runtime shape has no normalization rule for the entity.
    #[error("{path}: {entity} cannot be read from a {found} value")]
    Shape {
        path: String,
        entity: &'static str,
        found: &'static str,
    },

    /// A named collection was neither a list nor a map.
    #[error("{path}: collection `{field}` on {entity} must be a list or a map, found {found}")]
    CollectionShape {
        path: String,
        entity: &'static str,
        field: String,
        found: &'static str,
    },

    /// A polymorphic map lacks its `kind` field.
    #[error("{path}: {entity} is missing its `kind` discriminator")]
    MissingDiscriminator { path: String, entity: &'static str },

    /// A closed family received a `kind` it does not define.
    #[error("{path}: unknown {entity} kind `{value}`")]
    UnknownDiscriminator {
        path: String,
        entity: &'static str,
        value: String,
    },

    /// A required field was absent (or `null`).
    #[error("{path}: {entity} is missing required field `{field}`")]
    MissingRequiredField {
        path: String,
        entity: &'static str,
        field: String,
    },

    /// A present field could not be coerced to its declared type.
    #[error("{path}: field `{field}` on {entity} expects {expected}, found {found}")]
    TypeCoercion {
        path: String,
        entity: &'static str,
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Nesting went deeper than `BindOptions::max_depth`.
    #[error("{path}: nesting exceeds the maximum depth of {max_depth}")]
    DepthExceeded { path: String, max_depth: usize },

    /// Map key and explicit `name` disagree under `NamePolicy::Strict`.
    #[error("{path}: entry `{key}` declares a different name `{name}`")]
    NameConflict {
        path: String,
        key: String,
        name: String,
    },
}

impl BindError {
    /// Location of the offending node.
    pub fn path(&self) -> &str {
        match self {
            Self::Shape { path, .. }
            | Self::CollectionShape { path, .. }
            | Self::MissingDiscriminator { path, .. }
            | Self::UnknownDiscriminator { path, .. }
            | Self::MissingRequiredField { path, .. }
            | Self::TypeCoercion { path, .. }
            | Self::DepthExceeded { path, .. }
            | Self::NameConflict { path, .. } => path,
        }
    }
}

/// Type alias for Result with BindError.
pub type BindResult<T> = Result<T, BindError>;

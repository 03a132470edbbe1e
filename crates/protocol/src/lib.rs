//! # prompty-protocol
//!
//! Document model and binding layer for prompty agent definitions.
//!
//! This crate turns a parsed generic tree (JSON or YAML values) into a typed
//! [`Document`] and writes documents back out in canonical form:
//!
//! - Shape normalization: scalar shorthands become canonical maps
//! - Collection normalization: named collections in list or map form
//! - Discriminator resolution: `kind` selects the variant of each family
//! - Type binding: fields are coerced, checked and recursed into
//! - Serialization: canonical maps with absent fields omitted
//!
//! ## Modules
//!
//! - [`agent_models`]: Documents (`prompt`, `manifest`, `container`, `hosted`, `workflow`)
//! - [`io_models`]: Inputs, outputs and parameters
//! - [`connection_models`]: Connections
//! - [`container_models`]: Registries, container definitions, scaling
//! - [`tool_models`]: Tools, bindings
//! - [`runtime_models`]: Models, templates
//! - [`config_models`]: Binding options
//!
//! The binding core is pure and synchronous. It performs no I/O; loading files
//! is the job of `prompty-core`.

pub mod agent_models;
pub mod binder;
pub mod collection;
pub mod config_models;
pub mod connection_models;
pub mod container_models;
pub mod discriminator;
pub mod error;
pub mod io_models;
pub mod runtime_models;
pub mod serializer;
pub mod shape;
pub mod tool_models;
pub mod value;

mod serde_impls;

// Re-export all public types for convenience
pub use agent_models::*;
pub use binder::{Bind, BindContext};
pub use collection::Named;
pub use config_models::*;
pub use connection_models::*;
pub use container_models::*;
pub use discriminator::FallbackKind;
pub use error::{BindError, BindResult};
pub use io_models::*;
pub use runtime_models::*;
pub use serializer::Canonical;
pub use tool_models::*;
pub use value::{Map, Value};

/// Binds any entity from a generic tree with the given options.
pub fn bind_with<T: Bind>(node: Value, options: &BindOptions) -> BindResult<T> {
    let mut ctx = BindContext::new(options.clone());
    T::bind(node, &mut ctx)
}

/// Binds a document with default options.
pub fn bind_document(node: Value) -> BindResult<Document> {
    bind_with(node, &BindOptions::default())
}

/// Writes any entity as its canonical map.
pub fn serialize<T: Canonical>(entity: &T) -> Map {
    entity.to_canonical()
}

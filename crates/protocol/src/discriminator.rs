//! Discriminator resolution for polymorphic families.
//!
//! A family is a base entity whose concrete variant is selected by the
//! string `kind` field. Each family declares its table of known kinds and,
//! for open families, the variant that absorbs every other kind.

use std::fmt;
use std::marker::PhantomData;

use tracing::debug;

use crate::binder::BindContext;
use crate::error::{BindError, BindResult};
use crate::value::{shape_name, Map, Value};

/// Name of the discriminating field.
pub const DISCRIMINATOR: &str = "kind";

/// A polymorphic family with a fixed dispatch table.
pub trait Family {
    /// Tag identifying one variant of the family.
    type Tag: Copy + fmt::Debug + 'static;

    /// Entity name used in error messages.
    const ENTITY: &'static str;

    /// Known kind literals and the variant each selects.
    const TABLE: &'static [(&'static str, Self::Tag)];

    /// Variant for kinds missing from the table. `None` makes the family
    /// closed, so unknown kinds are an error.
    const FALLBACK: Option<Self::Tag>;
}

/// A kind literal held by the fallback variant of family `F`.
///
/// Never equal to a literal in `F::TABLE`, so a fallback variant always
/// rebinds to itself.
pub struct FallbackKind<F> {
    literal: String,
    family: PhantomData<fn() -> F>,
}

impl<F: Family> FallbackKind<F> {
    /// Wraps `literal`, or returns `None` when it names a variant of `F`.
    pub fn new(literal: impl Into<String>) -> Option<Self> {
        let literal = literal.into();
        if F::TABLE.iter().any(|(known, _)| *known == literal.as_str()) {
            None
        } else {
            Some(Self::resolved(literal))
        }
    }
}

impl<F> FallbackKind<F> {
    /// Wraps a literal that [`resolve`] already sent to the fallback.
    pub(crate) fn resolved(literal: String) -> Self {
        Self {
            literal,
            family: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.literal
    }
}

impl<F> fmt::Debug for FallbackKind<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FallbackKind").field(&self.literal).finish()
    }
}

impl<F> fmt::Display for FallbackKind<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

impl<F> Clone for FallbackKind<F> {
    fn clone(&self) -> Self {
        Self::resolved(self.literal.clone())
    }
}

impl<F> PartialEq for FallbackKind<F> {
    fn eq(&self, other: &Self) -> bool {
        self.literal == other.literal
    }
}

impl<F> Eq for FallbackKind<F> {}

impl<F> PartialEq<&str> for FallbackKind<F> {
    fn eq(&self, other: &&str) -> bool {
        self.literal == *other
    }
}

/// Resolves the variant of `map` within family `F`.
///
/// Matching is exact and case-sensitive. The map is only inspected; the
/// `kind` value stays in place for the binder to read.
pub fn resolve<F: Family>(map: &Map, ctx: &BindContext) -> BindResult<F::Tag> {
    let kind = match map.get(DISCRIMINATOR) {
        None | Some(Value::Null) => {
            return Err(BindError::MissingDiscriminator {
                path: ctx.path(),
                entity: F::ENTITY,
            })
        }
        Some(Value::String(kind)) => kind,
        Some(other) => {
            return Err(BindError::TypeCoercion {
                path: ctx.field_path(DISCRIMINATOR),
                entity: F::ENTITY,
                field: DISCRIMINATOR.to_string(),
                expected: "a string",
                found: shape_name(other),
            })
        }
    };

    if let Some((_, tag)) = F::TABLE.iter().find(|(literal, _)| *literal == kind.as_str()) {
        debug!(entity = F::ENTITY, kind = %kind, variant = ?tag, "resolved discriminator");
        return Ok(*tag);
    }

    match F::FALLBACK {
        Some(tag) => {
            debug!(entity = F::ENTITY, kind = %kind, variant = ?tag, "unknown kind, using fallback variant");
            Ok(tag)
        }
        None => Err(BindError::UnknownDiscriminator {
            path: ctx.path(),
            entity: F::ENTITY,
            value: kind.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Shade {
        Light,
        Dark,
        Other,
    }

    struct Open;

    impl Family for Open {
        type Tag = Shade;
        const ENTITY: &'static str = "Open";
        const TABLE: &'static [(&'static str, Shade)] = &[("light", Shade::Light), ("dark", Shade::Dark)];
        const FALLBACK: Option<Shade> = Some(Shade::Other);
    }

    struct Closed;

    impl Family for Closed {
        type Tag = Shade;
        const ENTITY: &'static str = "Closed";
        const TABLE: &'static [(&'static str, Shade)] = &[("light", Shade::Light)];
        const FALLBACK: Option<Shade> = None;
    }

    fn map(value: Value) -> Map {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a map"),
        }
    }

    #[test]
    fn test_known_kind_resolves() {
        let ctx = BindContext::default();
        let tag = resolve::<Open>(&map(json!({"kind": "dark"})), &ctx).unwrap();
        assert_eq!(tag, Shade::Dark);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let ctx = BindContext::default();
        let tag = resolve::<Open>(&map(json!({"kind": "Dark"})), &ctx).unwrap();
        assert_eq!(tag, Shade::Other);
    }

    #[test]
    fn test_closed_family_rejects_unknown_kind() {
        let ctx = BindContext::default();
        let err = resolve::<Closed>(&map(json!({"kind": "dark"})), &ctx).unwrap_err();
        assert_eq!(
            err,
            BindError::UnknownDiscriminator {
                path: "$".to_string(),
                entity: "Closed",
                value: "dark".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_or_null_kind() {
        let ctx = BindContext::default();
        for input in [json!({"name": "x"}), json!({"kind": null})] {
            let err = resolve::<Open>(&map(input), &ctx).unwrap_err();
            assert!(matches!(err, BindError::MissingDiscriminator { entity: "Open", .. }));
        }
    }

    #[test]
    fn test_non_string_kind_is_coercion_error() {
        let ctx = BindContext::default();
        let err = resolve::<Open>(&map(json!({"kind": 5})), &ctx).unwrap_err();
        assert_eq!(err.path(), "$.kind");
        assert!(matches!(err, BindError::TypeCoercion { found: "integer", .. }));
    }

    #[test]
    fn test_fallback_kind_rejects_table_literals() {
        assert!(FallbackKind::<Open>::new("light").is_none());
        assert!(FallbackKind::<Open>::new("dark").is_none());

        let kind = FallbackKind::<Open>::new("Dark").unwrap();
        assert_eq!(kind, "Dark");
        assert_eq!(kind.to_string(), "Dark");
        let closed = FallbackKind::<Closed>::new("dark").unwrap();
        assert_eq!(closed.as_str(), "dark");
    }
}

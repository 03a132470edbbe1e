//! Shape normalization: lifting shorthand scalars into canonical maps.
//!
//! Authors may write a bare scalar where a full entity map is expected,
//! e.g. `firstName: Jane` for an input or `model: gpt-4o` for a model. Each
//! entity declares one [`Shorthand`] rule; [`normalize`] applies it and
//! passes maps through untouched.

use crate::binder::BindContext;
use crate::error::{BindError, BindResult};
use crate::value::{shape_name, Map, Value};

/// Per-entity rule for lifting a scalar into a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shorthand {
    /// Only the map form is accepted.
    None,

    /// Input, Output and Parameter: the scalar becomes a sample of its own
    /// type, `{kind: "string" | "boolean" | "integer" | "float", sample: <scalar>}`.
    Typed,

    /// Format and Parser: a string names the kind, `{kind: <string>}`.
    Kind,

    /// Model: a string names the model id, `{id: <string>}`.
    Id,

    /// EnvironmentVariable: a scalar is the value, `{value: <scalar>}`.
    Value,

    /// Binding: a string names the bound input, `{input: <string>}`.
    Input,
}

fn single(key: &str, value: Value) -> Map {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    map
}

fn typed(kind: &str, sample: Value) -> Map {
    let mut map = single("kind", Value::String(kind.to_string()));
    map.insert("sample".to_string(), sample);
    map
}

/// Normalizes `node` into the canonical map form of `entity`.
///
/// Maps pass through unchanged, so normalizing an already canonical map is a
/// no-op. Booleans are recognized before numbers. A number literal with a
/// decimal point or exponent is a `float`, any other is an `integer`; the
/// sample keeps the literal's shape either way. Lists, `null`, and scalars the
/// rule does not cover fail with [`BindError::Shape`].
pub fn normalize(
    node: Value,
    rule: Shorthand,
    entity: &'static str,
    ctx: &BindContext,
) -> BindResult<Map> {
    let found = shape_name(&node);
    let lifted = match (rule, node) {
        (_, Value::Object(map)) => Some(map),
        (Shorthand::Typed, Value::Bool(b)) => Some(typed("boolean", Value::Bool(b))),
        (Shorthand::Typed, Value::Number(n)) => {
            let kind = if n.is_f64() { "float" } else { "integer" };
            Some(typed(kind, Value::Number(n)))
        }
        (Shorthand::Typed, Value::String(s)) => Some(typed("string", Value::String(s))),
        (Shorthand::Kind, Value::String(s)) => Some(single("kind", Value::String(s))),
        (Shorthand::Id, Value::String(s)) => Some(single("id", Value::String(s))),
        (Shorthand::Input, Value::String(s)) => Some(single("input", Value::String(s))),
        (Shorthand::Value, scalar @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => {
            Some(single("value", scalar))
        }
        _ => None,
    };
    lifted.ok_or_else(|| BindError::Shape {
        path: ctx.path(),
        entity,
        found,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lift(node: Value, rule: Shorthand) -> BindResult<Map> {
        normalize(node, rule, "Test", &BindContext::default())
    }

    #[test]
    fn test_string_shorthand_becomes_string_sample() {
        let map = lift(json!("Jane"), Shorthand::Typed).unwrap();
        assert_eq!(Value::Object(map), json!({"kind": "string", "sample": "Jane"}));
    }

    #[test]
    fn test_boolean_checked_before_number() {
        let map = lift(json!(false), Shorthand::Typed).unwrap();
        assert_eq!(Value::Object(map), json!({"kind": "boolean", "sample": false}));
    }

    #[test]
    fn test_number_shorthand_kind_follows_literal() {
        let cases = [
            ("3", "integer"),
            ("-7", "integer"),
            ("3.0", "float"),
            ("3.5", "float"),
            ("2e3", "float"),
            ("1E-2", "float"),
        ];
        for (text, kind) in cases {
            let literal: Value = serde_json::from_str(text).unwrap();
            let map = lift(literal, Shorthand::Typed).unwrap();
            assert_eq!(map["kind"], kind, "{text}");
            assert_eq!(map["sample"].is_f64(), kind == "float", "{text}");
        }
    }

    #[test]
    fn test_single_field_rules() {
        assert_eq!(
            Value::Object(lift(json!("mustache"), Shorthand::Kind).unwrap()),
            json!({"kind": "mustache"})
        );
        assert_eq!(
            Value::Object(lift(json!("gpt-4o"), Shorthand::Id).unwrap()),
            json!({"id": "gpt-4o"})
        );
        assert_eq!(
            Value::Object(lift(json!("my-value"), Shorthand::Value).unwrap()),
            json!({"value": "my-value"})
        );
        assert_eq!(
            Value::Object(lift(json!("question"), Shorthand::Input).unwrap()),
            json!({"input": "question"})
        );
    }

    #[test]
    fn test_canonical_map_is_unchanged() {
        let canonical = json!({"kind": "string", "sample": "Jane", "name": "firstName"});
        let Value::Object(expected) = canonical.clone() else {
            unreachable!()
        };
        for rule in [Shorthand::None, Shorthand::Typed, Shorthand::Kind, Shorthand::Id] {
            assert_eq!(lift(canonical.clone(), rule).unwrap(), expected);
        }
    }

    #[test]
    fn test_unsupported_shapes_fail() {
        let err = lift(json!(["a"]), Shorthand::Typed).unwrap_err();
        assert!(matches!(err, BindError::Shape { found: "list", .. }));

        let err = lift(json!("x"), Shorthand::None).unwrap_err();
        assert!(matches!(err, BindError::Shape { found: "string", .. }));

        let err = lift(json!(5), Shorthand::Id).unwrap_err();
        assert!(matches!(err, BindError::Shape { found: "integer", .. }));

        let err = lift(Value::Null, Shorthand::Typed).unwrap_err();
        assert_eq!(err.path(), "$");
    }
}

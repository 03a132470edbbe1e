//! The generic tree exchanged with JSON and YAML parsers.
//!
//! The tree is `serde_json::Value` compiled with `preserve_order`, so a map
//! iterates its keys in the order the source listed them. Integer and
//! floating numbers keep the shape of their literal text (`2` vs `2.0`).

pub use serde_json::Number;
pub use serde_json::Value;

/// Ordered string-keyed map; the canonical map form of every entity.
pub type Map = serde_json::Map<String, Value>;

/// Short name of a node's runtime shape, used in error messages.
pub fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

/// Converts a float into a tree number. Non-finite values have no JSON
/// representation and become `null`.
pub fn float_value(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shape_name_distinguishes_integer_and_float_literals() {
        let parsed: Value = serde_json::from_str(r#"[2, 2.0, 2e3, true, "x"]"#).unwrap();
        let names: Vec<_> = parsed.as_array().unwrap().iter().map(shape_name).collect();
        assert_eq!(names, vec!["integer", "float", "float", "boolean", "string"]);
    }

    #[test]
    fn test_float_value_keeps_floating_shape() {
        let value = float_value(2.0);
        assert!(value.as_f64().is_some());
        assert_eq!(serde_json::to_string(&value).unwrap(), "2.0");
        assert_eq!(float_value(f64::NAN), Value::Null);
        assert_eq!(shape_name(&json!({})), "map");
    }
}

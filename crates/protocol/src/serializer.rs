//! Serialization of typed entities back into canonical maps.
//!
//! Output is always the canonical form: `kind` first, then base fields, then
//! variant fields; collections as lists; absent optional fields omitted.
//! Shorthands are never emitted.

use crate::value::{float_value, Map, Value};

/// An entity with a canonical map form.
pub trait Canonical {
    /// Writes the entity as a canonical map.
    fn to_canonical(&self) -> Map;

    fn to_value(&self) -> Value {
        Value::Object(self.to_canonical())
    }
}

/// Builder for canonical maps, keeping insertion order.
#[derive(Debug, Default)]
#[must_use]
pub struct MapWriter {
    map: Map,
}

impl MapWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn put(mut self, key: &str, value: Value) -> Self {
        self.map.insert(key.to_string(), value);
        self
    }

    pub fn string(self, key: &str, value: &str) -> Self {
        self.put(key, Value::String(value.to_string()))
    }

    /// Writes `name` unless it is empty; unnamed entities carry no name key.
    pub fn name(self, value: &str) -> Self {
        if value.is_empty() {
            self
        } else {
            self.string("name", value)
        }
    }

    pub fn opt_string(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.string(key, value),
            None => self,
        }
    }

    pub fn opt_bool(self, key: &str, value: Option<bool>) -> Self {
        match value {
            Some(value) => self.put(key, Value::Bool(value)),
            None => self,
        }
    }

    pub fn opt_int(self, key: &str, value: Option<i64>) -> Self {
        match value {
            Some(value) => self.put(key, Value::from(value)),
            None => self,
        }
    }

    pub fn float(self, key: &str, value: f64) -> Self {
        self.put(key, float_value(value))
    }

    pub fn opt_float(self, key: &str, value: Option<f64>) -> Self {
        match value {
            Some(value) => self.float(key, value),
            None => self,
        }
    }

    pub fn opt_value(self, key: &str, value: Option<&Value>) -> Self {
        match value {
            Some(value) => self.put(key, value.clone()),
            None => self,
        }
    }

    pub fn opt_map(self, key: &str, value: Option<&Map>) -> Self {
        match value {
            Some(value) => self.put(key, Value::Object(value.clone())),
            None => self,
        }
    }

    /// Writes an open option bag unless it is empty.
    pub fn bag(self, key: &str, value: &Map) -> Self {
        if value.is_empty() {
            self
        } else {
            self.put(key, Value::Object(value.clone()))
        }
    }

    pub fn opt_values(self, key: &str, value: Option<&[Value]>) -> Self {
        match value {
            Some(value) => self.put(key, Value::Array(value.to_vec())),
            None => self,
        }
    }

    pub fn opt_strings(self, key: &str, value: Option<&[String]>) -> Self {
        match value {
            Some(value) => self.put(
                key,
                Value::Array(value.iter().cloned().map(Value::String).collect()),
            ),
            None => self,
        }
    }

    pub fn entity<T: Canonical>(self, key: &str, value: &T) -> Self {
        self.put(key, value.to_value())
    }

    pub fn opt_entity<T: Canonical>(self, key: &str, value: Option<&T>) -> Self {
        match value {
            Some(value) => self.entity(key, value),
            None => self,
        }
    }

    /// Writes a collection as a list, even when empty.
    pub fn list<T: Canonical>(self, key: &str, items: &[T]) -> Self {
        self.put(key, Value::Array(items.iter().map(Canonical::to_value).collect()))
    }

    pub fn opt_list<T: Canonical>(self, key: &str, items: Option<&[T]>) -> Self {
        match items {
            Some(items) => self.list(key, items),
            None => self,
        }
    }

    pub fn finish(self) -> Map {
        self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Leaf(&'static str);

    impl Canonical for Leaf {
        fn to_canonical(&self) -> Map {
            MapWriter::new().string("id", self.0).finish()
        }
    }

    #[test]
    fn test_writer_keeps_order_and_omits_absent_fields() {
        let map = MapWriter::new()
            .string("kind", "leaf")
            .name("")
            .opt_string("description", None)
            .opt_int("count", Some(3))
            .float("memory", 2.0)
            .opt_list::<Leaf>("children", None)
            .bag("options", &Map::new())
            .list("items", &[Leaf("a"), Leaf("b")])
            .finish();

        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["kind", "count", "memory", "items"]);
        assert_eq!(
            Value::Object(map),
            json!({"kind": "leaf", "count": 3, "memory": 2.0, "items": [{"id": "a"}, {"id": "b"}]})
        );
    }
}

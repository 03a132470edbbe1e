//! Type binding: copying canonical map entries into typed entities.
//!
//! Every entity implements [`Bind`]. Its `bind_map` reads fields through a
//! [`Fields`] reader, which applies primitive coercion, recurses into nested
//! entities and named collections, and reports errors with the location of
//! the offending node.

use tracing::trace;

use crate::collection::{normalize_collection, CollectionField, Named};
use crate::config_models::BindOptions;
use crate::error::{BindError, BindResult};
use crate::shape::{normalize, Shorthand};
use crate::value::{shape_name, Map, Value};

/// Per-invocation binding state: options, current path, current depth.
///
/// Nothing is shared between invocations, so independent documents can be
/// bound concurrently without locking.
#[derive(Debug, Clone, Default)]
pub struct BindContext {
    options: BindOptions,
    path: Vec<String>,
    depth: usize,
}

impl BindContext {
    /// Create a context with the given options.
    pub fn new(options: BindOptions) -> Self {
        Self {
            options,
            path: Vec::new(),
            depth: 0,
        }
    }

    /// Options this invocation runs with.
    pub fn options(&self) -> &BindOptions {
        &self.options
    }

    /// Location of the node currently being bound, e.g. `$.tools[0]`.
    pub fn path(&self) -> String {
        let mut rendered = String::from("$");
        for segment in &self.path {
            rendered.push_str(segment);
        }
        rendered
    }

    /// Runs `f` with `segment` appended to the current path.
    pub(crate) fn scoped<T>(
        &mut self,
        segment: String,
        f: impl FnOnce(&mut Self) -> BindResult<T>,
    ) -> BindResult<T> {
        self.path.push(segment);
        let result = f(self);
        self.path.pop();
        result
    }

    pub(crate) fn field_path(&self, field: &str) -> String {
        format!("{}.{field}", self.path())
    }

    fn descend(&mut self) -> BindResult<()> {
        if self.depth >= self.options.max_depth {
            return Err(BindError::DepthExceeded {
                path: self.path(),
                max_depth: self.options.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// An entity that can be bound from the generic tree.
pub trait Bind: Sized {
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    /// Scalar shorthand accepted in place of the map form.
    const SHORTHAND: Shorthand = Shorthand::None;

    /// Bind from a canonical map. Implementations read every declared field
    /// through [`Fields`].
    fn bind_map(map: Map, ctx: &mut BindContext) -> BindResult<Self>;

    /// Bind from any node, shape-normalizing it first.
    fn bind(node: Value, ctx: &mut BindContext) -> BindResult<Self> {
        let map = normalize(node, Self::SHORTHAND, Self::ENTITY, ctx)?;
        Self::bind_normalized(map, ctx)
    }

    /// Bind from an already normalized map, enforcing the depth guard.
    fn bind_normalized(map: Map, ctx: &mut BindContext) -> BindResult<Self> {
        ctx.descend()?;
        trace!(entity = Self::ENTITY, path = %ctx.path(), "binding entity");
        let result = Self::bind_map(map, ctx);
        ctx.ascend();
        result
    }
}

/// Reader over one canonical map.
///
/// Fields are consumed as they are read. Whatever is left at the end is
/// either dropped ([`Fields::finish`], closed variants) or drained into the
/// open option bag ([`Fields::rest`], fallback variants).
pub struct Fields<'a> {
    entity: &'static str,
    map: Map,
    consumed: Vec<&'static str>,
    ctx: &'a mut BindContext,
}

impl<'a> Fields<'a> {
    pub fn new(entity: &'static str, map: Map, ctx: &'a mut BindContext) -> Self {
        Self {
            entity,
            map,
            consumed: Vec::new(),
            ctx,
        }
    }

    /// Removes a field, treating `null` as absent.
    pub fn take(&mut self, key: &'static str) -> Option<Value> {
        self.consumed.push(key);
        match self.map.get_mut(key).map(Value::take) {
            None | Some(Value::Null) => None,
            present => present,
        }
    }

    fn coercion(&self, key: &str, expected: &'static str, found: &Value) -> BindError {
        BindError::TypeCoercion {
            path: self.ctx.field_path(key),
            entity: self.entity,
            field: key.to_string(),
            expected,
            found: shape_name(found),
        }
    }

    fn missing(&self, key: &str) -> BindError {
        BindError::MissingRequiredField {
            path: self.ctx.path(),
            entity: self.entity,
            field: key.to_string(),
        }
    }

    /// Optional string. Numbers and booleans are rendered as text.
    pub fn string(&mut self, key: &'static str) -> BindResult<Option<String>> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(other) => Err(self.coercion(key, "a string", &other)),
        }
    }

    pub fn required_string(&mut self, key: &'static str) -> BindResult<String> {
        self.string(key)?.ok_or_else(|| self.missing(key))
    }

    /// String with a default used when the field is absent.
    pub fn string_or(&mut self, key: &'static str, default: &str) -> BindResult<String> {
        Ok(self.string(key)?.unwrap_or_else(|| default.to_string()))
    }

    pub fn bool(&mut self, key: &'static str) -> BindResult<Option<bool>> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(b)),
            Some(other) => Err(self.coercion(key, "a boolean", &other)),
        }
    }

    /// Optional integer. Floating literals are rejected rather than truncated.
    pub fn int(&mut self, key: &'static str) -> BindResult<Option<i64>> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::Number(n)) if n.is_i64() => Ok(n.as_i64()),
            Some(other) => Err(self.coercion(key, "an integer", &other)),
        }
    }

    /// Optional float. Integer literals widen, since the declared type decides.
    pub fn float(&mut self, key: &'static str) -> BindResult<Option<f64>> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(f) => Ok(Some(f)),
                None => Err(self.coercion(key, "a float", &Value::Number(n))),
            },
            Some(other) => Err(self.coercion(key, "a float", &other)),
        }
    }

    pub fn required_float(&mut self, key: &'static str) -> BindResult<f64> {
        self.float(key)?.ok_or_else(|| self.missing(key))
    }

    /// Free-form value, kept exactly as parsed.
    pub fn value(&mut self, key: &'static str) -> Option<Value> {
        self.take(key)
    }

    pub fn map(&mut self, key: &'static str) -> BindResult<Option<Map>> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(self.coercion(key, "a map", &other)),
        }
    }

    /// Optional list of free-form values.
    pub fn values(&mut self, key: &'static str) -> BindResult<Option<Vec<Value>>> {
        match self.take(key) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(other) => Err(self.coercion(key, "a list", &other)),
        }
    }

    /// Optional list of strings.
    pub fn strings(&mut self, key: &'static str) -> BindResult<Option<Vec<String>>> {
        let Some(items) = self.values(key)? else {
            return Ok(None);
        };
        items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(self.coercion(key, "a list of strings", &other)),
            })
            .collect::<BindResult<Vec<_>>>()
            .map(Some)
    }

    /// Optional nested entity.
    pub fn entity<T: Bind>(&mut self, key: &'static str) -> BindResult<Option<T>> {
        match self.take(key) {
            None => Ok(None),
            Some(node) => self
                .ctx
                .scoped(format!(".{key}"), |ctx| T::bind(node, ctx))
                .map(Some),
        }
    }

    pub fn required_entity<T: Bind>(&mut self, key: &'static str) -> BindResult<T> {
        self.entity(key)?.ok_or_else(|| self.missing(key))
    }

    /// Optional plain list of entities; each element is shape-normalized.
    pub fn list<T: Bind>(&mut self, key: &'static str) -> BindResult<Option<Vec<T>>> {
        let Some(items) = self.values(key)? else {
            return Ok(None);
        };
        self.ctx
            .scoped(format!(".{key}"), |ctx| {
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| ctx.scoped(format!("[{index}]"), |ctx| T::bind(item, ctx)))
                    .collect::<BindResult<Vec<_>>>()
            })
            .map(Some)
    }

    /// Optional named collection, accepted in list or map form.
    pub fn collection<T: Bind + Named>(&mut self, key: &'static str) -> BindResult<Option<Vec<T>>> {
        let Some(node) = self.take(key) else {
            return Ok(None);
        };
        let field = CollectionField {
            owner: self.entity,
            field: key,
            element: T::ENTITY,
            shorthand: T::SHORTHAND,
        };
        let entries = self.ctx.scoped(format!(".{key}"), |ctx| {
            normalize_collection(node, field, ctx, T::bind_normalized)
        })?;
        Ok(Some(entries.into_iter().map(|(_, entity)| entity).collect()))
    }

    /// Drains the unread fields in source order. Fallback variants keep them
    /// as their open option bag.
    pub fn rest(&mut self) -> Map {
        let map = std::mem::take(&mut self.map);
        let consumed = &self.consumed;
        map.into_iter()
            .filter(|(key, _)| !consumed.iter().any(|seen| *seen == key.as_str()))
            .collect()
    }

    /// Ends a closed variant; unread fields are dropped.
    pub fn finish(mut self) {
        let dropped = self.rest();
        if !dropped.is_empty() {
            let keys: Vec<&str> = dropped.keys().map(String::as_str).collect();
            trace!(entity = self.entity, path = %self.ctx.path(), ?keys, "ignoring unrecognized fields");
        }
    }
}

/// Merges an explicit `options` map with unread fields into one open bag.
///
/// Entries of the explicit map win. An empty bag is written as no `options`
/// key at all, see [`MapWriter::bag`](crate::serializer::MapWriter::bag).
pub fn open_bag(explicit: Option<Map>, rest: Map) -> Map {
    let mut bag = explicit.unwrap_or_default();
    for (key, value) in rest {
        bag.entry(key).or_insert(value);
    }
    bag
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a map"),
        }
    }

    #[test]
    fn test_primitive_coercion() {
        let mut ctx = BindContext::default();
        let mut fields = Fields::new(
            "Sample",
            object(json!({"s": 1.5, "b": true, "i": 7, "f": 2, "n": null})),
            &mut ctx,
        );
        assert_eq!(fields.string("s").unwrap(), Some("1.5".to_string()));
        assert_eq!(fields.bool("b").unwrap(), Some(true));
        assert_eq!(fields.int("i").unwrap(), Some(7));
        assert_eq!(fields.float("f").unwrap(), Some(2.0));
        assert_eq!(fields.string("n").unwrap(), None);
        assert_eq!(fields.string("absent").unwrap(), None);
    }

    #[test]
    fn test_int_rejects_float_literal() {
        let mut ctx = BindContext::default();
        let mut fields = Fields::new("Sample", object(json!({"count": 2.5})), &mut ctx);
        let err = fields.int("count").unwrap_err();
        assert_eq!(
            err,
            BindError::TypeCoercion {
                path: "$.count".to_string(),
                entity: "Sample",
                field: "count".to_string(),
                expected: "an integer",
                found: "float",
            }
        );
    }

    #[test]
    fn test_required_field_missing() {
        let mut ctx = BindContext::default();
        let mut fields = Fields::new("Sample", object(json!({"other": 1})), &mut ctx);
        let err = fields.required_string("id").unwrap_err();
        assert!(matches!(
            err,
            BindError::MissingRequiredField { ref field, entity: "Sample", .. } if field == "id"
        ));
    }

    #[test]
    fn test_rest_keeps_source_order_of_unread_fields() {
        let mut ctx = BindContext::default();
        let mut fields = Fields::new(
            "Sample",
            object(json!({"z": 1, "kind": "x", "a": 2, "m": 3})),
            &mut ctx,
        );
        fields.take("kind");
        let rest = fields.rest();
        let keys: Vec<&str> = rest.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_open_bag_merges_explicit_first() {
        assert!(open_bag(None, Map::new()).is_empty());
        assert!(open_bag(Some(Map::new()), Map::new()).is_empty());
        let bag = open_bag(
            Some(object(json!({"timeout": 30}))),
            object(json!({"timeout": 5, "retries": 3})),
        );
        assert_eq!(Value::Object(bag), json!({"timeout": 30, "retries": 3}));
    }

    #[test]
    fn test_scoped_paths() {
        let mut ctx = BindContext::default();
        let path = ctx
            .scoped(".tools".to_string(), |ctx| {
                ctx.scoped("[0]".to_string(), |ctx| Ok(ctx.path()))
            })
            .unwrap();
        assert_eq!(path, "$.tools[0]");
        assert_eq!(ctx.path(), "$");
    }
}

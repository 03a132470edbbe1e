//! Named collections in list form or map form.
//!
//! Fields such as `inputs`, `tools` or `environmentVariables` hold entities
//! identified by `name`. Authors may write them either way:
//!
//! ```yaml
//! inputs:              # map form; the key is the name
//!   firstName: Jane
//! inputs:              # list form
//!   - name: firstName
//!     kind: string
//! ```
//!
//! Both bind to the same ordered sequence.

use crate::binder::BindContext;
use crate::config_models::NamePolicy;
use crate::error::{BindError, BindResult};
use crate::shape::{normalize, Shorthand};
use crate::value::{shape_name, Map, Value};

/// An entity identified by a `name` within a collection.
pub trait Named {
    fn name(&self) -> &str;
}

/// Describes the collection field being normalized.
#[derive(Debug, Clone, Copy)]
pub struct CollectionField {
    /// Entity that declares the field, for error messages.
    pub owner: &'static str,

    /// Field name as written in the source.
    pub field: &'static str,

    /// Entity name of each element.
    pub element: &'static str,

    /// Shorthand rule applied to map-form values.
    pub shorthand: Shorthand,
}

/// Normalizes a collection node and binds each element with `bind`.
///
/// Returns `(name, element)` pairs in source order. List elements use their
/// own `name`, defaulting to empty. Map entries take the key as the name,
/// injected first when the entry has no `name` of its own; a disagreeing
/// explicit name is resolved by [`NamePolicy`].
pub fn normalize_collection<T, F>(
    node: Value,
    field: CollectionField,
    ctx: &mut BindContext,
    mut bind: F,
) -> BindResult<Vec<(String, T)>>
where
    T: Named,
    F: FnMut(Map, &mut BindContext) -> BindResult<T>,
{
    match node {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                ctx.scoped(format!("[{index}]"), |ctx| {
                    let map = normalize(item, field.shorthand, field.element, ctx)?;
                    let entity = bind(map, ctx)?;
                    Ok((entity.name().to_string(), entity))
                })
            })
            .collect(),
        Value::Object(entries) => entries
            .into_iter()
            .map(|(key, item)| {
                ctx.scoped(format!(".{key}"), |ctx| {
                    let map = normalize(item, field.shorthand, field.element, ctx)?;
                    let map = inject_name(&key, map, ctx)?;
                    let entity = bind(map, ctx)?;
                    Ok((entity.name().to_string(), entity))
                })
            })
            .collect(),
        other => Err(BindError::CollectionShape {
            path: ctx.path(),
            entity: field.owner,
            field: field.field.to_string(),
            found: shape_name(&other),
        }),
    }
}

fn inject_name(key: &str, map: Map, ctx: &BindContext) -> BindResult<Map> {
    let explicit = match map.get("name") {
        None | Some(Value::Null) => None,
        Some(Value::String(name)) => Some(name.clone()),
        Some(other) => Some(other.to_string()),
    };

    match explicit {
        None => {
            let mut named = Map::with_capacity(map.len() + 1);
            named.insert("name".to_string(), Value::String(key.to_string()));
            for (field, value) in map {
                if field != "name" {
                    named.insert(field, value);
                }
            }
            Ok(named)
        }
        Some(name) if name == key => Ok(map),
        Some(name) => match ctx.options().name_policy {
            NamePolicy::PreferExplicit => Ok(map),
            NamePolicy::PreferKey => {
                let mut map = map;
                map.insert("name".to_string(), Value::String(key.to_string()));
                Ok(map)
            }
            NamePolicy::Strict => Err(BindError::NameConflict {
                path: ctx.path(),
                key: key.to_string(),
                name,
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_models::BindOptions;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Entry {
        name: String,
        fields: Map,
    }

    impl Named for Entry {
        fn name(&self) -> &str {
            &self.name
        }
    }

    fn bind_entry(map: Map, _ctx: &mut BindContext) -> BindResult<Entry> {
        let name = map.get("name").and_then(Value::as_str).unwrap_or_default().to_string();
        Ok(Entry { name, fields: map })
    }

    const FIELD: CollectionField = CollectionField {
        owner: "Owner",
        field: "inputs",
        element: "Entry",
        shorthand: Shorthand::Typed,
    };

    fn names(entries: &[(String, Entry)]) -> Vec<&str> {
        entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    #[test]
    fn test_map_form_injects_key_as_name_first() {
        let mut ctx = BindContext::default();
        let entries = normalize_collection(
            json!({"firstName": "Jane", "age": {"kind": "number"}}),
            FIELD,
            &mut ctx,
            bind_entry,
        )
        .unwrap();

        assert_eq!(names(&entries), vec!["firstName", "age"]);
        let first_keys: Vec<&str> = entries[0].1.fields.keys().map(String::as_str).collect();
        assert_eq!(first_keys, vec!["name", "kind", "sample"]);
    }

    #[test]
    fn test_list_form_uses_element_names() {
        let mut ctx = BindContext::default();
        let entries = normalize_collection(
            json!([{"name": "b", "kind": "string"}, {"kind": "string"}]),
            FIELD,
            &mut ctx,
            bind_entry,
        )
        .unwrap();
        assert_eq!(names(&entries), vec!["b", ""]);
    }

    #[test]
    fn test_empty_collections() {
        let mut ctx = BindContext::default();
        assert!(normalize_collection(json!([]), FIELD, &mut ctx, bind_entry).unwrap().is_empty());
        assert!(normalize_collection(json!({}), FIELD, &mut ctx, bind_entry).unwrap().is_empty());
    }

    #[test]
    fn test_scalar_collection_is_rejected() {
        let mut ctx = BindContext::default();
        let err = normalize_collection(json!("nope"), FIELD, &mut ctx, bind_entry).unwrap_err();
        assert!(matches!(
            err,
            BindError::CollectionShape { entity: "Owner", found: "string", .. }
        ));
    }

    #[test]
    fn test_name_policies() {
        let node = json!({"key": {"name": "explicit", "kind": "string"}});

        let mut ctx = BindContext::default();
        let entries = normalize_collection(node.clone(), FIELD, &mut ctx, bind_entry).unwrap();
        assert_eq!(names(&entries), vec!["explicit"]);

        let mut ctx = BindContext::new(BindOptions {
            name_policy: NamePolicy::PreferKey,
            ..BindOptions::default()
        });
        let entries = normalize_collection(node.clone(), FIELD, &mut ctx, bind_entry).unwrap();
        assert_eq!(names(&entries), vec!["key"]);

        let mut ctx = BindContext::new(BindOptions {
            name_policy: NamePolicy::Strict,
            ..BindOptions::default()
        });
        let err = normalize_collection(node, FIELD, &mut ctx, bind_entry).unwrap_err();
        assert_eq!(
            err,
            BindError::NameConflict {
                path: "$.key".to_string(),
                key: "key".to_string(),
                name: "explicit".to_string(),
            }
        );
    }

    #[test]
    fn test_element_errors_carry_their_position() {
        let mut ctx = BindContext::default();
        let err = normalize_collection(json!([{"kind": "x"}, ["bad"]]), FIELD, &mut ctx, bind_entry)
            .unwrap_err();
        assert_eq!(err.path(), "$[1]");
    }
}

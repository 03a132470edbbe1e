//! Input, Output and Parameter: the property schema families.
//!
//! All three share one variant structure. A property is `array` (with an
//! `items` schema), `object` (with nested `properties`), or plain, where
//! plain covers every other kind literal such as `string` or `integer`.
//! Each accepts a bare scalar as shorthand for a typed sample:
//!
//! ```yaml
//! inputs:
//!   firstName: Jane        # {kind: string, sample: Jane}
//!   age: 42                # {kind: integer, sample: 42}
//!   ratio: 0.5             # {kind: float, sample: 0.5}
//!   tags:
//!     kind: array
//!     items: {kind: string}
//! ```

use std::marker::PhantomData;

use crate::binder::{Bind, BindContext, Fields};
use crate::collection::Named;
use crate::discriminator::{resolve, FallbackKind, Family, DISCRIMINATOR};
use crate::error::BindResult;
use crate::serializer::{Canonical, MapWriter};
use crate::shape::Shorthand;
use crate::value::{Map, Value};

/// Variant tag shared by the three property families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyTag {
    Plain,
    Array,
    Object,
}

/// Dispatch table for a property family with element type `T`.
pub struct PropertyFamily<T>(PhantomData<T>);

impl<T: Bind> Family for PropertyFamily<T> {
    type Tag = PropertyTag;
    const ENTITY: &'static str = T::ENTITY;
    const TABLE: &'static [(&'static str, PropertyTag)] =
        &[("array", PropertyTag::Array), ("object", PropertyTag::Object)];
    const FALLBACK: Option<PropertyTag> = Some(PropertyTag::Plain);
}

/// The variant part of a property, generic over its element type.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind<T> {
    /// Any kind other than `array` or `object`; holds the kind literal.
    Plain(FallbackKind<PropertyFamily<T>>),

    /// `kind: array`; `items` describes each element.
    Array { items: Box<T> },

    /// `kind: object`; `properties` describes each member.
    Object { properties: Vec<T> },
}

impl<T: Bind> PropertyKind<T> {
    /// A plain kind, or `None` for `array` and `object`, which need their
    /// nested schema.
    pub fn plain(kind: impl Into<String>) -> Option<Self> {
        FallbackKind::new(kind).map(Self::Plain)
    }
}

impl<T> PropertyKind<T> {
    /// The `kind` literal this variant serializes with.
    pub fn literal(&self) -> &str {
        match self {
            Self::Plain(kind) => kind.as_str(),
            Self::Array { .. } => "array",
            Self::Object { .. } => "object",
        }
    }
}

impl<T: Bind + Named + Canonical> PropertyKind<T> {
    fn read(tag: PropertyTag, literal: String, fields: &mut Fields<'_>) -> BindResult<Self> {
        Ok(match tag {
            PropertyTag::Plain => Self::Plain(FallbackKind::resolved(literal)),
            PropertyTag::Array => Self::Array {
                items: Box::new(fields.required_entity("items")?),
            },
            PropertyTag::Object => Self::Object {
                properties: fields.collection("properties")?.unwrap_or_default(),
            },
        })
    }

    fn write(&self, writer: MapWriter) -> MapWriter {
        match self {
            Self::Plain(_) => writer,
            Self::Array { items } => writer.entity("items", items.as_ref()),
            Self::Object { properties } => writer.list("properties", properties),
        }
    }
}

/// A value the caller supplies when executing a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    /// Input name. Empty when unnamed, and then not written.
    pub name: String,

    /// Schema variant; the `kind` literal lives here.
    pub kind: PropertyKind<Input>,

    /// Human-readable description of the input.
    pub description: Option<String>,

    /// Whether the caller must supply a value.
    pub required: Option<bool>,

    /// Whether values must match the schema exactly.
    pub strict: Option<bool>,

    /// Value used when the caller supplies none.
    pub default: Option<Value>,

    /// Example value, used when testing the document.
    pub sample: Option<Value>,
}

pub type InputKind = PropertyKind<Input>;

impl Input {
    /// A plain input of the given kind with every optional field absent.
    ///
    /// Returns `None` for `array` and `object`; build those through
    /// [`PropertyKind::Array`] and [`PropertyKind::Object`].
    pub fn plain(name: impl Into<String>, kind: impl Into<String>) -> Option<Self> {
        Some(Self {
            name: name.into(),
            kind: PropertyKind::plain(kind)?,
            description: None,
            required: None,
            strict: None,
            default: None,
            sample: None,
        })
    }
}

impl Bind for Input {
    const ENTITY: &'static str = "Input";
    const SHORTHAND: Shorthand = Shorthand::Typed;

    fn bind_map(map: Map, ctx: &mut BindContext) -> BindResult<Self> {
        let tag = resolve::<PropertyFamily<Self>>(&map, ctx)?;
        let mut fields = Fields::new(Self::ENTITY, map, ctx);
        let literal = fields.required_string(DISCRIMINATOR)?;
        let input = Self {
            name: fields.string_or("name", "")?,
            description: fields.string("description")?,
            required: fields.bool("required")?,
            strict: fields.bool("strict")?,
            default: fields.value("default"),
            sample: fields.value("sample"),
            kind: PropertyKind::read(tag, literal, &mut fields)?,
        };
        fields.finish();
        Ok(input)
    }
}

impl Canonical for Input {
    fn to_canonical(&self) -> Map {
        let writer = MapWriter::new()
            .string(DISCRIMINATOR, self.kind.literal())
            .name(&self.name)
            .opt_string("description", self.description.as_deref())
            .opt_bool("required", self.required)
            .opt_bool("strict", self.strict)
            .opt_value("default", self.default.as_ref())
            .opt_value("sample", self.sample.as_ref());
        self.kind.write(writer).finish()
    }
}

impl Named for Input {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A value a document produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    /// Output name. Empty when unnamed, and then not written.
    pub name: String,

    /// Schema variant; the `kind` literal lives here.
    pub kind: PropertyKind<Output>,

    /// Human-readable description of the output.
    pub description: Option<String>,

    /// Whether the document always produces this value.
    pub required: Option<bool>,
}

pub type OutputKind = PropertyKind<Output>;

impl Bind for Output {
    const ENTITY: &'static str = "Output";
    const SHORTHAND: Shorthand = Shorthand::Typed;

    fn bind_map(map: Map, ctx: &mut BindContext) -> BindResult<Self> {
        let tag = resolve::<PropertyFamily<Self>>(&map, ctx)?;
        let mut fields = Fields::new(Self::ENTITY, map, ctx);
        let literal = fields.required_string(DISCRIMINATOR)?;
        let output = Self {
            name: fields.string_or("name", "")?,
            description: fields.string("description")?,
            required: fields.bool("required")?,
            kind: PropertyKind::read(tag, literal, &mut fields)?,
        };
        fields.finish();
        Ok(output)
    }
}

impl Canonical for Output {
    fn to_canonical(&self) -> Map {
        let writer = MapWriter::new()
            .string(DISCRIMINATOR, self.kind.literal())
            .name(&self.name)
            .opt_string("description", self.description.as_deref())
            .opt_bool("required", self.required);
        self.kind.write(writer).finish()
    }
}

impl Named for Output {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A tool parameter, or a tunable parameter in a manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter name. Empty when unnamed, and then not written.
    pub name: String,

    /// Schema variant; the `kind` literal lives here.
    pub kind: PropertyKind<Parameter>,

    /// Human-readable description of the parameter.
    pub description: Option<String>,

    /// Whether a value must be supplied.
    pub required: Option<bool>,

    /// Value used when none is supplied.
    pub default: Option<Value>,

    /// Fixed value, when the parameter is pinned.
    pub value: Option<Value>,

    /// Allowed values, when restricted.
    pub enumeration: Option<Vec<Value>>,
}

pub type ParameterKind = PropertyKind<Parameter>;

impl Bind for Parameter {
    const ENTITY: &'static str = "Parameter";
    const SHORTHAND: Shorthand = Shorthand::Typed;

    fn bind_map(map: Map, ctx: &mut BindContext) -> BindResult<Self> {
        let tag = resolve::<PropertyFamily<Self>>(&map, ctx)?;
        let mut fields = Fields::new(Self::ENTITY, map, ctx);
        let literal = fields.required_string(DISCRIMINATOR)?;
        let parameter = Self {
            name: fields.string_or("name", "")?,
            description: fields.string("description")?,
            required: fields.bool("required")?,
            default: fields.value("default"),
            value: fields.value("value"),
            enumeration: fields.values("enum")?,
            kind: PropertyKind::read(tag, literal, &mut fields)?,
        };
        fields.finish();
        Ok(parameter)
    }
}

impl Canonical for Parameter {
    fn to_canonical(&self) -> Map {
        let writer = MapWriter::new()
            .string(DISCRIMINATOR, self.kind.literal())
            .name(&self.name)
            .opt_string("description", self.description.as_deref())
            .opt_bool("required", self.required)
            .opt_value("default", self.default.as_ref())
            .opt_value("value", self.value.as_ref())
            .opt_values("enum", self.enumeration.as_deref());
        self.kind.write(writer).finish()
    }
}

impl Named for Parameter {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BindError;
    use serde_json::json;

    fn bind<T: Bind>(node: Value) -> BindResult<T> {
        T::bind(node, &mut BindContext::default())
    }

    #[test]
    fn test_bare_string_input() {
        let input: Input = bind(json!("Jane")).unwrap();
        assert_eq!(input.kind, PropertyKind::plain("string").unwrap());
        assert_eq!(input.sample, Some(json!("Jane")));
        assert_eq!(input.to_value(), json!({"kind": "string", "sample": "Jane"}));
    }

    #[test]
    fn test_numeric_shorthand_kinds() {
        let age: Input = bind(json!(3)).unwrap();
        let ratio: Input = bind(json!(3.5)).unwrap();
        assert_eq!(age.to_value(), json!({"kind": "integer", "sample": 3}));
        assert_eq!(ratio.to_value(), json!({"kind": "float", "sample": 3.5}));

        let threshold: Parameter = bind(json!(0.25)).unwrap();
        assert_eq!(threshold.kind.literal(), "float");
    }

    #[test]
    fn test_unlisted_kinds_bind_as_plain() {
        for kind in ["string", "number", "boolean", "thread", "Array"] {
            let input: Input = bind(json!({"kind": kind})).unwrap();
            assert_eq!(input.kind.literal(), kind);
            assert!(matches!(input.kind, PropertyKind::Plain(_)));
        }
    }

    #[test]
    fn test_array_input_requires_items() {
        let input: Input = bind(json!({"kind": "array", "items": {"kind": "string"}})).unwrap();
        let PropertyKind::Array { items } = &input.kind else {
            panic!("expected array input");
        };
        assert_eq!(items.kind.literal(), "string");

        let err = bind::<Input>(json!({"kind": "array"})).unwrap_err();
        assert!(matches!(
            err,
            BindError::MissingRequiredField { entity: "Input", ref field, .. } if field == "items"
        ));
    }

    #[test]
    fn test_object_output_properties_in_map_form() {
        let output: Output = bind(json!({
            "kind": "object",
            "properties": {
                "city": {"kind": "string", "description": "City name"},
                "temperature": {"kind": "number"}
            }
        }))
        .unwrap();

        let PropertyKind::Object { properties } = &output.kind else {
            panic!("expected object output");
        };
        let names: Vec<&str> = properties.iter().map(Named::name).collect();
        assert_eq!(names, vec!["city", "temperature"]);

        assert_eq!(
            output.to_value(),
            json!({
                "kind": "object",
                "properties": [
                    {"kind": "string", "name": "city", "description": "City name"},
                    {"kind": "number", "name": "temperature"}
                ]
            })
        );
    }

    #[test]
    fn test_object_without_properties_serializes_empty_list() {
        let parameter: Parameter = bind(json!({"kind": "object"})).unwrap();
        assert_eq!(parameter.to_value(), json!({"kind": "object", "properties": []}));
    }

    #[test]
    fn test_parameter_enum_and_value() {
        let parameter: Parameter = bind(json!({
            "name": "unit",
            "kind": "string",
            "enum": ["celsius", "fahrenheit"],
            "default": "celsius"
        }))
        .unwrap();
        assert_eq!(parameter.enumeration, Some(vec![json!("celsius"), json!("fahrenheit")]));
        assert_eq!(
            parameter.to_value(),
            json!({"kind": "string", "name": "unit", "default": "celsius", "enum": ["celsius", "fahrenheit"]})
        );
    }

    #[test]
    fn test_explicit_false_is_kept() {
        let input: Input = bind(json!({"kind": "boolean", "required": false, "sample": false})).unwrap();
        assert_eq!(input.required, Some(false));
        assert_eq!(
            input.to_value(),
            json!({"kind": "boolean", "required": false, "sample": false})
        );
    }

    #[test]
    fn test_plain_kind_cannot_hold_array_or_object() {
        assert!(Input::plain("tags", "array").is_none());
        assert!(PropertyKind::<Output>::plain("object").is_none());

        let input = Input::plain("tags", "Array").unwrap();
        assert_eq!(input.to_value(), json!({"kind": "Array", "name": "tags"}));
        assert_eq!(bind::<Input>(input.to_value()).unwrap(), input);

        let tags = Input {
            kind: PropertyKind::Array {
                items: Box::new(Input::plain("", "string").unwrap()),
            },
            ..Input::plain("tags", "string").unwrap()
        };
        assert_eq!(bind::<Input>(tags.to_value()).unwrap(), tags);
    }

    #[test]
    fn test_empty_name_is_omitted_and_rebinds_empty() {
        let unnamed = Output {
            name: String::new(),
            kind: PropertyKind::plain("string").unwrap(),
            description: None,
            required: Some(false),
        };
        assert_eq!(unnamed.to_value(), json!({"kind": "string", "required": false}));
        assert_eq!(bind::<Output>(unnamed.to_value()).unwrap(), unnamed);
    }

    #[test]
    fn test_nested_errors_carry_path() {
        let err = bind::<Input>(json!({
            "kind": "object",
            "properties": {"address": {"kind": "array", "items": {"kind": 1}}}
        }))
        .unwrap_err();
        assert_eq!(err.path(), "$.properties.address.items.kind");
    }
}

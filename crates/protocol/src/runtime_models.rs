//! Model selection and template configuration.

use crate::binder::{Bind, BindContext, Fields};
use crate::connection_models::Connection;
use crate::error::BindResult;
use crate::serializer::{Canonical, MapWriter};
use crate::shape::Shorthand;
use crate::value::Map;

/// The model a document runs against. `model: gpt-4o` is shorthand for
/// `model: {id: gpt-4o}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Model or deployment id, such as `gpt-4o`.
    pub id: String,

    /// Hosting provider, such as `azure` or `openai`.
    pub provider: Option<String>,

    /// API surface the model is called through, such as `chat`.
    pub api_type: Option<String>,

    /// How the model endpoint is reached.
    pub connection: Option<Connection>,

    /// Sampling and tool-calling options.
    pub options: Option<ModelOptions>,
}

impl Model {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            provider: None,
            api_type: None,
            connection: None,
            options: None,
        }
    }
}

impl Bind for Model {
    const ENTITY: &'static str = "Model";
    const SHORTHAND: Shorthand = Shorthand::Id;

    fn bind_map(map: Map, ctx: &mut BindContext) -> BindResult<Self> {
        let mut fields = Fields::new(Self::ENTITY, map, ctx);
        let model = Self {
            id: fields.required_string("id")?,
            provider: fields.string("provider")?,
            api_type: fields.string("apiType")?,
            connection: fields.entity("connection")?,
            options: fields.entity("options")?,
        };
        fields.finish();
        Ok(model)
    }
}

impl Canonical for Model {
    fn to_canonical(&self) -> Map {
        MapWriter::new()
            .string("id", &self.id)
            .opt_string("provider", self.provider.as_deref())
            .opt_string("apiType", self.api_type.as_deref())
            .opt_entity("connection", self.connection.as_ref())
            .opt_entity("options", self.options.as_ref())
            .finish()
    }
}

/// Sampling and generation settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelOptions {
    /// Penalty on tokens by how often they already appear.
    pub frequency_penalty: Option<f64>,

    /// Upper bound on generated tokens.
    pub max_output_tokens: Option<i64>,

    /// Penalty on tokens that already appear at all.
    pub presence_penalty: Option<f64>,

    /// Sampling seed, for repeatable output.
    pub seed: Option<i64>,

    /// Sampling temperature.
    pub temperature: Option<f64>,

    /// Sample only from the `top_k` most likely tokens.
    pub top_k: Option<i64>,

    /// Nucleus sampling probability mass.
    pub top_p: Option<f64>,

    /// Sequences that end generation.
    pub stop_sequences: Option<Vec<String>>,

    /// Whether one response may call several tools.
    pub allow_multiple_tool_calls: Option<bool>,

    /// Provider-specific settings passed through untouched.
    pub additional_properties: Option<Map>,
}

impl Bind for ModelOptions {
    const ENTITY: &'static str = "ModelOptions";

    fn bind_map(map: Map, ctx: &mut BindContext) -> BindResult<Self> {
        let mut fields = Fields::new(Self::ENTITY, map, ctx);
        let options = Self {
            frequency_penalty: fields.float("frequencyPenalty")?,
            max_output_tokens: fields.int("maxOutputTokens")?,
            presence_penalty: fields.float("presencePenalty")?,
            seed: fields.int("seed")?,
            temperature: fields.float("temperature")?,
            top_k: fields.int("topK")?,
            top_p: fields.float("topP")?,
            stop_sequences: fields.strings("stopSequences")?,
            allow_multiple_tool_calls: fields.bool("allowMultipleToolCalls")?,
            additional_properties: fields.map("additionalProperties")?,
        };
        fields.finish();
        Ok(options)
    }
}

impl Canonical for ModelOptions {
    fn to_canonical(&self) -> Map {
        MapWriter::new()
            .opt_float("frequencyPenalty", self.frequency_penalty)
            .opt_int("maxOutputTokens", self.max_output_tokens)
            .opt_float("presencePenalty", self.presence_penalty)
            .opt_int("seed", self.seed)
            .opt_float("temperature", self.temperature)
            .opt_int("topK", self.top_k)
            .opt_float("topP", self.top_p)
            .opt_strings("stopSequences", self.stop_sequences.as_deref())
            .opt_bool("allowMultipleToolCalls", self.allow_multiple_tool_calls)
            .opt_map("additionalProperties", self.additional_properties.as_ref())
            .finish()
    }
}

/// Template format and parser selection. Rendering happens elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// Template language of `instructions`.
    pub format: Format,

    /// How rendered text is split into messages.
    pub parser: Parser,
}

impl Bind for Template {
    const ENTITY: &'static str = "Template";

    fn bind_map(map: Map, ctx: &mut BindContext) -> BindResult<Self> {
        let mut fields = Fields::new(Self::ENTITY, map, ctx);
        let template = Self {
            format: fields.required_entity("format")?,
            parser: fields.required_entity("parser")?,
        };
        fields.finish();
        Ok(template)
    }
}

impl Canonical for Template {
    fn to_canonical(&self) -> Map {
        MapWriter::new()
            .entity("format", &self.format)
            .entity("parser", &self.parser)
            .finish()
    }
}

/// Template engine, e.g. `mustache` or `jinja2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Format {
    /// Template engine name, such as `mustache` or `jinja2`.
    pub kind: String,

    /// Whether undefined variables are an error.
    pub strict: Option<bool>,

    /// Engine-specific settings.
    pub options: Option<Map>,
}

impl Bind for Format {
    const ENTITY: &'static str = "Format";
    const SHORTHAND: Shorthand = Shorthand::Kind;

    fn bind_map(map: Map, ctx: &mut BindContext) -> BindResult<Self> {
        let mut fields = Fields::new(Self::ENTITY, map, ctx);
        let format = Self {
            kind: fields.required_string("kind")?,
            strict: fields.bool("strict")?,
            options: fields.map("options")?,
        };
        fields.finish();
        Ok(format)
    }
}

impl Canonical for Format {
    fn to_canonical(&self) -> Map {
        MapWriter::new()
            .string("kind", &self.kind)
            .opt_bool("strict", self.strict)
            .opt_map("options", self.options.as_ref())
            .finish()
    }
}

/// Parser turning rendered text into messages, e.g. `prompty`.
#[derive(Debug, Clone, PartialEq)]
pub struct Parser {
    /// Parser name, such as `prompty`.
    pub kind: String,

    /// Parser-specific settings.
    pub options: Option<Map>,
}

impl Bind for Parser {
    const ENTITY: &'static str = "Parser";
    const SHORTHAND: Shorthand = Shorthand::Kind;

    fn bind_map(map: Map, ctx: &mut BindContext) -> BindResult<Self> {
        let mut fields = Fields::new(Self::ENTITY, map, ctx);
        let parser = Self {
            kind: fields.required_string("kind")?,
            options: fields.map("options")?,
        };
        fields.finish();
        Ok(parser)
    }
}

impl Canonical for Parser {
    fn to_canonical(&self) -> Map {
        MapWriter::new()
            .string("kind", &self.kind)
            .opt_map("options", self.options.as_ref())
            .finish()
    }
}

//! Tools a document can call.
//!
//! Tool kinds outside the dispatch table bind to [`ServerTool`], which keeps
//! unrecognized fields as free-form options so newer provider tools survive
//! a read and write unchanged.

use crate::binder::{open_bag, Bind, BindContext, Fields};
use crate::collection::Named;
use crate::connection_models::Connection;
use crate::discriminator::{resolve, FallbackKind, Family, DISCRIMINATOR};
use crate::error::BindResult;
use crate::io_models::Parameter;
use crate::runtime_models::Model;
use crate::serializer::{Canonical, MapWriter};
use crate::shape::Shorthand;
use crate::value::Map;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolTag {
    Function,
    BingSearch,
    FileSearch,
    Mcp,
    Model,
    OpenApi,
    CodeInterpreter,
    Server,
}

/// Dispatch table of the tool family.
pub struct ToolFamily;

impl Family for ToolFamily {
    type Tag = ToolTag;
    const ENTITY: &'static str = "Tool";
    const TABLE: &'static [(&'static str, ToolTag)] = &[
        ("function", ToolTag::Function),
        ("bing_search", ToolTag::BingSearch),
        ("file_search", ToolTag::FileSearch),
        ("mcp", ToolTag::Mcp),
        ("model", ToolTag::Model),
        ("openapi", ToolTag::OpenApi),
        ("code_interpreter", ToolTag::CodeInterpreter),
    ];
    const FALLBACK: Option<ToolTag> = Some(ToolTag::Server);
}

/// A tool: shared fields plus the kind-specific variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Tool {
    /// Tool name the model calls. Empty when unnamed, and then not written.
    pub name: String,

    /// The tool variant, selected by `kind`.
    pub kind: ToolKind,

    /// Description shown to the model.
    pub description: Option<String>,

    /// Tool arguments bound to document inputs.
    pub bindings: Option<Vec<Binding>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolKind {
    Function(FunctionTool),
    BingSearch(BingSearchTool),
    FileSearch(FileSearchTool),
    Mcp(McpTool),
    Model(ModelTool),
    OpenApi(OpenApiTool),
    CodeInterpreter(CodeInterpreterTool),
    Server(ServerTool),
}

impl ToolKind {
    pub fn literal(&self) -> &str {
        match self {
            Self::Function(_) => "function",
            Self::BingSearch(_) => "bing_search",
            Self::FileSearch(_) => "file_search",
            Self::Mcp(_) => "mcp",
            Self::Model(_) => "model",
            Self::OpenApi(_) => "openapi",
            Self::CodeInterpreter(_) => "code_interpreter",
            Self::Server(server) => server.kind.as_str(),
        }
    }

    fn read(tag: ToolTag, literal: String, fields: &mut Fields<'_>) -> BindResult<Self> {
        Ok(match tag {
            ToolTag::Function => Self::Function(FunctionTool {
                parameters: fields.collection("parameters")?.unwrap_or_default(),
            }),
            ToolTag::BingSearch => Self::BingSearch(BingSearchTool {
                connection: fields.entity("connection")?,
                configurations: fields.collection("configurations")?.unwrap_or_default(),
            }),
            ToolTag::FileSearch => Self::FileSearch(FileSearchTool {
                connection: fields.entity("connection")?,
                vector_store_ids: fields.strings("vectorStoreIds")?,
                max_num_results: fields.int("maxNumResults")?,
                ranker: fields.string("ranker")?,
                score_threshold: fields.float("scoreThreshold")?,
            }),
            ToolTag::Mcp => Self::Mcp(McpTool {
                connection: fields.entity("connection")?,
                server_name: fields.string("serverName")?,
                url: fields.string("url")?,
                allowed: fields.strings("allowed")?,
            }),
            ToolTag::Model => Self::Model(ModelTool {
                model: fields.required_entity("model")?,
            }),
            ToolTag::OpenApi => Self::OpenApi(OpenApiTool {
                connection: fields.entity("connection")?,
                specification: fields.string("specification")?,
            }),
            ToolTag::CodeInterpreter => Self::CodeInterpreter(CodeInterpreterTool {
                connection: fields.entity("connection")?,
                file_ids: fields.strings("fileIds")?,
            }),
            ToolTag::Server => {
                let connection = fields.entity("connection")?;
                let explicit = fields.map("options")?;
                Self::Server(ServerTool {
                    kind: FallbackKind::resolved(literal),
                    connection,
                    options: open_bag(explicit, fields.rest()),
                })
            }
        })
    }

    fn write(&self, writer: MapWriter) -> MapWriter {
        match self {
            Self::Function(function) => writer.list("parameters", &function.parameters),
            Self::BingSearch(bing) => writer
                .opt_entity("connection", bing.connection.as_ref())
                .list("configurations", &bing.configurations),
            Self::FileSearch(search) => writer
                .opt_entity("connection", search.connection.as_ref())
                .opt_strings("vectorStoreIds", search.vector_store_ids.as_deref())
                .opt_int("maxNumResults", search.max_num_results)
                .opt_string("ranker", search.ranker.as_deref())
                .opt_float("scoreThreshold", search.score_threshold),
            Self::Mcp(mcp) => writer
                .opt_entity("connection", mcp.connection.as_ref())
                .opt_string("serverName", mcp.server_name.as_deref())
                .opt_string("url", mcp.url.as_deref())
                .opt_strings("allowed", mcp.allowed.as_deref()),
            Self::Model(tool) => writer.entity("model", &tool.model),
            Self::OpenApi(openapi) => writer
                .opt_entity("connection", openapi.connection.as_ref())
                .opt_string("specification", openapi.specification.as_deref()),
            Self::CodeInterpreter(interpreter) => writer
                .opt_entity("connection", interpreter.connection.as_ref())
                .opt_strings("fileIds", interpreter.file_ids.as_deref()),
            Self::Server(server) => writer
                .opt_entity("connection", server.connection.as_ref())
                .bag("options", &server.options),
        }
    }
}

/// A locally implemented function described by its parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionTool {
    /// Function arguments, in source order.
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BingSearchTool {
    /// Connection to the search resource.
    pub connection: Option<Connection>,

    /// Named search configurations.
    pub configurations: Vec<BingSearchConfiguration>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSearchTool {
    /// Connection to the vector store service.
    pub connection: Option<Connection>,

    /// Vector stores searched by the tool.
    pub vector_store_ids: Option<Vec<String>>,

    /// Upper bound on returned chunks.
    pub max_num_results: Option<i64>,

    /// Ranker name, such as `auto`.
    pub ranker: Option<String>,

    /// Minimum relevance score of returned chunks.
    pub score_threshold: Option<f64>,
}

/// A tool served by a Model Context Protocol server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct McpTool {
    /// Connection to the MCP server.
    pub connection: Option<Connection>,

    /// Label of the server, used to prefix its tools.
    pub server_name: Option<String>,

    /// Server URL.
    pub url: Option<String>,

    /// Names of the server tools the document may call.
    pub allowed: Option<Vec<String>>,
}

/// Another model exposed as a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTool {
    /// Model invoked when the tool is called.
    pub model: Model,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpenApiTool {
    /// Connection to the described API.
    pub connection: Option<Connection>,

    /// OpenAPI document, inline or as a path.
    pub specification: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeInterpreterTool {
    /// Connection to the sandbox service.
    pub connection: Option<Connection>,

    /// Files made available to the sandbox.
    pub file_ids: Option<Vec<String>>,
}

/// Any other tool kind, typically one hosted by the model provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerTool {
    /// Kind literal; never one of the tool kinds with their own variant.
    pub kind: FallbackKind<ToolFamily>,

    /// Connection to the provider resource.
    pub connection: Option<Connection>,

    /// Free-form options. Empty when the source had no extra fields, and
    /// then not written at all.
    pub options: Map,
}

impl ServerTool {
    /// A server tool with no connection or options, or `None` when `kind`
    /// names a tool kind with its own variant.
    pub fn new(kind: impl Into<String>) -> Option<Self> {
        Some(Self {
            kind: FallbackKind::new(kind)?,
            connection: None,
            options: Map::new(),
        })
    }
}

impl Bind for Tool {
    const ENTITY: &'static str = "Tool";

    fn bind_map(map: Map, ctx: &mut BindContext) -> BindResult<Self> {
        let tag = resolve::<ToolFamily>(&map, ctx)?;
        let mut fields = Fields::new(Self::ENTITY, map, ctx);
        let literal = fields.required_string(DISCRIMINATOR)?;
        let tool = Self {
            name: fields.string_or("name", "")?,
            description: fields.string("description")?,
            bindings: fields.collection("bindings")?,
            kind: ToolKind::read(tag, literal, &mut fields)?,
        };
        fields.finish();
        Ok(tool)
    }
}

impl Canonical for Tool {
    fn to_canonical(&self) -> Map {
        let writer = MapWriter::new()
            .string(DISCRIMINATOR, self.kind.literal())
            .name(&self.name)
            .opt_string("description", self.description.as_deref())
            .opt_list("bindings", self.bindings.as_deref());
        self.kind.write(writer).finish()
    }
}

impl Named for Tool {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Binds a tool argument to a document input. `city: location` is shorthand
/// for `{name: city, input: location}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    /// Tool argument name. Empty when unnamed, and then not written.
    pub name: String,

    /// Name of the document input bound to the argument.
    pub input: String,
}

impl Bind for Binding {
    const ENTITY: &'static str = "Binding";
    const SHORTHAND: Shorthand = Shorthand::Input;

    fn bind_map(map: Map, ctx: &mut BindContext) -> BindResult<Self> {
        let mut fields = Fields::new(Self::ENTITY, map, ctx);
        let binding = Self {
            name: fields.string_or("name", "")?,
            input: fields.required_string("input")?,
        };
        fields.finish();
        Ok(binding)
    }
}

impl Canonical for Binding {
    fn to_canonical(&self) -> Map {
        MapWriter::new()
            .name(&self.name)
            .string("input", &self.input)
            .finish()
    }
}

impl Named for Binding {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Search settings for one Bing search configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BingSearchConfiguration {
    /// Configuration name. Empty when unnamed, and then not written.
    pub name: String,

    /// Market code, such as `en-US`.
    pub market: Option<String>,

    /// User-interface language of results.
    pub set_lang: Option<String>,

    /// Number of results to return.
    pub count: Option<i64>,

    /// Age filter, such as `Week`.
    pub freshness: Option<String>,
}

impl Bind for BingSearchConfiguration {
    const ENTITY: &'static str = "BingSearchConfiguration";

    fn bind_map(map: Map, ctx: &mut BindContext) -> BindResult<Self> {
        let mut fields = Fields::new(Self::ENTITY, map, ctx);
        let configuration = Self {
            name: fields.string_or("name", "")?,
            market: fields.string("market")?,
            set_lang: fields.string("setLang")?,
            count: fields.int("count")?,
            freshness: fields.string("freshness")?,
        };
        fields.finish();
        Ok(configuration)
    }
}

impl Canonical for BingSearchConfiguration {
    fn to_canonical(&self) -> Map {
        MapWriter::new()
            .name(&self.name)
            .opt_string("market", self.market.as_deref())
            .opt_string("setLang", self.set_lang.as_deref())
            .opt_int("count", self.count)
            .opt_string("freshness", self.freshness.as_deref())
            .finish()
    }
}

impl Named for BingSearchConfiguration {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BindError;
    use crate::io_models::PropertyKind;
    use crate::value::Value;
    use serde_json::json;

    fn bind(node: Value) -> BindResult<Tool> {
        Tool::bind(node, &mut BindContext::default())
    }

    #[test]
    fn test_function_tool_parameters() {
        let tool = bind(json!({
            "name": "getCurrentWeather",
            "kind": "function",
            "description": "Get the weather",
            "parameters": {
                "location": {"kind": "string", "required": true},
                "unit": "celsius"
            }
        }))
        .unwrap();

        let ToolKind::Function(function) = &tool.kind else {
            panic!("expected function tool");
        };
        assert_eq!(function.parameters.len(), 2);
        assert_eq!(function.parameters[0].name, "location");
        assert!(matches!(function.parameters[1].kind, PropertyKind::Plain(_)));
        assert_eq!(function.parameters[1].kind.literal(), "string");
        assert_eq!(function.parameters[1].value, None);
    }

    #[test]
    fn test_bindings_shorthand() {
        let tool = bind(json!({
            "kind": "function",
            "bindings": {"city": "location"}
        }))
        .unwrap();
        assert_eq!(
            tool.bindings,
            Some(vec![Binding {
                name: "city".to_string(),
                input: "location".to_string(),
            }])
        );
        assert_eq!(
            tool.to_value(),
            json!({
                "kind": "function",
                "bindings": [{"name": "city", "input": "location"}],
                "parameters": []
            })
        );
    }

    #[test]
    fn test_model_tool_requires_model() {
        let tool = bind(json!({"kind": "model", "model": "gpt-4o-mini"})).unwrap();
        let ToolKind::Model(model_tool) = &tool.kind else {
            panic!("expected model tool");
        };
        assert_eq!(model_tool.model.id, "gpt-4o-mini");

        let err = bind(json!({"kind": "model"})).unwrap_err();
        assert!(matches!(
            err,
            BindError::MissingRequiredField { entity: "Tool", ref field, .. } if field == "model"
        ));
    }

    #[test]
    fn test_file_search_fields() {
        let tool = bind(json!({
            "kind": "file_search",
            "vectorStoreIds": ["vs_1"],
            "maxNumResults": 10,
            "scoreThreshold": 0.5
        }))
        .unwrap();
        let ToolKind::FileSearch(search) = &tool.kind else {
            panic!("expected file search tool");
        };
        assert_eq!(search.vector_store_ids, Some(vec!["vs_1".to_string()]));
        assert_eq!(search.max_num_results, Some(10));
        assert_eq!(search.score_threshold, Some(0.5));
    }

    #[test]
    fn test_unknown_kind_becomes_server_tool() {
        let tool = bind(json!({
            "name": "browser",
            "kind": "web_browser",
            "options": {"headless": true},
            "viewport": "1280x720"
        }))
        .unwrap();

        let ToolKind::Server(server) = &tool.kind else {
            panic!("expected server tool");
        };
        assert_eq!(server.kind, "web_browser");
        assert_eq!(
            tool.to_value(),
            json!({
                "kind": "web_browser",
                "name": "browser",
                "options": {"headless": true, "viewport": "1280x720"}
            })
        );
    }

    #[test]
    fn test_server_tool_cannot_shadow_a_known_kind() {
        for (literal, _) in ToolFamily::TABLE {
            assert!(ServerTool::new(*literal).is_none(), "{literal}");
        }

        let tool = Tool {
            name: "search".to_string(),
            kind: ToolKind::Server(ServerTool::new("Function").unwrap()),
            description: None,
            bindings: None,
        };
        assert_eq!(tool.to_value(), json!({"kind": "Function", "name": "search"}));
        assert_eq!(bind(tool.to_value()).unwrap(), tool);
    }

    #[test]
    fn test_mcp_tool() {
        let tool = bind(json!({
            "kind": "mcp",
            "serverName": "github",
            "url": "https://mcp.example.com",
            "allowed": ["search_issues"],
            "connection": {"kind": "reference", "name": "gh"}
        }))
        .unwrap();
        let ToolKind::Mcp(mcp) = &tool.kind else {
            panic!("expected mcp tool");
        };
        assert_eq!(mcp.server_name.as_deref(), Some("github"));
        assert_eq!(mcp.allowed, Some(vec!["search_issues".to_string()]));
        assert!(mcp.connection.is_some());
    }
}

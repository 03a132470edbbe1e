//! Agent definition documents, the root of every `.prompty` file.
//!
//! The document family is closed: `kind` must be one of `prompt`,
//! `manifest`, `container`, `hosted` or `workflow`.
//!
//! # Example
//!
//! ```yaml
//! kind: prompt
//! name: basic
//! model: gpt-4o
//! inputs:
//!   firstName: Jane
//! template:
//!   format: mustache
//!   parser: prompty
//! instructions: |
//!   system:
//!   You are a helpful assistant.
//! ```

use crate::binder::{Bind, BindContext, Fields};
use crate::container_models::{ContainerDefinition, EnvironmentVariable, HostedContainerDefinition};
use crate::discriminator::{resolve, Family, DISCRIMINATOR};
use crate::error::BindResult;
use crate::io_models::{Input, Output, Parameter};
use crate::runtime_models::{Model, Template};
use crate::serializer::{Canonical, MapWriter};
use crate::tool_models::Tool;
use crate::value::Map;

/// Default `protocol` of container documents.
pub const DEFAULT_PROTOCOL: &str = "responses";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentTag {
    Prompt,
    Manifest,
    Container,
    Hosted,
    Workflow,
}

/// Dispatch table of the document family. There is no fallback.
pub struct DocumentFamily;

impl Family for DocumentFamily {
    type Tag = DocumentTag;
    const ENTITY: &'static str = "Document";
    const TABLE: &'static [(&'static str, DocumentTag)] = &[
        ("prompt", DocumentTag::Prompt),
        ("manifest", DocumentTag::Manifest),
        ("container", DocumentTag::Container),
        ("hosted", DocumentTag::Hosted),
        ("workflow", DocumentTag::Workflow),
    ];
    const FALLBACK: Option<DocumentTag> = None;
}

/// An agent definition: shared fields plus the kind-specific variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The document variant, selected by `kind`.
    pub kind: DocumentKind,

    /// Stable identifier, when the document is published.
    pub id: Option<String>,

    /// Free-form version label.
    pub version: Option<String>,

    /// Display name. Empty when unnamed, and then not written.
    pub name: String,

    /// Human-readable summary of what the document does.
    pub description: Option<String>,

    /// Free-form metadata such as authors or tags.
    pub metadata: Option<Map>,

    /// Values the caller supplies, in source order.
    pub inputs: Option<Vec<Input>>,

    /// Values the document produces, in source order.
    pub outputs: Option<Vec<Output>>,

    /// Tools the model may call, in source order.
    pub tools: Option<Vec<Tool>>,

    /// How `instructions` is rendered and parsed into messages.
    pub template: Option<Template>,

    /// Prompt body. Loaded from the markdown section of a `.prompty` file.
    pub instructions: Option<String>,

    /// Text appended after `instructions`.
    pub additional_instructions: Option<String>,
}

impl Document {
    /// An empty document of the given variant.
    pub fn new(kind: DocumentKind) -> Self {
        Self {
            kind,
            id: None,
            version: None,
            name: String::new(),
            description: None,
            metadata: None,
            inputs: None,
            outputs: None,
            tools: None,
            template: None,
            instructions: None,
            additional_instructions: None,
        }
    }

    /// The model the document runs against, when its variant has one.
    pub fn model(&self) -> Option<&Model> {
        match &self.kind {
            DocumentKind::Prompt(prompt) => prompt.model.as_ref(),
            DocumentKind::Manifest(manifest) => manifest.prompt.model.as_ref(),
            DocumentKind::Container(container) => container.prompt.model.as_ref(),
            DocumentKind::Hosted(_) | DocumentKind::Workflow(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentKind {
    Prompt(PromptAgent),
    Manifest(PromptManifest),
    Container(PromptContainer),
    Hosted(HostedContainer),
    Workflow(Workflow),
}

impl DocumentKind {
    pub fn literal(&self) -> &'static str {
        match self {
            Self::Prompt(_) => "prompt",
            Self::Manifest(_) => "manifest",
            Self::Container(_) => "container",
            Self::Hosted(_) => "hosted",
            Self::Workflow(_) => "workflow",
        }
    }

    fn read(tag: DocumentTag, fields: &mut Fields<'_>) -> BindResult<Self> {
        Ok(match tag {
            DocumentTag::Prompt => Self::Prompt(PromptAgent::read(fields)?),
            DocumentTag::Manifest => Self::Manifest(PromptManifest {
                prompt: PromptAgent::read(fields)?,
                models: fields.list("models")?.unwrap_or_default(),
                parameters: fields.collection("parameters")?.unwrap_or_default(),
            }),
            DocumentTag::Container => Self::Container(PromptContainer {
                prompt: PromptAgent::read(fields)?,
                protocol: fields.string_or("protocol", DEFAULT_PROTOCOL)?,
                container: fields.required_entity("container")?,
                environment_variables: fields.collection("environmentVariables")?,
            }),
            DocumentTag::Hosted => Self::Hosted(HostedContainer {
                protocol: fields.string_or("protocol", DEFAULT_PROTOCOL)?,
                container: fields.required_entity("container")?,
                environment_variables: fields.collection("environmentVariables")?,
            }),
            DocumentTag::Workflow => Self::Workflow(Workflow {
                trigger: fields.map("trigger")?,
            }),
        })
    }

    fn write(&self, writer: MapWriter) -> MapWriter {
        match self {
            Self::Prompt(prompt) => prompt.write(writer),
            Self::Manifest(manifest) => manifest
                .prompt
                .write(writer)
                .list("models", &manifest.models)
                .list("parameters", &manifest.parameters),
            Self::Container(container) => container
                .prompt
                .write(writer)
                .string("protocol", &container.protocol)
                .entity("container", &container.container)
                .opt_list("environmentVariables", container.environment_variables.as_deref()),
            Self::Hosted(hosted) => writer
                .string("protocol", &hosted.protocol)
                .entity("container", &hosted.container)
                .opt_list("environmentVariables", hosted.environment_variables.as_deref()),
            Self::Workflow(workflow) => writer.opt_map("trigger", workflow.trigger.as_ref()),
        }
    }
}

/// An executable prompt. `manifest` and `container` documents extend it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptAgent {
    /// Model the prompt runs against.
    pub model: Option<Model>,
}

impl PromptAgent {
    fn read(fields: &mut Fields<'_>) -> BindResult<Self> {
        Ok(Self {
            model: fields.entity("model")?,
        })
    }

    fn write(&self, writer: MapWriter) -> MapWriter {
        writer.opt_entity("model", self.model.as_ref())
    }
}

/// A prompt plus the catalog of models and parameters it was tested with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptManifest {
    /// The prompt fields shared with `kind: prompt`.
    pub prompt: PromptAgent,

    /// Candidate models. Each element accepts the model id shorthand.
    pub models: Vec<Model>,

    /// Tunable parameters exposed by the manifest.
    pub parameters: Vec<Parameter>,
}

/// A prompt deployed as a container.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptContainer {
    /// The prompt fields shared with `kind: prompt`.
    pub prompt: PromptAgent,

    /// Wire protocol the container speaks. Defaults to `responses`.
    pub protocol: String,

    /// Image, registry and scaling of the deployment.
    pub container: ContainerDefinition,

    /// Variables set in the container, in source order.
    pub environment_variables: Option<Vec<EnvironmentVariable>>,
}

/// A container hosted by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct HostedContainer {
    /// Wire protocol the container speaks. Defaults to `responses`.
    pub protocol: String,

    /// Build context and scaling of the hosted deployment.
    pub container: HostedContainerDefinition,

    /// Variables set in the container, in source order.
    pub environment_variables: Option<Vec<EnvironmentVariable>>,
}

/// Trigger-based orchestration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workflow {
    /// Free-form trigger settings, such as a schedule.
    pub trigger: Option<Map>,
}

impl Bind for Document {
    const ENTITY: &'static str = "Document";

    fn bind_map(map: Map, ctx: &mut BindContext) -> BindResult<Self> {
        let tag = resolve::<DocumentFamily>(&map, ctx)?;
        let mut fields = Fields::new(Self::ENTITY, map, ctx);
        fields.take(DISCRIMINATOR);
        let document = Self {
            id: fields.string("id")?,
            version: fields.string("version")?,
            name: fields.string_or("name", "")?,
            description: fields.string("description")?,
            metadata: fields.map("metadata")?,
            inputs: fields.collection("inputs")?,
            outputs: fields.collection("outputs")?,
            tools: fields.collection("tools")?,
            template: fields.entity("template")?,
            instructions: fields.string("instructions")?,
            additional_instructions: fields.string("additionalInstructions")?,
            kind: DocumentKind::read(tag, &mut fields)?,
        };
        fields.finish();
        Ok(document)
    }
}

impl Canonical for Document {
    fn to_canonical(&self) -> Map {
        let writer = MapWriter::new()
            .string(DISCRIMINATOR, self.kind.literal())
            .opt_string("id", self.id.as_deref())
            .opt_string("version", self.version.as_deref())
            .name(&self.name)
            .opt_string("description", self.description.as_deref())
            .opt_map("metadata", self.metadata.as_ref())
            .opt_list("inputs", self.inputs.as_deref())
            .opt_list("outputs", self.outputs.as_deref())
            .opt_list("tools", self.tools.as_deref())
            .opt_entity("template", self.template.as_ref())
            .opt_string("instructions", self.instructions.as_deref())
            .opt_string("additionalInstructions", self.additional_instructions.as_deref());
        self.kind.write(writer).finish()
    }
}

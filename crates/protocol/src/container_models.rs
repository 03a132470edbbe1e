//! Container deployment records: registries, images, scaling and
//! environment variables.

use crate::binder::{open_bag, Bind, BindContext, Fields};
use crate::collection::Named;
use crate::connection_models::Connection;
use crate::discriminator::{resolve, FallbackKind, Family, DISCRIMINATOR};
use crate::error::BindResult;
use crate::serializer::{Canonical, MapWriter};
use crate::shape::Shorthand;
use crate::value::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryTag {
    Acr,
    Generic,
}

/// Dispatch table of the registry family.
pub struct RegistryFamily;

impl Family for RegistryFamily {
    type Tag = RegistryTag;
    const ENTITY: &'static str = "Registry";
    const TABLE: &'static [(&'static str, RegistryTag)] = &[("acr", RegistryTag::Acr)];
    const FALLBACK: Option<RegistryTag> = Some(RegistryTag::Generic);
}

/// Where a container image is pulled from.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    /// The registry variant, selected by `kind`.
    pub kind: RegistryKind,

    /// Credentials used to pull from the registry.
    pub connection: Option<Connection>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistryKind {
    Acr(AzureContainerRegistry),
    Generic(GenericRegistry),
}

impl RegistryKind {
    pub fn literal(&self) -> &str {
        match self {
            Self::Acr(_) => "acr",
            Self::Generic(generic) => generic.kind.as_str(),
        }
    }
}

/// An Azure Container Registry. Closed: unrecognized fields are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct AzureContainerRegistry {
    /// Azure subscription id.
    pub subscription: Option<String>,

    /// Resource group that holds the registry.
    pub resource_group: Option<String>,

    /// Registry name, without the `.azurecr.io` suffix.
    pub registry_name: Option<String>,
}

impl AzureContainerRegistry {
    fn read(fields: &mut Fields<'_>) -> BindResult<Self> {
        Ok(Self {
            subscription: fields.string("subscription")?,
            resource_group: fields.string("resourceGroup")?,
            registry_name: fields.string("registryName")?,
        })
    }

    fn write(&self, writer: MapWriter) -> MapWriter {
        writer
            .opt_string("subscription", self.subscription.as_deref())
            .opt_string("resourceGroup", self.resource_group.as_deref())
            .opt_string("registryName", self.registry_name.as_deref())
    }
}

/// Any other registry kind. Unrecognized fields land in `options`.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericRegistry {
    /// Kind literal; never `acr`.
    pub kind: FallbackKind<RegistryFamily>,

    /// Image repository path within the registry.
    pub repository: Option<String>,

    /// Login user for the registry.
    pub username: Option<String>,

    /// Login password or token.
    pub password: Option<String>,

    /// Open option bag; written only when non-empty.
    pub options: Map,
}

impl GenericRegistry {
    /// A generic registry with every optional field absent, or `None` when
    /// `kind` names a known registry kind.
    pub fn new(kind: impl Into<String>) -> Option<Self> {
        Some(Self {
            kind: FallbackKind::new(kind)?,
            repository: None,
            username: None,
            password: None,
            options: Map::new(),
        })
    }

    fn read(kind: String, fields: &mut Fields<'_>) -> BindResult<Self> {
        let repository = fields.string("repository")?;
        let username = fields.string("username")?;
        let password = fields.string("password")?;
        let explicit = fields.map("options")?;
        Ok(Self {
            kind: FallbackKind::resolved(kind),
            repository,
            username,
            password,
            options: open_bag(explicit, fields.rest()),
        })
    }

    fn write(&self, writer: MapWriter) -> MapWriter {
        writer
            .opt_string("repository", self.repository.as_deref())
            .opt_string("username", self.username.as_deref())
            .opt_string("password", self.password.as_deref())
            .bag("options", &self.options)
    }
}

impl Bind for Registry {
    const ENTITY: &'static str = "Registry";

    fn bind_map(map: Map, ctx: &mut BindContext) -> BindResult<Self> {
        let tag = resolve::<RegistryFamily>(&map, ctx)?;
        let mut fields = Fields::new(Self::ENTITY, map, ctx);
        let literal = fields.required_string(DISCRIMINATOR)?;
        let connection = fields.entity("connection")?;
        let kind = match tag {
            RegistryTag::Acr => RegistryKind::Acr(AzureContainerRegistry::read(&mut fields)?),
            RegistryTag::Generic => RegistryKind::Generic(GenericRegistry::read(literal, &mut fields)?),
        };
        fields.finish();
        Ok(Self { kind, connection })
    }
}

impl Canonical for Registry {
    fn to_canonical(&self) -> Map {
        let writer = MapWriter::new()
            .string(DISCRIMINATOR, self.kind.literal())
            .opt_entity("connection", self.connection.as_ref());
        let writer = match &self.kind {
            RegistryKind::Acr(acr) => acr.write(writer),
            RegistryKind::Generic(generic) => generic.write(writer),
        };
        writer.finish()
    }
}

/// Replica and resource limits of a deployment.
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    /// Lower bound on running replicas.
    pub min_replicas: Option<i64>,

    /// Upper bound on running replicas.
    pub max_replicas: Option<i64>,

    /// CPU cores; always floating, even when written as `1`.
    pub cpu: f64,

    /// Memory in GiB; always floating, even when written as `2`.
    pub memory: f64,
}

impl Bind for Scale {
    const ENTITY: &'static str = "Scale";

    fn bind_map(map: Map, ctx: &mut BindContext) -> BindResult<Self> {
        let mut fields = Fields::new(Self::ENTITY, map, ctx);
        let scale = Self {
            min_replicas: fields.int("minReplicas")?,
            max_replicas: fields.int("maxReplicas")?,
            cpu: fields.required_float("cpu")?,
            memory: fields.required_float("memory")?,
        };
        fields.finish();
        Ok(scale)
    }
}

impl Canonical for Scale {
    fn to_canonical(&self) -> Map {
        MapWriter::new()
            .opt_int("minReplicas", self.min_replicas)
            .opt_int("maxReplicas", self.max_replicas)
            .float("cpu", self.cpu)
            .float("memory", self.memory)
            .finish()
    }
}

/// An image to deploy.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerDefinition {
    /// Image name, without tag.
    pub image: String,

    /// Image tag, such as `latest`.
    pub tag: Option<String>,

    /// Registry the image is pulled from.
    pub registry: Option<Registry>,

    /// Replica and resource limits.
    pub scale: Option<Scale>,
}

impl Bind for ContainerDefinition {
    const ENTITY: &'static str = "ContainerDefinition";

    fn bind_map(map: Map, ctx: &mut BindContext) -> BindResult<Self> {
        let mut fields = Fields::new(Self::ENTITY, map, ctx);
        let container = Self {
            image: fields.required_string("image")?,
            tag: fields.string("tag")?,
            registry: fields.entity("registry")?,
            scale: fields.entity("scale")?,
        };
        fields.finish();
        Ok(container)
    }
}

impl Canonical for ContainerDefinition {
    fn to_canonical(&self) -> Map {
        MapWriter::new()
            .string("image", &self.image)
            .opt_string("tag", self.tag.as_deref())
            .opt_entity("registry", self.registry.as_ref())
            .opt_entity("scale", self.scale.as_ref())
            .finish()
    }
}

/// A container the hosting provider builds and runs.
#[derive(Debug, Clone, PartialEq)]
pub struct HostedContainerDefinition {
    /// Replica and resource limits.
    pub scale: Option<Scale>,

    /// Provider-specific build context, kept as parsed.
    pub context: Option<Value>,
}

impl Bind for HostedContainerDefinition {
    const ENTITY: &'static str = "HostedContainerDefinition";

    fn bind_map(map: Map, ctx: &mut BindContext) -> BindResult<Self> {
        let mut fields = Fields::new(Self::ENTITY, map, ctx);
        let hosted = Self {
            scale: fields.entity("scale")?,
            context: fields.value("context"),
        };
        fields.finish();
        Ok(hosted)
    }
}

impl Canonical for HostedContainerDefinition {
    fn to_canonical(&self) -> Map {
        MapWriter::new()
            .opt_entity("scale", self.scale.as_ref())
            .opt_value("context", self.context.as_ref())
            .finish()
    }
}

/// An environment variable passed to a container.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentVariable {
    /// Variable name. Empty when unnamed, and then not written.
    pub name: String,

    /// Variable value; scalars are kept as text.
    pub value: String,
}

impl Bind for EnvironmentVariable {
    const ENTITY: &'static str = "EnvironmentVariable";
    const SHORTHAND: Shorthand = Shorthand::Value;

    fn bind_map(map: Map, ctx: &mut BindContext) -> BindResult<Self> {
        let mut fields = Fields::new(Self::ENTITY, map, ctx);
        let variable = Self {
            name: fields.string_or("name", "")?,
            value: fields.required_string("value")?,
        };
        fields.finish();
        Ok(variable)
    }
}

impl Canonical for EnvironmentVariable {
    fn to_canonical(&self) -> Map {
        MapWriter::new()
            .name(&self.name)
            .string("value", &self.value)
            .finish()
    }
}

impl Named for EnvironmentVariable {
    fn name(&self) -> &str {
        &self.name
    }
}

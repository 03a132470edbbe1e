//! Connection: how a model, tool or registry reaches its endpoint.
//!
//! Connections are plain data. Nothing here authenticates or opens sockets.
//! Unknown kinds bind to [`GenericConnection`], which keeps every field it
//! does not recognize in an open option bag.

use crate::binder::{open_bag, Bind, BindContext, Fields};
use crate::discriminator::{resolve, FallbackKind, Family, DISCRIMINATOR};
use crate::error::BindResult;
use crate::serializer::{Canonical, MapWriter};
use crate::value::Map;

/// Default `authority` when a connection does not name one.
pub const DEFAULT_AUTHORITY: &str = "system";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionTag {
    Key,
    OAuth,
    Foundry,
    Reference,
    Generic,
}

/// Dispatch table of the connection family.
pub struct ConnectionFamily;

impl Family for ConnectionFamily {
    type Tag = ConnectionTag;
    const ENTITY: &'static str = "Connection";
    const TABLE: &'static [(&'static str, ConnectionTag)] = &[
        ("key", ConnectionTag::Key),
        ("oauth", ConnectionTag::OAuth),
        ("foundry", ConnectionTag::Foundry),
        ("reference", ConnectionTag::Reference),
    ];
    const FALLBACK: Option<ConnectionTag> = Some(ConnectionTag::Generic);
}

/// A connection: shared fields plus the kind-specific variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    /// The connection variant, selected by `kind`.
    pub kind: ConnectionKind,

    /// Identity the connection acts as. Defaults to `system`.
    pub authority: String,

    /// Why the document needs this connection.
    pub usage_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionKind {
    Key(KeyConnection),
    OAuth(OAuthConnection),
    Foundry(FoundryConnection),
    Reference(ReferenceConnection),
    Generic(GenericConnection),
}

impl ConnectionKind {
    pub fn literal(&self) -> &str {
        match self {
            Self::Key(_) => "key",
            Self::OAuth(_) => "oauth",
            Self::Foundry(_) => "foundry",
            Self::Reference(_) => "reference",
            Self::Generic(generic) => generic.kind.as_str(),
        }
    }
}

/// Endpoint plus API key.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyConnection {
    /// Service endpoint URL.
    pub endpoint: String,

    /// API key, usually an `${env:...}` reference in the source.
    pub key: Option<String>,
}

impl KeyConnection {
    fn read(fields: &mut Fields<'_>) -> BindResult<Self> {
        Ok(Self {
            endpoint: fields.required_string("endpoint")?,
            key: fields.string("key")?,
        })
    }

    fn write(&self, writer: MapWriter) -> MapWriter {
        writer
            .string("endpoint", &self.endpoint)
            .opt_string("key", self.key.as_deref())
    }
}

/// OAuth client credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthConnection {
    /// Service endpoint URL.
    pub endpoint: String,

    /// OAuth client identifier.
    pub client_id: Option<String>,

    /// OAuth client secret.
    pub client_secret: Option<String>,

    /// Token endpoint used to obtain access tokens.
    pub token_url: Option<String>,

    /// Requested scopes, in source order.
    pub scopes: Option<Vec<String>>,
}

impl OAuthConnection {
    fn read(fields: &mut Fields<'_>) -> BindResult<Self> {
        Ok(Self {
            endpoint: fields.required_string("endpoint")?,
            client_id: fields.string("clientId")?,
            client_secret: fields.string("clientSecret")?,
            token_url: fields.string("tokenUrl")?,
            scopes: fields.strings("scopes")?,
        })
    }

    fn write(&self, writer: MapWriter) -> MapWriter {
        writer
            .string("endpoint", &self.endpoint)
            .opt_string("clientId", self.client_id.as_deref())
            .opt_string("clientSecret", self.client_secret.as_deref())
            .opt_string("tokenUrl", self.token_url.as_deref())
            .opt_strings("scopes", self.scopes.as_deref())
    }
}

/// A connection registered in a Foundry project.
#[derive(Debug, Clone, PartialEq)]
pub struct FoundryConnection {
    /// Connection type as registered in the project (`type`).
    pub connection_type: Option<String>,

    /// Connection name within the project.
    pub name: Option<String>,

    /// Foundry project that owns the connection.
    pub project: Option<String>,
}

impl FoundryConnection {
    fn read(fields: &mut Fields<'_>) -> BindResult<Self> {
        Ok(Self {
            connection_type: fields.string("type")?,
            name: fields.string("name")?,
            project: fields.string("project")?,
        })
    }

    fn write(&self, writer: MapWriter) -> MapWriter {
        writer
            .opt_string("type", self.connection_type.as_deref())
            .opt_string("name", self.name.as_deref())
            .opt_string("project", self.project.as_deref())
    }
}

/// A connection defined elsewhere, referenced by name.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceConnection {
    /// Name of the referenced connection.
    pub name: String,
}

impl ReferenceConnection {
    fn read(fields: &mut Fields<'_>) -> BindResult<Self> {
        Ok(Self {
            name: fields.required_string("name")?,
        })
    }

    fn write(&self, writer: MapWriter) -> MapWriter {
        writer.string("name", &self.name)
    }
}

/// Any other connection kind. Unrecognized fields land in `options`.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericConnection {
    /// Kind literal; never one of the known connection kinds.
    pub kind: FallbackKind<ConnectionFamily>,

    /// Open option bag. Empty when the source had no extra fields, and
    /// then not written at all.
    pub options: Map,
}

impl GenericConnection {
    /// A generic connection with no options, or `None` when `kind` names a
    /// known connection kind.
    pub fn new(kind: impl Into<String>) -> Option<Self> {
        Some(Self {
            kind: FallbackKind::new(kind)?,
            options: Map::new(),
        })
    }

    fn read(kind: String, fields: &mut Fields<'_>) -> BindResult<Self> {
        let explicit = fields.map("options")?;
        Ok(Self {
            kind: FallbackKind::resolved(kind),
            options: open_bag(explicit, fields.rest()),
        })
    }

    fn write(&self, writer: MapWriter) -> MapWriter {
        writer.bag("options", &self.options)
    }
}

impl Bind for Connection {
    const ENTITY: &'static str = "Connection";

    fn bind_map(map: Map, ctx: &mut BindContext) -> BindResult<Self> {
        let tag = resolve::<ConnectionFamily>(&map, ctx)?;
        let mut fields = Fields::new(Self::ENTITY, map, ctx);
        let literal = fields.required_string(DISCRIMINATOR)?;
        let authority = fields.string_or("authority", DEFAULT_AUTHORITY)?;
        let usage_description = fields.string("usageDescription")?;
        let kind = match tag {
            ConnectionTag::Key => ConnectionKind::Key(KeyConnection::read(&mut fields)?),
            ConnectionTag::OAuth => ConnectionKind::OAuth(OAuthConnection::read(&mut fields)?),
            ConnectionTag::Foundry => {
                ConnectionKind::Foundry(FoundryConnection::read(&mut fields)?)
            }
            ConnectionTag::Reference => {
                ConnectionKind::Reference(ReferenceConnection::read(&mut fields)?)
            }
            ConnectionTag::Generic => {
                ConnectionKind::Generic(GenericConnection::read(literal, &mut fields)?)
            }
        };
        fields.finish();
        Ok(Self {
            kind,
            authority,
            usage_description,
        })
    }
}

impl Canonical for Connection {
    fn to_canonical(&self) -> Map {
        let writer = MapWriter::new()
            .string(DISCRIMINATOR, self.kind.literal())
            .string("authority", &self.authority)
            .opt_string("usageDescription", self.usage_description.as_deref());
        let writer = match &self.kind {
            ConnectionKind::Key(key) => key.write(writer),
            ConnectionKind::OAuth(oauth) => oauth.write(writer),
            ConnectionKind::Foundry(foundry) => foundry.write(writer),
            ConnectionKind::Reference(reference) => reference.write(writer),
            ConnectionKind::Generic(generic) => generic.write(writer),
        };
        writer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BindError;
    use crate::value::Value;
    use serde_json::json;

    fn bind(node: Value) -> BindResult<Connection> {
        Connection::bind(node, &mut BindContext::default())
    }

    #[test]
    fn test_oauth_connection() {
        let connection = bind(json!({
            "kind": "oauth",
            "endpoint": "https://login.example.com",
            "clientId": "client",
            "clientSecret": "secret",
            "tokenUrl": "https://login.example.com/token",
            "scopes": ["read", "write"]
        }))
        .unwrap();

        let ConnectionKind::OAuth(oauth) = &connection.kind else {
            panic!("expected oauth connection");
        };
        assert_eq!(oauth.client_id.as_deref(), Some("client"));
        assert_eq!(oauth.scopes, Some(vec!["read".to_string(), "write".to_string()]));
        assert_eq!(connection.authority, "system");
    }

    #[test]
    fn test_unknown_kind_keeps_extra_fields() {
        let connection = bind(json!({"kind": "unknown-vendor", "apiVersion": "v9"})).unwrap();

        let ConnectionKind::Generic(generic) = &connection.kind else {
            panic!("expected generic connection");
        };
        assert_eq!(generic.kind, "unknown-vendor");
        assert_eq!(Value::Object(generic.options.clone()), json!({"apiVersion": "v9"}));
        assert_eq!(
            connection.to_value(),
            json!({"kind": "unknown-vendor", "authority": "system", "options": {"apiVersion": "v9"}})
        );
    }

    #[test]
    fn test_generic_without_extras_has_no_bag() {
        let connection = bind(json!({"kind": "custom", "authority": "user"})).unwrap();
        let ConnectionKind::Generic(generic) = &connection.kind else {
            panic!("expected generic connection");
        };
        assert!(generic.options.is_empty());
        assert_eq!(connection.to_value(), json!({"kind": "custom", "authority": "user"}));
    }

    #[test]
    fn test_key_connection_requires_endpoint() {
        let err = bind(json!({"kind": "key", "key": "abc"})).unwrap_err();
        assert_eq!(
            err,
            BindError::MissingRequiredField {
                path: "$".to_string(),
                entity: "Connection",
                field: "endpoint".to_string(),
            }
        );
    }

    #[test]
    fn test_closed_variant_drops_extra_fields() {
        let connection = bind(json!({"kind": "reference", "name": "my-conn", "legacy": true})).unwrap();
        assert_eq!(
            connection.to_value(),
            json!({"kind": "reference", "authority": "system", "name": "my-conn"})
        );
    }

    #[test]
    fn test_generic_connection_cannot_take_a_known_kind() {
        for kind in ["key", "oauth", "foundry", "reference"] {
            assert!(GenericConnection::new(kind).is_none(), "{kind}");
        }

        let connection = Connection {
            kind: ConnectionKind::Generic(GenericConnection::new("Key").unwrap()),
            authority: DEFAULT_AUTHORITY.to_string(),
            usage_description: None,
        };
        assert_eq!(connection.to_value(), json!({"kind": "Key", "authority": "system"}));
        assert_eq!(bind(connection.to_value()).unwrap(), connection);
    }

    #[test]
    fn test_connection_has_no_shorthand() {
        let err = bind(json!("my-conn")).unwrap_err();
        assert!(matches!(err, BindError::Shape { entity: "Connection", found: "string", .. }));
    }
}

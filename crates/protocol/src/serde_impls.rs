//! `Serialize` and `Deserialize` for every entity.
//!
//! Deserializing goes through the shape-tolerant binder, so any serde data
//! format (JSON, YAML, TOML) accepts the same shorthands. Serializing always
//! writes the canonical form.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::agent_models::Document;
use crate::binder::{Bind, BindContext};
use crate::connection_models::Connection;
use crate::container_models::{
    ContainerDefinition, EnvironmentVariable, HostedContainerDefinition, Registry, Scale,
};
use crate::io_models::{Input, Output, Parameter};
use crate::runtime_models::{Format, Model, ModelOptions, Parser, Template};
use crate::serializer::Canonical;
use crate::tool_models::{Binding, BingSearchConfiguration, Tool};
use crate::value::Value;

macro_rules! impl_serde {
    ($($entity:ty),* $(,)?) => {
        $(
            impl Serialize for $entity {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: Serializer,
                {
                    self.to_canonical().serialize(serializer)
                }
            }

            impl<'de> Deserialize<'de> for $entity {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: Deserializer<'de>,
                {
                    let node = Value::deserialize(deserializer)?;
                    <$entity as Bind>::bind(node, &mut BindContext::default())
                        .map_err(serde::de::Error::custom)
                }
            }
        )*
    };
}

impl_serde!(
    Document,
    Input,
    Output,
    Parameter,
    Connection,
    Registry,
    Tool,
    Binding,
    BingSearchConfiguration,
    EnvironmentVariable,
    Scale,
    ContainerDefinition,
    HostedContainerDefinition,
    Model,
    ModelOptions,
    Template,
    Format,
    Parser,
);

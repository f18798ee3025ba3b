//! Aspire manifest resource model
//!
//! Every manifest entry becomes one [`Resource`] variant. The variant is fixed
//! when the entry is deserialized and decides which handler may process it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Resources keyed by manifest name, in manifest order
pub type Resources = IndexMap<String, Resource>;

/// Maximum edit distance for "did you mean" suggestions on type tags
const MAX_SUGGESTION_DISTANCE: usize = 4;

/// Input name used for the generated postgres superuser password
pub const POSTGRES_PASSWORD_INPUT: &str = "password";

/// Default length of generated input values
pub const DEFAULT_GENERATED_LENGTH: usize = 22;

/// Resource type tag as it appears in the manifest `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Container,
    Project,
    Dockerfile,
    PostgresServer,
    PostgresDatabase,
    RabbitMq,
    Redis,
    Value,
    Parameter,
}

impl ResourceType {
    pub const ALL: [ResourceType; 9] = [
        ResourceType::Container,
        ResourceType::Project,
        ResourceType::Dockerfile,
        ResourceType::PostgresServer,
        ResourceType::PostgresDatabase,
        ResourceType::RabbitMq,
        ResourceType::Redis,
        ResourceType::Value,
        ResourceType::Parameter,
    ];

    /// The manifest tag for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Container => "container.v0",
            Self::Project => "project.v0",
            Self::Dockerfile => "dockerfile.v0",
            Self::PostgresServer => "postgres.server.v0",
            Self::PostgresDatabase => "postgres.database.v0",
            Self::RabbitMq => "rabbitmq.server.v0",
            Self::Redis => "redis.v0",
            Self::Value => "value.v0",
            Self::Parameter => "parameter.v0",
        }
    }

    /// Closest known tag to an unknown one, if any is near enough
    pub fn suggest(tag: &str) -> Option<&'static str> {
        Self::ALL
            .iter()
            .map(|t| (t.as_str(), strsim::levenshtein(tag, t.as_str())))
            .filter(|(_, distance)| *distance <= MAX_SUGGESTION_DISTANCE)
            .min_by_key(|(_, distance)| *distance)
            .map(|(candidate, _)| candidate)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = CoreError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == tag)
            .ok_or_else(|| CoreError::UnknownResourceType {
                tag: tag.to_string(),
                suggestion: Self::suggest(tag).map(str::to_string),
            })
    }
}

impl Serialize for ResourceType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// An exposed endpoint of a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    #[serde(default = "default_scheme")]
    pub scheme: String,

    #[serde(default = "default_protocol")]
    pub protocol: String,

    #[serde(default)]
    pub transport: Option<String>,

    /// Port the process listens on inside the container
    #[serde(default)]
    pub container_port: Option<u16>,

    #[serde(default)]
    pub target_port: Option<u16>,

    /// Port exposed by the service
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub external: bool,
}

fn default_scheme() -> String {
    "tcp".to_string()
}

fn default_protocol() -> String {
    "tcp".to_string()
}

impl Binding {
    /// Port inside the pod, falling back to the scheme's conventional port
    pub fn target_port(&self) -> u16 {
        self.target_port
            .or(self.container_port)
            .unwrap_or(match self.scheme.as_str() {
                "https" => 8443,
                _ => 8080,
            })
    }

    /// Port exposed by the service
    pub fn service_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.target_port())
    }
}

/// An externally supplied configuration value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
    #[serde(rename = "type", default = "default_input_type")]
    pub input_type: String,

    #[serde(default)]
    pub secret: bool,

    #[serde(default)]
    pub default: Option<InputDefault>,
}

fn default_input_type() -> String {
    "string".to_string()
}

impl Input {
    /// A secret input whose value is generated at generation time
    pub fn generated_secret(min_length: usize) -> Self {
        Self {
            input_type: default_input_type(),
            secret: true,
            default: Some(InputDefault {
                value: None,
                generate: Some(GenerateSpec { min_length }),
            }),
        }
    }
}

/// Default for an input: a literal value or a generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDefault {
    #[serde(default)]
    pub value: Option<String>,

    #[serde(default)]
    pub generate: Option<GenerateSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSpec {
    #[serde(default = "default_min_length")]
    pub min_length: usize,
}

fn default_min_length() -> usize {
    DEFAULT_GENERATED_LENGTH
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerResource {
    pub image: String,

    #[serde(default)]
    pub env: IndexMap<String, String>,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub bindings: IndexMap<String, Binding>,

    #[serde(default)]
    pub connection_string: Option<String>,

    #[serde(default)]
    pub inputs: IndexMap<String, Input>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResource {
    /// Path to the project file, relative to the manifest
    pub path: String,

    #[serde(default)]
    pub env: IndexMap<String, String>,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub bindings: IndexMap<String, Binding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerfileResource {
    /// Path to the Dockerfile, relative to the manifest
    pub path: String,

    /// Build context directory, relative to the manifest
    pub context: String,

    #[serde(default)]
    pub env: IndexMap<String, String>,

    #[serde(default)]
    pub build_args: IndexMap<String, String>,

    #[serde(default)]
    pub bindings: IndexMap<String, Binding>,
}

/// Whether a postgres entry is the server or a database hosted on one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostgresRole {
    #[default]
    Server,
    Database,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostgresResource {
    #[serde(skip)]
    pub role: PostgresRole,

    /// Owning server, for databases
    #[serde(default)]
    pub parent: Option<String>,

    #[serde(default)]
    pub inputs: IndexMap<String, Input>,
}

impl PostgresResource {
    /// Make sure a server carries a password input for its connection string
    pub fn with_default_password(mut self) -> Self {
        if self.role == PostgresRole::Server {
            self.inputs
                .entry(POSTGRES_PASSWORD_INPUT.to_string())
                .or_insert_with(|| Input::generated_secret(DEFAULT_GENERATED_LENGTH));
        }
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RabbitMqResource {
    #[serde(default)]
    pub inputs: IndexMap<String, Input>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedisResource {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueResource {
    #[serde(default)]
    pub connection_string: Option<String>,

    #[serde(default)]
    pub values: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterResource {
    pub value: String,

    #[serde(default)]
    pub inputs: IndexMap<String, Input>,
}

/// A manifest entry
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Container(ContainerResource),
    Project(ProjectResource),
    Dockerfile(DockerfileResource),
    Postgres(PostgresResource),
    RabbitMq(RabbitMqResource),
    Redis(RedisResource),
    Value(ValueResource),
    Parameter(ParameterResource),
}

impl Resource {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            Self::Container(_) => ResourceType::Container,
            Self::Project(_) => ResourceType::Project,
            Self::Dockerfile(_) => ResourceType::Dockerfile,
            Self::Postgres(pg) => match pg.role {
                PostgresRole::Server => ResourceType::PostgresServer,
                PostgresRole::Database => ResourceType::PostgresDatabase,
            },
            Self::RabbitMq(_) => ResourceType::RabbitMq,
            Self::Redis(_) => ResourceType::Redis,
            Self::Value(_) => ResourceType::Value,
            Self::Parameter(_) => ResourceType::Parameter,
        }
    }

    /// Environment variables declared on the resource
    pub fn env(&self) -> Option<&IndexMap<String, String>> {
        match self {
            Self::Container(c) => Some(&c.env),
            Self::Project(p) => Some(&p.env),
            Self::Dockerfile(d) => Some(&d.env),
            _ => None,
        }
    }

    pub fn bindings(&self) -> Option<&IndexMap<String, Binding>> {
        match self {
            Self::Container(c) => Some(&c.bindings),
            Self::Project(p) => Some(&p.bindings),
            Self::Dockerfile(d) => Some(&d.bindings),
            _ => None,
        }
    }

    pub fn inputs(&self) -> Option<&IndexMap<String, Input>> {
        match self {
            Self::Container(c) => Some(&c.inputs),
            Self::Postgres(pg) => Some(&pg.inputs),
            Self::RabbitMq(r) => Some(&r.inputs),
            Self::Parameter(p) => Some(&p.inputs),
            _ => None,
        }
    }

    /// Unresolved connection string for the resource named `name`
    ///
    /// The result may contain `{resource.path}` expressions.
    pub fn connection_string_template(&self, name: &str) -> Option<String> {
        match self {
            Self::Container(c) => c.connection_string.clone(),
            Self::Value(v) => v.connection_string.clone(),
            Self::Parameter(p) => Some(p.value.clone()),
            Self::Redis(_) => Some(format!("{}:6379", name)),
            Self::RabbitMq(_) => Some(format!("amqp://guest:guest@{}:5672", name)),
            Self::Postgres(pg) => match (pg.role, &pg.parent) {
                (PostgresRole::Server, _) => Some(format!(
                    "Host={name};Port=5432;Username=postgres;Password={{{name}.inputs.{POSTGRES_PASSWORD_INPUT}}}"
                )),
                (PostgresRole::Database, Some(parent)) => {
                    Some(format!("{{{parent}.connectionString}};Database={name}"))
                }
                (PostgresRole::Database, None) => None,
            },
            Self::Project(_) | Self::Dockerfile(_) => None,
        }
    }
}

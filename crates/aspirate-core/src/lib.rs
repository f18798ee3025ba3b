//! Aspirate Core - Core types for turning Aspire manifests into deployments
//!
//! This crate provides the foundational types used throughout Aspirate:
//! - `Resource`: A typed manifest entry (container, project, database, ...)
//! - `Manifest`: Raw manifest loading
//! - `InputValues`: Resolved (and generated) input values
//! - `ExpressionResolver`: `{resource.path}` expression resolution
//! - `GenerationContext`: Shared state for one generation run

pub mod context;
pub mod error;
pub mod expressions;
pub mod inputs;
pub mod manifest;
pub mod resource;

pub use context::{ContainerSettings, GenerationContext, ResolvedEnv};
pub use error::{CoreError, Result};
pub use expressions::{ExpressionResolver, ResolvedValue};
pub use inputs::{InputValue, InputValues};
pub use manifest::{Manifest, RawResource, SkippedEntry};
pub use resource::{
    Binding, ContainerResource, DockerfileResource, GenerateSpec, Input, InputDefault,
    ParameterResource, PostgresResource, PostgresRole, ProjectResource, RabbitMqResource,
    RedisResource, Resource, ResourceType, Resources, ValueResource,
};

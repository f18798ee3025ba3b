//! Resource handlers and the registry dispatching to them
//!
//! A handler owns one manifest type tag. It turns the raw JSON body into a
//! typed [`Resource`] and emits the Kubernetes objects for that resource.
//! Type tags without a handler are skipped with a warning so manifests
//! written by newer tooling still generate what this build understands.

mod container;
mod dockerfile;
mod postgres;
mod project;
mod rabbitmq;
mod redis;
mod value;

pub use container::ContainerHandler;
pub use dockerfile::DockerfileHandler;
pub use postgres::{PostgresDatabaseHandler, PostgresServerHandler};
pub use project::ProjectHandler;
pub use rabbitmq::RabbitMqHandler;
pub use redis::RedisHandler;
pub use value::{ParameterHandler, ValueHandler};

use aspirate_core::{
    GenerationContext, Manifest, RawResource, Resource, ResourceType, Resources, SkippedEntry,
};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{KubeError, Result};
use crate::kustomize::Kustomization;
use crate::objects::KubeObject;

/// Per-type manifest handling
pub trait ResourceHandler: Send + Sync {
    /// Tag this handler is registered under
    fn resource_type(&self) -> ResourceType;

    /// Parse the raw manifest body
    fn deserialize(&self, raw: &RawResource) -> Result<Resource>;

    /// Kubernetes objects for one resource
    fn create_objects(
        &self,
        name: &str,
        resource: &Resource,
        ctx: &GenerationContext,
    ) -> Result<Vec<KubeObject>>;

    /// Whether resources of this type get a directory in the kustomize output
    fn emits_objects(&self) -> bool {
        true
    }
}

/// Parse a raw body into a typed struct, naming the resource on failure
pub(crate) fn parse_body<T: DeserializeOwned>(raw: &RawResource) -> Result<T> {
    serde_json::from_value(raw.body.clone()).map_err(|e| KubeError::InvalidResource {
        name: raw.name.clone(),
        message: e.to_string(),
    })
}

/// Resolve expressions in container args
pub(crate) fn resolve_args(ctx: &GenerationContext, args: &[String]) -> Result<Vec<String>> {
    let resolver = ctx.resolver();
    let mut resolved = Vec::with_capacity(args.len());
    for arg in args {
        resolved.push(resolver.resolve(arg)?.value);
    }
    Ok(resolved)
}

pub(crate) fn mismatch(name: &str, expected: ResourceType, actual: &Resource) -> KubeError {
    KubeError::HandlerMismatch {
        name: name.to_string(),
        expected: expected.to_string(),
        actual: actual.resource_type().to_string(),
    }
}

/// Resources that loaded, plus the manifest entries that were skipped
#[derive(Debug, Clone, Default)]
pub struct LoadedResources {
    pub resources: Resources,
    pub skipped: Vec<SkippedEntry>,
}

/// Maps type tags to handlers
pub struct HandlerRegistry {
    handlers: IndexMap<ResourceType, Box<dyn ResourceHandler>>,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl HandlerRegistry {
    /// A registry without any handler
    pub fn new() -> Self {
        Self {
            handlers: IndexMap::new(),
        }
    }

    /// A registry with a handler for every known type tag
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ContainerHandler));
        registry.register(Box::new(ProjectHandler));
        registry.register(Box::new(DockerfileHandler));
        registry.register(Box::new(PostgresServerHandler));
        registry.register(Box::new(PostgresDatabaseHandler));
        registry.register(Box::new(RabbitMqHandler));
        registry.register(Box::new(RedisHandler));
        registry.register(Box::new(ValueHandler));
        registry.register(Box::new(ParameterHandler));
        registry
    }

    /// Register a handler, replacing any previous one for its tag
    pub fn register(&mut self, handler: Box<dyn ResourceHandler>) {
        self.handlers.insert(handler.resource_type(), handler);
    }

    /// Handler for a manifest type tag
    pub fn handler(&self, tag: &str) -> Result<&dyn ResourceHandler> {
        let not_found = |suggestion: Option<&str>| KubeError::HandlerNotFound {
            tag: tag.to_string(),
            suggestion: suggestion.map(str::to_string),
        };

        let resource_type: ResourceType = tag
            .parse()
            .map_err(|_| not_found(ResourceType::suggest(tag)))?;

        self.handlers
            .get(&resource_type)
            .map(|h| h.as_ref())
            .ok_or_else(|| not_found(None))
    }

    /// Deserialize one raw entry with the handler for its tag
    pub fn dispatch(&self, raw: &RawResource) -> Result<Resource> {
        self.handler(&raw.type_tag)?.deserialize(raw)
    }

    /// Deserialize every manifest entry, skipping unknown type tags
    ///
    /// Malformed bodies of known types are fatal.
    pub fn load(&self, manifest: &Manifest) -> Result<LoadedResources> {
        let mut loaded = LoadedResources {
            resources: Resources::new(),
            skipped: manifest.skipped.clone(),
        };

        for raw in &manifest.entries {
            match self.dispatch(raw) {
                Ok(resource) => {
                    debug!(name = %raw.name, tag = %raw.type_tag, "loaded resource");
                    loaded.resources.insert(raw.name.clone(), resource);
                }
                Err(e) if e.is_unknown_type() => {
                    warn!(name = %raw.name, "skipping resource: {}", e);
                    loaded.skipped.push(SkippedEntry {
                        name: raw.name.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(loaded)
    }

    /// Objects for one loaded resource
    pub fn create_objects(
        &self,
        name: &str,
        resource: &Resource,
        ctx: &GenerationContext,
    ) -> Result<Vec<KubeObject>> {
        let tag = resource.resource_type();
        let objects = self
            .handler(tag.as_str())?
            .create_objects(name, resource, ctx)?;
        debug!(name, %tag, count = objects.len(), "created objects");
        Ok(objects)
    }

    /// Objects for every resource in the context, keyed by resource name
    ///
    /// Resources that emit nothing are left out.
    pub fn create_all_objects(
        &self,
        ctx: &GenerationContext,
    ) -> Result<IndexMap<String, Vec<KubeObject>>> {
        let mut all = IndexMap::new();
        for (name, resource) in &ctx.resources {
            let objects = self.create_objects(name, resource, ctx)?;
            if !objects.is_empty() {
                all.insert(name.clone(), objects);
            }
        }
        Ok(all)
    }

    /// Root kustomization listing the directory of every object-emitting resource
    pub fn create_final_manifest(
        &self,
        resources: &Resources,
        namespace: Option<&str>,
    ) -> Kustomization {
        let directories = resources
            .iter()
            .filter(|(_, resource)| {
                self.handler(resource.resource_type().as_str())
                    .map(|h| h.emits_objects())
                    .unwrap_or(false)
            })
            .map(|(name, _)| name.clone())
            .collect();

        Kustomization::new(directories).with_namespace(namespace)
    }
}

//! Generation context shared by every resource handler

use indexmap::IndexMap;

use crate::error::Result;
use crate::expressions::ExpressionResolver;
use crate::inputs::InputValues;
use crate::resource::Resources;

/// How built images are named and pulled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSettings {
    /// Registry images are pushed to
    pub registry: Option<String>,

    /// Prefix placed between registry and image name
    pub repository_prefix: Option<String>,

    /// Tag for project images
    pub tag: String,

    /// `imagePullPolicy` for generated workloads
    pub image_pull_policy: String,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            registry: None,
            repository_prefix: None,
            tag: "latest".to_string(),
            image_pull_policy: "IfNotPresent".to_string(),
        }
    }
}

impl ContainerSettings {
    /// Repository (without tag) for an image built from the resource `name`
    pub fn repository_for(&self, name: &str) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(3);
        if let Some(registry) = non_empty(&self.registry) {
            parts.push(registry);
        }
        if let Some(prefix) = non_empty(&self.repository_prefix) {
            parts.push(prefix);
        }
        parts.push(name);
        parts.join("/")
    }

    /// Full image reference for a project built from the resource `name`
    pub fn image_for(&self, name: &str) -> String {
        format!("{}:{}", self.repository_for(name), self.tag)
    }

    /// Image reference for a dockerfile build of the resource `name`
    ///
    /// Dockerfile builds ignore the repository prefix and always tag `latest`.
    pub fn dockerfile_image_for(&self, name: &str) -> String {
        match non_empty(&self.registry) {
            Some(registry) => format!("{registry}/{name}:latest"),
            None => format!("{name}:latest"),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Env variables split by whether a secret input flowed into them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedEnv {
    pub config: IndexMap<String, String>,
    pub secrets: IndexMap<String, String>,
}

impl ResolvedEnv {
    pub fn is_empty(&self) -> bool {
        self.config.is_empty() && self.secrets.is_empty()
    }
}

/// Everything a handler needs besides its own resource
#[derive(Debug, Clone, Default)]
pub struct GenerationContext {
    pub resources: Resources,
    pub inputs: InputValues,
    pub container: ContainerSettings,

    /// Namespace written into generated objects
    pub namespace: Option<String>,

    /// Images produced by the build step, keyed by resource name
    pub built_images: IndexMap<String, String>,
}

impl GenerationContext {
    /// Build a context, resolving every input of `resources`
    pub fn new(resources: Resources, container: ContainerSettings) -> Self {
        let inputs = InputValues::resolve(&resources);
        Self {
            resources,
            inputs,
            container,
            namespace: None,
            built_images: IndexMap::new(),
        }
    }

    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace.filter(|ns| !ns.is_empty());
        self
    }

    pub fn resolver(&self) -> ExpressionResolver<'_> {
        ExpressionResolver::new(&self.resources, &self.inputs)
    }

    /// Image for a project resource, preferring what the build step produced
    pub fn image_for(&self, name: &str) -> String {
        self.built_images
            .get(name)
            .cloned()
            .unwrap_or_else(|| self.container.image_for(name))
    }

    /// Image for a dockerfile resource, preferring what the build step produced
    pub fn dockerfile_image_for(&self, name: &str) -> String {
        self.built_images
            .get(name)
            .cloned()
            .unwrap_or_else(|| self.container.dockerfile_image_for(name))
    }

    /// Resolve env expressions and split secret values from plain ones
    pub fn resolve_env(&self, env: &IndexMap<String, String>) -> Result<ResolvedEnv> {
        let resolver = self.resolver();
        let mut resolved = ResolvedEnv::default();

        for (key, raw) in env {
            let value = resolver.resolve(raw)?;
            if value.secret {
                resolved.secrets.insert(key.clone(), value.value);
            } else {
                resolved.config.insert(key.clone(), value.value);
            }
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{PostgresResource, PostgresRole, RedisResource, Resource};

    #[test]
    fn test_image_naming() {
        let mut settings = ContainerSettings::default();
        assert_eq!(settings.image_for("api"), "api:latest");

        settings.registry = Some("ghcr.io".to_string());
        settings.repository_prefix = Some("acme".to_string());
        settings.tag = "1.2.0".to_string();
        assert_eq!(settings.image_for("api"), "ghcr.io/acme/api:1.2.0");

        assert_eq!(settings.dockerfile_image_for("web"), "ghcr.io/web:latest");

        settings.repository_prefix = Some(String::new());
        assert_eq!(settings.repository_for("api"), "ghcr.io/api");

        settings.registry = None;
        assert_eq!(settings.dockerfile_image_for("web"), "web:latest");
    }

    #[test]
    fn test_built_image_overrides_computed_name() {
        let mut ctx = GenerationContext::default();
        ctx.built_images
            .insert("api".to_string(), "registry.local/api@sha256:abc".to_string());

        assert_eq!(ctx.image_for("api"), "registry.local/api@sha256:abc");
        assert_eq!(ctx.image_for("web"), "web:latest");
    }

    #[test]
    fn test_resolve_env_splits_secrets() {
        let mut resources = Resources::new();
        resources.insert("cache".to_string(), Resource::Redis(RedisResource {}));
        resources.insert(
            "pg".to_string(),
            Resource::Postgres(
                PostgresResource {
                    role: PostgresRole::Server,
                    parent: None,
                    inputs: IndexMap::new(),
                }
                .with_default_password(),
            ),
        );

        let ctx = GenerationContext::new(resources, ContainerSettings::default())
            .with_namespace(Some(String::new()));
        assert_eq!(ctx.namespace, None);

        let mut env = IndexMap::new();
        env.insert("ConnectionStrings__cache".to_string(), "{cache.connectionString}".to_string());
        env.insert("ConnectionStrings__pg".to_string(), "{pg.connectionString}".to_string());
        env.insert("LOG_LEVEL".to_string(), "info".to_string());

        let resolved = ctx.resolve_env(&env).unwrap();
        assert_eq!(resolved.config["ConnectionStrings__cache"], "cache:6379");
        assert_eq!(resolved.config["LOG_LEVEL"], "info");
        assert!(resolved.secrets["ConnectionStrings__pg"].starts_with("Host=pg;"));
        assert!(!resolved.config.contains_key("ConnectionStrings__pg"));
    }
}

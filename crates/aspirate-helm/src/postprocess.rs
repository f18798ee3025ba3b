//! Rewrites generated objects into Helm templates
//!
//! Namespaces are stripped from every object (Helm sets the release
//! namespace). ConfigMap data and workload images move into the values tree
//! and are replaced by template references to it. Secrets and Services pass
//! through unchanged.

use aspirate_kube::KubeObject;
use k8s_openapi::api::core::v1::Container;
use tracing::debug;

use crate::error::{HelmError, Result};
use crate::naming::kebab_to_camel;
use crate::values::{ChartValues, GLOBAL_KEY, ImageValues, ValuesTree};

pub const DEFAULT_TAG: &str = "latest";

/// An image string split into repository and tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub repository: String,
    pub tag: String,
}

impl ImageReference {
    /// Split on the tag separator
    ///
    /// A `:` inside the registry part (`host:5000/app`) is not a tag
    /// separator. A missing tag means `latest`.
    pub fn parse(image: &str) -> std::result::Result<Self, String> {
        let image = image.trim();
        if image.is_empty() {
            return Err("image is empty".to_string());
        }

        let (repository, tag) = match image.rsplit_once(':') {
            Some((repository, tag)) if !tag.contains('/') => (repository, tag),
            _ => (image, DEFAULT_TAG),
        };

        if repository.is_empty() {
            return Err("image has no repository".to_string());
        }
        if tag.is_empty() {
            return Err("image has an empty tag".to_string());
        }

        Ok(Self {
            repository: repository.to_string(),
            tag: tag.to_string(),
        })
    }

    /// `Always` for `latest`, `IfNotPresent` for anything pinned
    pub fn pull_policy(&self) -> &'static str {
        if self.tag == DEFAULT_TAG {
            "Always"
        } else {
            "IfNotPresent"
        }
    }
}

/// Template reference for a ConfigMap entry, falling back to the global value
pub fn env_placeholder(resource: &str, key: &str) -> String {
    format!("{{{{ .Values.{resource}.env.{key} | default .Values.global.env.{key} }}}}")
}

pub fn image_placeholder(resource: &str) -> String {
    format!("{{{{ .Values.{resource}.image.repository }}}}:{{{{ .Values.{resource}.image.tag }}}}")
}

pub fn pull_policy_placeholder(resource: &str) -> String {
    format!("{{{{ .Values.{resource}.image.pullPolicy }}}}")
}

/// Processes objects one at a time, owning the values tree until [`finish`]
///
/// [`finish`]: PostProcessor::finish
#[derive(Debug, Default)]
pub struct PostProcessor {
    values: ValuesTree,
}

impl PostProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite one object in place
    pub fn process(&mut self, object: &mut KubeObject) -> Result<()> {
        object.clear_namespace();
        let resource = object.name().to_string();
        let name = kebab_to_camel(&resource);
        if name == GLOBAL_KEY {
            return Err(HelmError::ReservedName {
                resource,
                key: GLOBAL_KEY.to_string(),
            });
        }

        if let KubeObject::ConfigMap(config_map) = object {
            if let Some(data) = config_map.data.as_mut() {
                for (key, value) in data.iter_mut() {
                    self.values.set_env(&name, key, value);
                    *value = env_placeholder(&name, key);
                }
            }
            self.values.remove_empty(&name);
        } else if let Some(containers) = object.containers_mut() {
            self.process_containers(&resource, &name, containers)?;
        }

        debug!(kind = object.kind(), name = %resource, "post-processed object");
        Ok(())
    }

    fn process_containers(
        &mut self,
        resource: &str,
        name: &str,
        containers: &mut [Container],
    ) -> Result<()> {
        for container in containers {
            let raw = container.image.as_deref().unwrap_or_default();
            let image = ImageReference::parse(raw).map_err(|message| HelmError::InvalidImage {
                resource: resource.to_string(),
                image: raw.to_string(),
                message,
            })?;

            self.values.set_image(
                name,
                ImageValues {
                    pull_policy: image.pull_policy().to_string(),
                    repository: image.repository,
                    tag: image.tag,
                },
            );
            container.image = Some(image_placeholder(name));
            container.image_pull_policy = Some(pull_policy_placeholder(name));
        }
        Ok(())
    }

    /// Deduplicate and freeze the collected values
    pub fn finish(self) -> ChartValues {
        self.values.deduplicate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: serde_json::Value) -> KubeObject {
        KubeObject::from_json(value).unwrap()
    }

    fn deployment(name: &str, image: &str) -> KubeObject {
        object(json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {"name": name, "namespace": "apps"},
            "spec": {
                "selector": {"matchLabels": {"app": name}},
                "template": {
                    "metadata": {"labels": {"app": name}},
                    "spec": {"containers": [{"name": name, "image": image}]}
                }
            }
        }))
    }

    #[test]
    fn test_image_parsing() {
        let plain = ImageReference::parse("repo").unwrap();
        assert_eq!(plain.repository, "repo");
        assert_eq!(plain.tag, "latest");
        assert_eq!(plain.pull_policy(), "Always");

        let pinned = ImageReference::parse("repo:v2").unwrap();
        assert_eq!(pinned.tag, "v2");
        assert_eq!(pinned.pull_policy(), "IfNotPresent");

        let registry = ImageReference::parse("registry.local:5000/team/api").unwrap();
        assert_eq!(registry.repository, "registry.local:5000/team/api");
        assert_eq!(registry.tag, "latest");

        let both = ImageReference::parse("registry.local:5000/team/api:1.4").unwrap();
        assert_eq!(both.repository, "registry.local:5000/team/api");
        assert_eq!(both.tag, "1.4");

        assert!(ImageReference::parse("").is_err());
        assert!(ImageReference::parse(":v1").is_err());
        assert!(ImageReference::parse("repo:").is_err());
    }

    #[test]
    fn test_only_last_colon_separates_tag() {
        let extra = ImageReference::parse("repo:v2:extra").unwrap();
        assert_eq!(extra.repository, "repo:v2");
        assert_eq!(extra.tag, "extra");

        let port_only = ImageReference::parse("localhost:5000/api").unwrap();
        assert_eq!(port_only.repository, "localhost:5000/api");
        assert_eq!(port_only.tag, "latest");
    }

    #[test]
    fn test_global_resource_name_is_rejected() {
        let mut config_map = object(json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": {"name": "global"},
            "data": {"FOO": "local"}
        }));

        let mut processor = PostProcessor::new();
        let err = processor.process(&mut config_map).unwrap_err();
        assert!(matches!(err, HelmError::ReservedName { ref resource, ref key }
            if resource == "global" && key == "global"));
        assert!(processor.values.get("global").is_none());

        let mut app = deployment("global", "myimage");
        assert!(matches!(
            processor.process(&mut app),
            Err(HelmError::ReservedName { .. })
        ));
    }

    #[test]
    fn test_config_map_is_templated() {
        let mut config_map = object(json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": {"name": "my-config", "namespace": "apps"},
            "data": {"FOO": "bar"}
        }));

        let mut processor = PostProcessor::new();
        processor.process(&mut config_map).unwrap();

        assert!(config_map.metadata().namespace.is_none());
        let KubeObject::ConfigMap(cm) = &config_map else {
            panic!("expected configmap");
        };
        assert_eq!(
            cm.data.as_ref().unwrap()["FOO"],
            "{{ .Values.myConfig.env.FOO | default .Values.global.env.FOO }}"
        );
        assert_eq!(processor.values.get("myConfig").unwrap().env["FOO"], "bar");
    }

    #[test]
    fn test_empty_config_map_leaves_no_section() {
        let mut config_map = object(json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": {"name": "empty"}
        }));

        let mut processor = PostProcessor::new();
        processor.process(&mut config_map).unwrap();
        assert!(processor.values.get("empty").is_none());
        assert!(processor.finish().resources.is_empty());
    }

    #[test]
    fn test_workload_image_is_templated() {
        let mut app = deployment("my-app", "myimage");
        let mut processor = PostProcessor::new();
        processor.process(&mut app).unwrap();

        assert!(app.metadata().namespace.is_none());
        let container = &app.containers_mut().unwrap()[0];
        assert_eq!(
            container.image.as_deref(),
            Some("{{ .Values.myApp.image.repository }}:{{ .Values.myApp.image.tag }}")
        );
        assert_eq!(
            container.image_pull_policy.as_deref(),
            Some("{{ .Values.myApp.image.pullPolicy }}")
        );

        let values = processor.finish();
        let image = values.resources["myApp"].image.as_ref().unwrap();
        assert_eq!(image.repository, "myimage");
        assert_eq!(image.tag, "latest");
        assert_eq!(image.pull_policy, "Always");
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let mut app = deployment("my-app", "");
        let err = PostProcessor::new().process(&mut app).unwrap_err();
        assert!(matches!(err, HelmError::InvalidImage { ref resource, .. } if resource == "my-app"));
    }

    #[test]
    fn test_secret_and_service_pass_through() {
        let mut secret = object(json!({
            "apiVersion": "v1",
            "kind": "Secret",
            "metadata": {"name": "pg", "namespace": "apps"},
            "stringData": {"POSTGRES_PASSWORD": "hunter2"}
        }));
        let before = secret.clone();

        let mut processor = PostProcessor::new();
        processor.process(&mut secret).unwrap();

        let mut expected = before;
        expected.clear_namespace();
        assert_eq!(secret, expected);
        assert!(processor.values.get("pg").is_none());
    }
}

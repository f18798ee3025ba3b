//! The closed set of Kubernetes objects Aspirate generates

use k8s_openapi::Resource as _;
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{ConfigMap, Container, Secret, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde_json::Value as JsonValue;

use crate::error::{KubeError, Result};

/// A generated Kubernetes object
///
/// Identity is the `(name, kind)` pair, which also names the object's file.
#[derive(Debug, Clone, PartialEq)]
pub enum KubeObject {
    ConfigMap(ConfigMap),
    Secret(Secret),
    Deployment(Deployment),
    StatefulSet(StatefulSet),
    Service(Service),
}

impl KubeObject {
    /// Build an object from its JSON shape, dispatching on `kind`
    pub fn from_json(value: JsonValue) -> Result<Self> {
        let kind = value
            .get("kind")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string();

        let object = match kind.as_str() {
            k if k == ConfigMap::KIND => KubeObject::ConfigMap(serde_json::from_value(value)?),
            k if k == Secret::KIND => KubeObject::Secret(serde_json::from_value(value)?),
            k if k == Deployment::KIND => KubeObject::Deployment(serde_json::from_value(value)?),
            k if k == StatefulSet::KIND => KubeObject::StatefulSet(serde_json::from_value(value)?),
            k if k == Service::KIND => KubeObject::Service(serde_json::from_value(value)?),
            _ => return Err(KubeError::UnsupportedKind(kind)),
        };

        Ok(object)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigMap(_) => ConfigMap::KIND,
            Self::Secret(_) => Secret::KIND,
            Self::Deployment(_) => Deployment::KIND,
            Self::StatefulSet(_) => StatefulSet::KIND,
            Self::Service(_) => Service::KIND,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::ConfigMap(o) => &o.metadata,
            Self::Secret(o) => &o.metadata,
            Self::Deployment(o) => &o.metadata,
            Self::StatefulSet(o) => &o.metadata,
            Self::Service(o) => &o.metadata,
        }
    }

    pub fn metadata_mut(&mut self) -> &mut ObjectMeta {
        match self {
            Self::ConfigMap(o) => &mut o.metadata,
            Self::Secret(o) => &mut o.metadata,
            Self::Deployment(o) => &mut o.metadata,
            Self::StatefulSet(o) => &mut o.metadata,
            Self::Service(o) => &mut o.metadata,
        }
    }

    pub fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    pub fn clear_namespace(&mut self) {
        self.metadata_mut().namespace = None;
    }

    /// Containers of the pod template, for workloads
    pub fn containers_mut(&mut self) -> Option<&mut Vec<Container>> {
        let pod_spec = match self {
            Self::Deployment(d) => d.spec.as_mut()?.template.spec.as_mut(),
            Self::StatefulSet(s) => s.spec.as_mut()?.template.spec.as_mut(),
            _ => None,
        }?;
        Some(&mut pod_spec.containers)
    }

    /// `<name>-<kind>`, both lowercased
    pub fn file_stem(&self) -> String {
        format!("{}-{}", self.name().to_lowercase(), self.kind().to_lowercase())
    }

    pub fn to_yaml(&self) -> Result<String> {
        let yaml = match self {
            Self::ConfigMap(o) => serde_yaml::to_string(o)?,
            Self::Secret(o) => serde_yaml::to_string(o)?,
            Self::Deployment(o) => serde_yaml::to_string(o)?,
            Self::StatefulSet(o) => serde_yaml::to_string(o)?,
            Self::Service(o) => serde_yaml::to_string(o)?,
        };
        Ok(yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config_map() -> KubeObject {
        KubeObject::from_json(json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": {"name": "My-Config", "namespace": "apps"},
            "data": {"FOO": "bar"}
        }))
        .unwrap()
    }

    #[test]
    fn test_identity_and_file_stem() {
        let object = config_map();
        assert_eq!(object.kind(), "ConfigMap");
        assert_eq!(object.name(), "My-Config");
        assert_eq!(object.file_stem(), "my-config-configmap");
    }

    #[test]
    fn test_clear_namespace() {
        let mut object = config_map();
        assert_eq!(object.metadata().namespace.as_deref(), Some("apps"));
        object.clear_namespace();
        assert!(object.metadata().namespace.is_none());
        assert!(!object.to_yaml().unwrap().contains("namespace"));
    }

    #[test]
    fn test_unsupported_kind() {
        let err = KubeObject::from_json(json!({
            "apiVersion": "batch/v1",
            "kind": "Job",
            "metadata": {"name": "migrate"}
        }))
        .unwrap_err();
        assert!(matches!(err, KubeError::UnsupportedKind(kind) if kind == "Job"));
    }

    #[test]
    fn test_containers_mut_only_for_workloads() {
        let mut deployment = KubeObject::from_json(json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {"name": "web"},
            "spec": {
                "selector": {"matchLabels": {"app": "web"}},
                "template": {
                    "metadata": {"labels": {"app": "web"}},
                    "spec": {"containers": [{"name": "web", "image": "nginx"}]}
                }
            }
        }))
        .unwrap();

        assert_eq!(deployment.containers_mut().unwrap().len(), 1);
        assert!(config_map().containers_mut().is_none());

        let yaml = deployment.to_yaml().unwrap();
        assert!(yaml.contains("apiVersion: apps/v1"));
        assert!(yaml.contains("kind: Deployment"));
    }
}

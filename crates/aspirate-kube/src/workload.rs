//! Workload synthesis
//!
//! Every object-emitting handler describes its workload as a [`WorkloadSpec`]
//! and lets this module produce the ConfigMap, Secret, workload and Service.

use aspirate_core::{Binding, GenerationContext, ResolvedEnv};
use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue, json};

use crate::error::Result;
use crate::objects::KubeObject;

/// Label every generated object carries
pub const APP_LABEL: &str = "app";

/// Controller used to run the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
}

/// One exposed port, as seen by both the container and the Service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSpec {
    pub name: String,
    pub port: u16,
    pub target_port: u16,
}

impl PortSpec {
    pub fn new(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            port,
            target_port: port,
        }
    }

    /// One port per binding, in binding order
    pub fn from_bindings(bindings: &IndexMap<String, Binding>) -> Vec<Self> {
        bindings
            .iter()
            .map(|(name, binding)| Self {
                name: name.clone(),
                port: binding.service_port(),
                target_port: binding.target_port(),
            })
            .collect()
    }
}

/// Everything needed to emit the objects of one resource
#[derive(Debug, Clone)]
pub struct WorkloadSpec {
    pub name: String,
    pub image: String,
    pub kind: WorkloadKind,
    pub ports: Vec<PortSpec>,
    pub args: Vec<String>,
    pub env: ResolvedEnv,
    pub image_pull_policy: String,
    pub namespace: Option<String>,
}

impl WorkloadSpec {
    /// Start a spec, taking pull policy and namespace from the context
    pub fn new(
        name: impl Into<String>,
        image: impl Into<String>,
        kind: WorkloadKind,
        ctx: &GenerationContext,
    ) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            kind,
            ports: Vec::new(),
            args: Vec::new(),
            env: ResolvedEnv::default(),
            image_pull_policy: ctx.container.image_pull_policy.clone(),
            namespace: ctx.namespace.clone(),
        }
    }

    pub fn with_ports(mut self, ports: Vec<PortSpec>) -> Self {
        self.ports = ports;
        self
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_env(mut self, env: ResolvedEnv) -> Self {
        self.env = env;
        self
    }

    /// Emit ConfigMap, Secret, workload and Service, skipping empty ones
    ///
    /// Order is stable: ConfigMap, Secret, workload, Service.
    pub fn build(&self) -> Result<Vec<KubeObject>> {
        let mut objects = Vec::with_capacity(4);

        if !self.env.config.is_empty() {
            objects.push(KubeObject::from_json(json!({
                "apiVersion": "v1",
                "kind": "ConfigMap",
                "metadata": self.metadata(),
                "data": self.env.config,
            }))?);
        }

        if !self.env.secrets.is_empty() {
            objects.push(KubeObject::from_json(json!({
                "apiVersion": "v1",
                "kind": "Secret",
                "metadata": self.metadata(),
                "type": "Opaque",
                "stringData": self.env.secrets,
            }))?);
        }

        objects.push(KubeObject::from_json(self.workload())?);

        if !self.ports.is_empty() {
            objects.push(KubeObject::from_json(self.service())?);
        }

        Ok(objects)
    }

    fn labels(&self) -> JsonValue {
        json!({ APP_LABEL: self.name })
    }

    fn metadata(&self) -> JsonValue {
        let mut metadata = Map::new();
        metadata.insert("name".into(), json!(self.name));
        if let Some(namespace) = &self.namespace {
            metadata.insert("namespace".into(), json!(namespace));
        }
        metadata.insert("labels".into(), self.labels());
        JsonValue::Object(metadata)
    }

    fn container(&self) -> JsonValue {
        let mut container = Map::new();
        container.insert("name".into(), json!(self.name));
        container.insert("image".into(), json!(self.image));
        container.insert("imagePullPolicy".into(), json!(self.image_pull_policy));

        if !self.args.is_empty() {
            container.insert("args".into(), json!(self.args));
        }

        if !self.ports.is_empty() {
            let ports: Vec<JsonValue> = self
                .ports
                .iter()
                .map(|p| json!({ "name": p.name, "containerPort": p.target_port, "protocol": "TCP" }))
                .collect();
            container.insert("ports".into(), JsonValue::Array(ports));
        }

        let mut env_from = Vec::new();
        if !self.env.config.is_empty() {
            env_from.push(json!({ "configMapRef": { "name": self.name } }));
        }
        if !self.env.secrets.is_empty() {
            env_from.push(json!({ "secretRef": { "name": self.name } }));
        }
        if !env_from.is_empty() {
            container.insert("envFrom".into(), JsonValue::Array(env_from));
        }

        JsonValue::Object(container)
    }

    fn workload(&self) -> JsonValue {
        let mut spec = Map::new();
        spec.insert("replicas".into(), json!(1));
        spec.insert("selector".into(), json!({ "matchLabels": self.labels() }));
        if self.kind == WorkloadKind::StatefulSet {
            spec.insert("serviceName".into(), json!(self.name));
        }
        spec.insert(
            "template".into(),
            json!({
                "metadata": { "labels": self.labels() },
                "spec": { "containers": [self.container()] },
            }),
        );

        let kind = match self.kind {
            WorkloadKind::Deployment => "Deployment",
            WorkloadKind::StatefulSet => "StatefulSet",
        };

        json!({
            "apiVersion": "apps/v1",
            "kind": kind,
            "metadata": self.metadata(),
            "spec": spec,
        })
    }

    fn service(&self) -> JsonValue {
        let ports: Vec<JsonValue> = self
            .ports
            .iter()
            .map(|p| {
                json!({
                    "name": p.name,
                    "port": p.port,
                    "targetPort": p.target_port,
                    "protocol": "TCP",
                })
            })
            .collect();

        json!({
            "apiVersion": "v1",
            "kind": "Service",
            "metadata": self.metadata(),
            "spec": {
                "type": "ClusterIP",
                "selector": self.labels(),
                "ports": ports,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

    fn env(config: &[(&str, &str)], secrets: &[(&str, &str)]) -> ResolvedEnv {
        ResolvedEnv {
            config: config.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            secrets: secrets.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    #[test]
    fn test_full_workload() {
        let ctx = GenerationContext::default().with_namespace(Some("apps".to_string()));
        let objects = WorkloadSpec::new("api", "api:latest", WorkloadKind::Deployment, &ctx)
            .with_ports(vec![PortSpec::new("http", 8080)])
            .with_args(vec!["--verbose".to_string()])
            .with_env(env(&[("LOG_LEVEL", "info")], &[("PASSWORD", "hunter2")]))
            .build()
            .unwrap();

        let kinds: Vec<_> = objects.iter().map(KubeObject::kind).collect();
        assert_eq!(kinds, ["ConfigMap", "Secret", "Deployment", "Service"]);
        assert!(objects.iter().all(|o| o.name() == "api"));
        assert!(
            objects
                .iter()
                .all(|o| o.metadata().namespace.as_deref() == Some("apps"))
        );

        let KubeObject::Deployment(deployment) = &objects[2] else {
            panic!("expected deployment");
        };
        let pod = deployment.spec.as_ref().unwrap().template.spec.as_ref().unwrap();
        let container = &pod.containers[0];
        assert_eq!(container.image.as_deref(), Some("api:latest"));
        assert_eq!(container.image_pull_policy.as_deref(), Some("IfNotPresent"));
        assert_eq!(container.args.as_ref().unwrap(), &["--verbose".to_string()]);
        let env_from = container.env_from.as_ref().unwrap();
        assert_eq!(env_from.len(), 2);
        assert!(env_from[0].config_map_ref.is_some());
        assert!(env_from[1].secret_ref.is_some());

        let KubeObject::Service(service) = &objects[3] else {
            panic!("expected service");
        };
        let port = &service.spec.as_ref().unwrap().ports.as_ref().unwrap()[0];
        assert_eq!(port.port, 8080);
        assert_eq!(port.target_port, Some(IntOrString::Int(8080)));

        let KubeObject::Secret(secret) = &objects[1] else {
            panic!("expected secret");
        };
        assert_eq!(secret.type_.as_deref(), Some("Opaque"));
        assert_eq!(secret.string_data.as_ref().unwrap()["PASSWORD"], "hunter2");
    }

    #[test]
    fn test_minimal_workload_has_no_optional_objects() {
        let ctx = GenerationContext::default();
        let objects = WorkloadSpec::new("worker", "worker:1.0", WorkloadKind::StatefulSet, &ctx)
            .build()
            .unwrap();

        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].kind(), "StatefulSet");
        assert!(objects[0].metadata().namespace.is_none());

        let yaml = objects[0].to_yaml().unwrap();
        assert!(yaml.contains("serviceName: worker"));
        assert!(!yaml.contains("envFrom"));
        assert!(!yaml.contains("args"));
    }

    #[test]
    fn test_ports_from_bindings() {
        let bindings: IndexMap<String, Binding> = serde_json::from_str(
            r#"{
                "http": {"scheme": "http"},
                "https": {"scheme": "https"},
                "tcp": {"containerPort": 6379, "port": 16379}
            }"#,
        )
        .unwrap();

        let ports = PortSpec::from_bindings(&bindings);
        assert_eq!(ports[0], PortSpec::new("http", 8080));
        assert_eq!(ports[1], PortSpec::new("https", 8443));
        assert_eq!(
            ports[2],
            PortSpec {
                name: "tcp".to_string(),
                port: 16379,
                target_port: 6379
            }
        );
    }
}

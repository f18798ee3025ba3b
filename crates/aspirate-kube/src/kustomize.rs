//! Kustomize output
//!
//! Layout:
//! ```text
//! <output>/
//!   kustomization.yaml          (root, lists resource directories)
//!   <resource>/
//!     kustomization.yaml        (lists the object files)
//!     <kind>.yaml
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::objects::KubeObject;

pub const KUSTOMIZATION_FILE: &str = "kustomization.yaml";
pub const KUSTOMIZE_API_VERSION: &str = "kustomize.config.k8s.io/v1beta1";

/// A `kustomization.yaml` document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kustomization {
    pub api_version: String,
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default)]
    pub resources: Vec<String>,
}

impl Kustomization {
    pub fn new(resources: Vec<String>) -> Self {
        Self {
            api_version: KUSTOMIZE_API_VERSION.to_string(),
            kind: "Kustomization".to_string(),
            namespace: None,
            resources,
        }
    }

    pub fn with_namespace(mut self, namespace: Option<&str>) -> Self {
        self.namespace = namespace.filter(|ns| !ns.is_empty()).map(str::to_string);
        self
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// File name of an object inside its resource directory
pub fn object_file_name(object: &KubeObject) -> String {
    format!("{}.yaml", object.kind().to_lowercase())
}

/// Write one resource's objects plus its kustomization into `<output>/<name>/`
///
/// Returns the written object files.
pub fn write_resource_manifests(
    output: &Path,
    name: &str,
    objects: &[KubeObject],
) -> Result<Vec<PathBuf>> {
    let dir = output.join(name);
    fs::create_dir_all(&dir)?;

    let mut files = Vec::with_capacity(objects.len());
    let mut written = Vec::with_capacity(objects.len());
    for object in objects {
        let file_name = object_file_name(object);
        let path = dir.join(&file_name);
        fs::write(&path, object.to_yaml()?)?;
        debug!(path = %path.display(), "wrote manifest");
        files.push(file_name);
        written.push(path);
    }

    fs::write(dir.join(KUSTOMIZATION_FILE), Kustomization::new(files).to_yaml()?)?;
    Ok(written)
}

/// Write the root `kustomization.yaml`
pub fn write_final_manifest(output: &Path, kustomization: &Kustomization) -> Result<PathBuf> {
    fs::create_dir_all(output)?;
    let path = output.join(KUSTOMIZATION_FILE);
    fs::write(&path, kustomization.to_yaml()?)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::{PortSpec, WorkloadKind, WorkloadSpec};
    use aspirate_core::GenerationContext;
    use tempfile::TempDir;

    #[test]
    fn test_write_resource_manifests() {
        let temp = TempDir::new().unwrap();
        let objects = WorkloadSpec::new(
            "cache",
            "redis:latest",
            WorkloadKind::Deployment,
            &GenerationContext::default(),
        )
        .with_ports(vec![PortSpec::new("redis", 6379)])
        .build()
        .unwrap();

        let written = write_resource_manifests(temp.path(), "cache", &objects).unwrap();
        assert_eq!(written.len(), 2);
        assert!(temp.path().join("cache/deployment.yaml").exists());
        assert!(temp.path().join("cache/service.yaml").exists());

        let kustomization: Kustomization = serde_yaml::from_str(
            &fs::read_to_string(temp.path().join("cache/kustomization.yaml")).unwrap(),
        )
        .unwrap();
        assert_eq!(kustomization.resources, ["deployment.yaml", "service.yaml"]);
        assert!(kustomization.namespace.is_none());
    }

    #[test]
    fn test_final_manifest() {
        let temp = TempDir::new().unwrap();
        let root = Kustomization::new(vec!["cache".to_string(), "api".to_string()])
            .with_namespace(Some("apps"));
        let path = write_final_manifest(temp.path(), &root).unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert_eq!(
            content,
            "apiVersion: kustomize.config.k8s.io/v1beta1\n\
             kind: Kustomization\n\
             namespace: apps\n\
             resources:\n\
             - cache\n\
             - api\n"
        );

        let no_namespace = Kustomization::new(vec![]).with_namespace(Some(""));
        assert!(!no_namespace.to_yaml().unwrap().contains("namespace"));
    }
}

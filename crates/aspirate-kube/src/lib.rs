//! Aspirate Kube - Kubernetes objects for Aspire resources
//!
//! This crate provides:
//! - **Objects**: The closed set of generated Kubernetes objects
//! - **Handlers**: One handler per manifest type tag, behind a registry
//! - **Workloads**: ConfigMap/Secret/workload/Service synthesis shared by handlers
//! - **Kustomize**: Per-resource directories and the root `kustomization.yaml`
//! - **Dashboard**: Optional Aspire dashboard objects

pub mod dashboard;
pub mod error;
pub mod handlers;
pub mod kustomize;
pub mod objects;
pub mod workload;

pub use dashboard::{DASHBOARD_NAME, dashboard_objects};
pub use error::{KubeError, Result};
pub use handlers::{HandlerRegistry, LoadedResources, ResourceHandler};
pub use kustomize::{Kustomization, write_final_manifest, write_resource_manifests};
pub use objects::KubeObject;
pub use workload::{PortSpec, WorkloadKind, WorkloadSpec};

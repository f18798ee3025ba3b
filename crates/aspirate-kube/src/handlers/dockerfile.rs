//! `dockerfile.v0`: an image built from a Dockerfile

use aspirate_core::{GenerationContext, RawResource, Resource, ResourceType};

use super::{ResourceHandler, mismatch, parse_body};
use crate::error::Result;
use crate::objects::KubeObject;
use crate::workload::{PortSpec, WorkloadKind, WorkloadSpec};

pub struct DockerfileHandler;

impl ResourceHandler for DockerfileHandler {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Dockerfile
    }

    fn deserialize(&self, raw: &RawResource) -> Result<Resource> {
        Ok(Resource::Dockerfile(parse_body(raw)?))
    }

    fn create_objects(
        &self,
        name: &str,
        resource: &Resource,
        ctx: &GenerationContext,
    ) -> Result<Vec<KubeObject>> {
        let Resource::Dockerfile(dockerfile) = resource else {
            return Err(mismatch(name, self.resource_type(), resource));
        };

        WorkloadSpec::new(
            name,
            ctx.dockerfile_image_for(name),
            WorkloadKind::Deployment,
            ctx,
        )
        .with_ports(PortSpec::from_bindings(&dockerfile.bindings))
        .with_env(ctx.resolve_env(&dockerfile.env)?)
        .build()
    }
}

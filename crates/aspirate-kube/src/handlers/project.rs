//! `project.v0`: a .NET project published as a container image

use aspirate_core::{GenerationContext, RawResource, Resource, ResourceType};

use super::{ResourceHandler, mismatch, parse_body, resolve_args};
use crate::error::Result;
use crate::objects::KubeObject;
use crate::workload::{PortSpec, WorkloadKind, WorkloadSpec};

pub struct ProjectHandler;

impl ResourceHandler for ProjectHandler {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Project
    }

    fn deserialize(&self, raw: &RawResource) -> Result<Resource> {
        Ok(Resource::Project(parse_body(raw)?))
    }

    fn create_objects(
        &self,
        name: &str,
        resource: &Resource,
        ctx: &GenerationContext,
    ) -> Result<Vec<KubeObject>> {
        let Resource::Project(project) = resource else {
            return Err(mismatch(name, self.resource_type(), resource));
        };

        WorkloadSpec::new(name, ctx.image_for(name), WorkloadKind::Deployment, ctx)
            .with_ports(PortSpec::from_bindings(&project.bindings))
            .with_args(resolve_args(ctx, &project.args)?)
            .with_env(ctx.resolve_env(&project.env)?)
            .build()
    }
}

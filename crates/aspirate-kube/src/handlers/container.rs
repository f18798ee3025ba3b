//! `container.v0`: a prebuilt image

use aspirate_core::{GenerationContext, RawResource, Resource, ResourceType};

use super::{ResourceHandler, mismatch, parse_body, resolve_args};
use crate::error::Result;
use crate::objects::KubeObject;
use crate::workload::{PortSpec, WorkloadKind, WorkloadSpec};

pub struct ContainerHandler;

impl ResourceHandler for ContainerHandler {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Container
    }

    fn deserialize(&self, raw: &RawResource) -> Result<Resource> {
        Ok(Resource::Container(parse_body(raw)?))
    }

    fn create_objects(
        &self,
        name: &str,
        resource: &Resource,
        ctx: &GenerationContext,
    ) -> Result<Vec<KubeObject>> {
        let Resource::Container(container) = resource else {
            return Err(mismatch(name, self.resource_type(), resource));
        };

        WorkloadSpec::new(name, &container.image, WorkloadKind::Deployment, ctx)
            .with_ports(PortSpec::from_bindings(&container.bindings))
            .with_args(resolve_args(ctx, &container.args)?)
            .with_env(ctx.resolve_env(&container.env)?)
            .build()
    }
}

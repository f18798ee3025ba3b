//! `rabbitmq.server.v0`

use aspirate_core::{GenerationContext, RawResource, Resource, ResolvedEnv, ResourceType};
use indexmap::IndexMap;

use super::{ResourceHandler, mismatch, parse_body};
use crate::error::Result;
use crate::objects::KubeObject;
use crate::workload::{PortSpec, WorkloadKind, WorkloadSpec};

const RABBITMQ_IMAGE: &str = "rabbitmq:3-management";
const AMQP_PORT: u16 = 5672;
const MANAGEMENT_PORT: u16 = 15672;

pub struct RabbitMqHandler;

impl ResourceHandler for RabbitMqHandler {
    fn resource_type(&self) -> ResourceType {
        ResourceType::RabbitMq
    }

    fn deserialize(&self, raw: &RawResource) -> Result<Resource> {
        Ok(Resource::RabbitMq(parse_body(raw)?))
    }

    fn create_objects(
        &self,
        name: &str,
        resource: &Resource,
        ctx: &GenerationContext,
    ) -> Result<Vec<KubeObject>> {
        if !matches!(resource, Resource::RabbitMq(_)) {
            return Err(mismatch(name, self.resource_type(), resource));
        }

        let env = ResolvedEnv {
            config: IndexMap::from([
                ("RABBITMQ_DEFAULT_USER".to_string(), "guest".to_string()),
                ("RABBITMQ_DEFAULT_PASS".to_string(), "guest".to_string()),
            ]),
            secrets: IndexMap::new(),
        };

        WorkloadSpec::new(name, RABBITMQ_IMAGE, WorkloadKind::StatefulSet, ctx)
            .with_ports(vec![
                PortSpec::new("amqp", AMQP_PORT),
                PortSpec::new("management", MANAGEMENT_PORT),
            ])
            .with_env(env)
            .build()
    }
}

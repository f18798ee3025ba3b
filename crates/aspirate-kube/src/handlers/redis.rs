//! `redis.v0`

use aspirate_core::{GenerationContext, RawResource, Resource, ResourceType};

use super::{ResourceHandler, mismatch, parse_body};
use crate::error::Result;
use crate::objects::KubeObject;
use crate::workload::{PortSpec, WorkloadKind, WorkloadSpec};

const REDIS_IMAGE: &str = "redis:latest";
const REDIS_PORT: u16 = 6379;

pub struct RedisHandler;

impl ResourceHandler for RedisHandler {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Redis
    }

    fn deserialize(&self, raw: &RawResource) -> Result<Resource> {
        Ok(Resource::Redis(parse_body(raw)?))
    }

    fn create_objects(
        &self,
        name: &str,
        resource: &Resource,
        ctx: &GenerationContext,
    ) -> Result<Vec<KubeObject>> {
        if !matches!(resource, Resource::Redis(_)) {
            return Err(mismatch(name, self.resource_type(), resource));
        }

        WorkloadSpec::new(name, REDIS_IMAGE, WorkloadKind::Deployment, ctx)
            .with_ports(vec![PortSpec::new("redis", REDIS_PORT)])
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redis_objects() {
        let ctx = GenerationContext::default();
        let objects = RedisHandler
            .create_objects("cache", &Resource::Redis(Default::default()), &ctx)
            .unwrap();

        let kinds: Vec<_> = objects.iter().map(KubeObject::kind).collect();
        assert_eq!(kinds, ["Deployment", "Service"]);
        let yaml = objects[1].to_yaml().unwrap();
        assert!(yaml.contains("port: 6379"));
        assert!(objects[0].to_yaml().unwrap().contains("image: redis:latest"));
    }
}

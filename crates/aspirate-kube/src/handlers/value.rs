//! `value.v0` and `parameter.v0`
//!
//! Both only feed expressions of other resources.

use aspirate_core::{GenerationContext, RawResource, Resource, ResourceType};

use super::{ResourceHandler, mismatch, parse_body};
use crate::error::Result;
use crate::objects::KubeObject;

pub struct ValueHandler;

impl ResourceHandler for ValueHandler {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Value
    }

    fn deserialize(&self, raw: &RawResource) -> Result<Resource> {
        Ok(Resource::Value(parse_body(raw)?))
    }

    fn create_objects(
        &self,
        name: &str,
        resource: &Resource,
        _ctx: &GenerationContext,
    ) -> Result<Vec<KubeObject>> {
        match resource {
            Resource::Value(_) => Ok(Vec::new()),
            other => Err(mismatch(name, self.resource_type(), other)),
        }
    }

    fn emits_objects(&self) -> bool {
        false
    }
}

pub struct ParameterHandler;

impl ResourceHandler for ParameterHandler {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Parameter
    }

    fn deserialize(&self, raw: &RawResource) -> Result<Resource> {
        Ok(Resource::Parameter(parse_body(raw)?))
    }

    fn create_objects(
        &self,
        name: &str,
        resource: &Resource,
        _ctx: &GenerationContext,
    ) -> Result<Vec<KubeObject>> {
        match resource {
            Resource::Parameter(_) => Ok(Vec::new()),
            other => Err(mismatch(name, self.resource_type(), other)),
        }
    }

    fn emits_objects(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspirate_core::{ContainerSettings, Manifest, Resources};

    #[test]
    fn test_parameter_value_feeds_expressions() {
        let manifest = Manifest::from_json(
            r#"{"resources": {
                "apikey": {
                    "type": "parameter.v0",
                    "value": "{apikey.inputs.value}",
                    "inputs": {"value": {"type": "string", "secret": true, "default": {"value": "abc123"}}}
                },
                "urls": {"type": "value.v0", "connectionString": "https://example.com"}
            }}"#,
        )
        .unwrap();

        let mut resources = Resources::new();
        resources.insert(
            "apikey".to_string(),
            ParameterHandler.deserialize(&manifest.entries[0]).unwrap(),
        );
        resources.insert(
            "urls".to_string(),
            ValueHandler.deserialize(&manifest.entries[1]).unwrap(),
        );
        let ctx = GenerationContext::new(resources, ContainerSettings::default());

        let resolved = ctx.resolver().resolve("{apikey.value}").unwrap();
        assert_eq!(resolved.value, "abc123");
        assert!(resolved.secret);
        assert_eq!(
            ctx.resolver().resolve("{urls.connectionString}").unwrap().value,
            "https://example.com"
        );

        assert!(
            ParameterHandler
                .create_objects("apikey", &ctx.resources["apikey"], &ctx)
                .unwrap()
                .is_empty()
        );
        assert!(
            ValueHandler
                .create_objects("apikey", &ctx.resources["apikey"], &ctx)
                .is_err()
        );
    }
}

//! `postgres.server.v0` and `postgres.database.v0`
//!
//! Only the server runs anything. A database is a name on its parent server
//! and exists for its connection string.

use aspirate_core::resource::POSTGRES_PASSWORD_INPUT;
use aspirate_core::{
    GenerationContext, PostgresResource, PostgresRole, RawResource, Resource, ResolvedEnv,
    ResourceType,
};
use indexmap::IndexMap;

use super::{ResourceHandler, mismatch, parse_body};
use crate::error::{KubeError, Result};
use crate::objects::KubeObject;
use crate::workload::{PortSpec, WorkloadKind, WorkloadSpec};

const POSTGRES_IMAGE: &str = "postgres:latest";
const POSTGRES_PORT: u16 = 5432;
const POSTGRES_USER: &str = "postgres";

pub struct PostgresServerHandler;

impl ResourceHandler for PostgresServerHandler {
    fn resource_type(&self) -> ResourceType {
        ResourceType::PostgresServer
    }

    fn deserialize(&self, raw: &RawResource) -> Result<Resource> {
        let mut server: PostgresResource = parse_body(raw)?;
        server.role = PostgresRole::Server;
        Ok(Resource::Postgres(server.with_default_password()))
    }

    fn create_objects(
        &self,
        name: &str,
        resource: &Resource,
        ctx: &GenerationContext,
    ) -> Result<Vec<KubeObject>> {
        if resource.resource_type() != ResourceType::PostgresServer {
            return Err(mismatch(name, self.resource_type(), resource));
        }

        let password = ctx
            .inputs
            .get(name, POSTGRES_PASSWORD_INPUT)
            .map(|input| input.value.clone())
            .ok_or_else(|| KubeError::InvalidResource {
                name: name.to_string(),
                message: format!("no value for input '{POSTGRES_PASSWORD_INPUT}'"),
            })?;

        let env = ResolvedEnv {
            config: IndexMap::from([("POSTGRES_USER".to_string(), POSTGRES_USER.to_string())]),
            secrets: IndexMap::from([("POSTGRES_PASSWORD".to_string(), password)]),
        };

        WorkloadSpec::new(name, POSTGRES_IMAGE, WorkloadKind::StatefulSet, ctx)
            .with_ports(vec![PortSpec::new("postgres", POSTGRES_PORT)])
            .with_env(env)
            .build()
    }
}

pub struct PostgresDatabaseHandler;

impl ResourceHandler for PostgresDatabaseHandler {
    fn resource_type(&self) -> ResourceType {
        ResourceType::PostgresDatabase
    }

    fn deserialize(&self, raw: &RawResource) -> Result<Resource> {
        let mut database: PostgresResource = parse_body(raw)?;
        database.role = PostgresRole::Database;
        if database.parent.as_deref().is_none_or(str::is_empty) {
            return Err(KubeError::InvalidResource {
                name: raw.name.clone(),
                message: "a postgres database needs a 'parent' server".to_string(),
            });
        }
        Ok(Resource::Postgres(database))
    }

    fn create_objects(
        &self,
        name: &str,
        resource: &Resource,
        ctx: &GenerationContext,
    ) -> Result<Vec<KubeObject>> {
        let Resource::Postgres(PostgresResource {
            role: PostgresRole::Database,
            parent: Some(parent),
            ..
        }) = resource
        else {
            return Err(mismatch(name, self.resource_type(), resource));
        };

        if !ctx.resources.contains_key(parent) {
            return Err(KubeError::InvalidResource {
                name: name.to_string(),
                message: format!("parent server '{parent}' is not in the manifest"),
            });
        }

        Ok(Vec::new())
    }

    fn emits_objects(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspirate_core::{ContainerSettings, Manifest, Resources};

    fn load(json: &str) -> Resources {
        let manifest = Manifest::from_json(json).unwrap();
        let mut resources = Resources::new();
        for raw in &manifest.entries {
            let resource = match raw.type_tag.as_str() {
                "postgres.server.v0" => PostgresServerHandler.deserialize(raw).unwrap(),
                _ => PostgresDatabaseHandler.deserialize(raw).unwrap(),
            };
            resources.insert(raw.name.clone(), resource);
        }
        resources
    }

    #[test]
    fn test_server_objects_keep_password_secret() {
        let resources = load(
            r#"{"resources": {
                "pg": {"type": "postgres.server.v0"},
                "orders": {"type": "postgres.database.v0", "parent": "pg"}
            }}"#,
        );
        let ctx = GenerationContext::new(resources, ContainerSettings::default());
        let password = ctx.inputs.get("pg", "password").unwrap().value.clone();
        assert_eq!(password.len(), 22);

        let objects = PostgresServerHandler
            .create_objects("pg", &ctx.resources["pg"], &ctx)
            .unwrap();
        let kinds: Vec<_> = objects.iter().map(KubeObject::kind).collect();
        assert_eq!(kinds, ["ConfigMap", "Secret", "StatefulSet", "Service"]);

        let KubeObject::Secret(secret) = &objects[1] else {
            panic!("expected secret");
        };
        assert_eq!(secret.string_data.as_ref().unwrap()["POSTGRES_PASSWORD"], password);
        assert!(!objects[0].to_yaml().unwrap().contains(&password));

        let db_objects = PostgresDatabaseHandler
            .create_objects("orders", &ctx.resources["orders"], &ctx)
            .unwrap();
        assert!(db_objects.is_empty());
    }

    #[test]
    fn test_database_requires_parent() {
        let manifest = Manifest::from_json(
            r#"{"resources": {"orders": {"type": "postgres.database.v0"}}}"#,
        )
        .unwrap();
        let err = PostgresDatabaseHandler
            .deserialize(&manifest.entries[0])
            .unwrap_err();
        assert!(err.to_string().contains("needs a 'parent' server"));
    }

    #[test]
    fn test_database_parent_must_exist() {
        let resources = load(
            r#"{"resources": {"orders": {"type": "postgres.database.v0", "parent": "pg"}}}"#,
        );
        let ctx = GenerationContext::new(resources, ContainerSettings::default());
        let err = PostgresDatabaseHandler
            .create_objects("orders", &ctx.resources["orders"], &ctx)
            .unwrap_err();
        assert!(err.to_string().contains("parent server 'pg'"));
    }
}

//! Aspire dashboard objects

use aspirate_core::{GenerationContext, ResolvedEnv};
use indexmap::IndexMap;

use crate::error::Result;
use crate::objects::KubeObject;
use crate::workload::{PortSpec, WorkloadKind, WorkloadSpec};

pub const DASHBOARD_NAME: &str = "aspire-dashboard";
pub const DASHBOARD_IMAGE: &str = "mcr.microsoft.com/dotnet/aspire-dashboard:8.0";
pub const DASHBOARD_UI_PORT: u16 = 18888;
pub const DASHBOARD_OTLP_PORT: u16 = 18889;

/// Deployment, Service and ConfigMap running the dashboard
pub fn dashboard_objects(ctx: &GenerationContext) -> Result<Vec<KubeObject>> {
    let env = ResolvedEnv {
        config: IndexMap::from([(
            "DOTNET_DASHBOARD_UNSECURED_ALLOW_ANONYMOUS".to_string(),
            "true".to_string(),
        )]),
        secrets: IndexMap::new(),
    };

    WorkloadSpec::new(DASHBOARD_NAME, DASHBOARD_IMAGE, WorkloadKind::Deployment, ctx)
        .with_ports(vec![
            PortSpec::new("dashboard-ui", DASHBOARD_UI_PORT),
            PortSpec::new("otlp", DASHBOARD_OTLP_PORT),
        ])
        .with_env(env)
        .build()
}

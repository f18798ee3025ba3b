//! Generate command - Kubernetes manifests or a Helm chart from an Aspire manifest

use aspirate_core::GenerationContext;
use aspirate_helm::{ChartMetadata, HelmChartCreator};
use aspirate_kube::{
    DASHBOARD_NAME, HandlerRegistry, KubeObject, dashboard_objects, write_final_manifest,
    write_resource_manifests,
};
use clap::{Args, ValueEnum};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{ContainerArgs, ManifestArgs, build::build_images, load_manifest};
use crate::display;
use crate::error::Result;

/// Directory of the Helm chart inside the output path
pub const CHART_DIR: &str = "chart";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One directory per resource plus a root kustomization.yaml
    Kustomize,
    /// A Helm chart with a deduplicated values.yaml
    Helm,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    #[command(flatten)]
    pub container: ContainerArgs,

    /// Output directory
    #[arg(
        short = 'o',
        long,
        env = "ASPIRATE_OUTPUT_PATH",
        default_value = "./aspirate-output"
    )]
    pub output_path: PathBuf,

    /// Output format
    #[arg(long, value_enum, env = "ASPIRATE_OUTPUT_FORMAT", default_value = "kustomize")]
    pub output_format: OutputFormat,

    /// Do not build or push images
    #[arg(long)]
    pub skip_build: bool,

    /// Do not write the root kustomization.yaml
    #[arg(long)]
    pub skip_final: bool,

    /// Helm chart name
    #[arg(long, env = "ASPIRATE_CHART_NAME", default_value = "aspirate")]
    pub chart_name: String,

    /// Also deploy the Aspire dashboard
    #[arg(long)]
    pub include_dashboard: bool,

    /// Namespace for generated objects
    #[arg(short, long, env = "ASPIRATE_NAMESPACE")]
    pub namespace: Option<String>,

    /// imagePullPolicy of generated workloads
    #[arg(
        long,
        env = "ASPIRATE_IMAGE_PULL_POLICY",
        default_value = "IfNotPresent",
        value_parser = ["Always", "IfNotPresent", "Never"]
    )]
    pub image_pull_policy: String,
}

/// Run the generate command
pub async fn run(args: &GenerateArgs, non_interactive: bool) -> Result<()> {
    let registry = HandlerRegistry::with_defaults();
    let (manifest, loaded) = load_manifest(&args.manifest, &registry)?;

    let mut settings = args.container.settings();
    settings.image_pull_policy = args.image_pull_policy.clone();

    let built_images = if args.skip_build {
        IndexMap::new()
    } else {
        build_images(
            &manifest,
            &loaded.resources,
            &settings,
            &args.container,
            non_interactive,
        )
        .await?
        .images
    };

    let mut ctx =
        GenerationContext::new(loaded.resources, settings).with_namespace(args.namespace.clone());
    ctx.built_images = built_images;

    let mut objects = registry.create_all_objects(&ctx)?;
    if args.include_dashboard {
        objects.insert(DASHBOARD_NAME.to_string(), dashboard_objects(&ctx)?);
    }

    match args.output_format {
        OutputFormat::Kustomize => write_kustomize(args, &registry, &ctx, &objects),
        OutputFormat::Helm => write_chart(args, objects).await,
    }
}

fn write_kustomize(
    args: &GenerateArgs,
    registry: &HandlerRegistry,
    ctx: &GenerationContext,
    objects: &IndexMap<String, Vec<KubeObject>>,
) -> Result<()> {
    let output = args.output_path.as_path();
    for (name, resource_objects) in objects {
        write_resource_manifests(output, name, resource_objects)?;
    }

    let final_manifest = if args.skip_final {
        None
    } else {
        let mut kustomization =
            registry.create_final_manifest(&ctx.resources, ctx.namespace.as_deref());
        if args.include_dashboard {
            kustomization.resources.push(DASHBOARD_NAME.to_string());
        }
        Some(write_final_manifest(output, &kustomization)?)
    };

    let names: Vec<String> = objects.keys().cloned().collect();
    display::display_kustomize_output(output, &names, final_manifest.as_deref());
    info!(output = %output.display(), resources = names.len(), "generated kustomize manifests");
    Ok(())
}

async fn write_chart(args: &GenerateArgs, objects: IndexMap<String, Vec<KubeObject>>) -> Result<()> {
    let chart_path = chart_path(&args.output_path);
    let creator = HelmChartCreator::new(&chart_path, ChartMetadata::new(&args.chart_name));

    let output = creator
        .create(objects.into_values().flatten().collect())
        .await?;
    display::display_chart_output(&output);
    Ok(())
}

fn chart_path(output: &Path) -> PathBuf {
    output.join(CHART_DIR)
}

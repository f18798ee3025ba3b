//! Build command - build and push the images of project and dockerfile resources

use aspirate_build::{
    BuildOptions, BuildPlan, BuildReport, ContainerBuilder, TokioProcessExecutor,
};
use aspirate_core::{ContainerSettings, Manifest, Resources};
use aspirate_kube::HandlerRegistry;
use console::style;
use tracing::info;

use super::{ContainerArgs, ManifestArgs, load_manifest};
use crate::display;
use crate::error::Result;
use crate::prompt::ConsolePrompter;

/// Run the build command
pub async fn run(manifest_args: &ManifestArgs, container: &ContainerArgs, non_interactive: bool) -> Result<()> {
    let registry = HandlerRegistry::with_defaults();
    let (manifest, loaded) = load_manifest(manifest_args, &registry)?;

    build_images(
        &manifest,
        &loaded.resources,
        &container.settings(),
        container,
        non_interactive,
    )
    .await?;
    Ok(())
}

/// Build every image the resources need, stopping at the first abort
pub async fn build_images(
    manifest: &Manifest,
    resources: &Resources,
    settings: &ContainerSettings,
    container: &ContainerArgs,
    non_interactive: bool,
) -> Result<BuildReport> {
    let plan = BuildPlan::from_resources(resources, manifest, settings);
    if plan.is_empty() {
        println!("{} No images to build", style("→").blue());
        return Ok(BuildReport::default());
    }

    info!(targets = plan.targets().len(), "building images");
    let executor = TokioProcessExecutor::new();
    let prompter = ConsolePrompter::new();
    let options = BuildOptions {
        container_builder: container.container_builder.clone(),
        non_interactive,
        runtime_identifier: container.runtime_identifier.clone(),
    };
    let builder = ContainerBuilder::new(&executor, &prompter, options);

    let report = plan.run(&builder).await?;
    display::display_build_report(&report);
    Ok(report)
}

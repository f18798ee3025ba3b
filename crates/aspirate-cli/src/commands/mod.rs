//! CLI commands

pub mod build;
pub mod generate;

use aspirate_core::{ContainerSettings, Manifest};
use aspirate_kube::{HandlerRegistry, LoadedResources};
use clap::Args;
use console::style;
use std::path::PathBuf;

use crate::display;
use crate::error::Result;

/// Where the Aspire manifest is read from
#[derive(Args, Debug, Clone)]
pub struct ManifestArgs {
    /// Aspire manifest (`dotnet run --publisher manifest`)
    #[arg(
        short = 'm',
        long,
        env = "ASPIRATE_MANIFEST",
        default_value = "./manifest.json"
    )]
    pub aspire_manifest: PathBuf,
}

/// How images are built, named and pushed
#[derive(Args, Debug, Clone)]
pub struct ContainerArgs {
    /// Tool for dockerfile builds and registry logins
    #[arg(
        long,
        env = "ASPIRATE_CONTAINER_BUILDER",
        default_value = "docker",
        value_parser = ["docker", "podman"]
    )]
    pub container_builder: String,

    /// Registry images are pushed to
    #[arg(long, env = "ASPIRATE_CONTAINER_REGISTRY")]
    pub container_registry: Option<String>,

    /// Prefix between the registry and the image name
    #[arg(long, env = "ASPIRATE_CONTAINER_REPOSITORY_PREFIX")]
    pub container_repository_prefix: Option<String>,

    /// Tag for project images
    #[arg(long, env = "ASPIRATE_CONTAINER_IMAGE_TAG", default_value = "latest")]
    pub container_image_tag: String,

    /// Runtime identifier for project publishing, such as linux-arm64
    #[arg(long, env = "ASPIRATE_RUNTIME_IDENTIFIER")]
    pub runtime_identifier: Option<String>,
}

impl ContainerArgs {
    pub fn settings(&self) -> ContainerSettings {
        ContainerSettings {
            registry: self.container_registry.clone(),
            repository_prefix: self.container_repository_prefix.clone(),
            tag: self.container_image_tag.clone(),
            ..Default::default()
        }
    }
}

/// Load the manifest and deserialize every resource it declares
pub fn load_manifest(args: &ManifestArgs, registry: &HandlerRegistry) -> Result<(Manifest, LoadedResources)> {
    let manifest = Manifest::load(&args.aspire_manifest)?;
    let loaded = registry.load(&manifest)?;

    println!(
        "{} Loaded {} resources from {}",
        style("→").blue().bold(),
        loaded.resources.len(),
        style(args.aspire_manifest.display()).cyan()
    );
    display::display_skipped(&loaded.skipped);

    Ok((manifest, loaded))
}

//! Which resources need an image built, and in what order

use aspirate_core::{ContainerSettings, Manifest, Resource, Resources};
use indexmap::IndexMap;
use tracing::{info, warn};

use crate::error::Result;
use crate::orchestrator::{BuildOutcome, ContainerBuilder, DockerfileTarget, ProjectTarget};
use crate::properties::ContainerProperties;

/// One image to build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildTarget {
    Project(ProjectTarget),
    Dockerfile(DockerfileTarget),
}

impl BuildTarget {
    pub fn name(&self) -> &str {
        match self {
            Self::Project(target) => &target.name,
            Self::Dockerfile(target) => &target.name,
        }
    }

    /// Image reference the build produces
    pub fn image(&self) -> &str {
        match self {
            Self::Project(target) => &target.image,
            Self::Dockerfile(target) => &target.image,
        }
    }
}

/// Ordered build targets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildPlan {
    targets: Vec<BuildTarget>,
}

/// Images built by a completed plan
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub outcomes: Vec<BuildOutcome>,

    /// Resource name to built image reference
    pub images: IndexMap<String, String>,
}

impl BuildPlan {
    /// Targets for every project and dockerfile resource, in manifest order
    ///
    /// Paths are resolved against the manifest's directory.
    pub fn from_resources(
        resources: &Resources,
        manifest: &Manifest,
        settings: &ContainerSettings,
    ) -> Self {
        let targets = resources
            .iter()
            .filter_map(|(name, resource)| match resource {
                Resource::Project(project) => Some(BuildTarget::Project(ProjectTarget {
                    name: name.clone(),
                    project_path: manifest.resolve_path(&project.path),
                    container: ContainerProperties::for_project(name, settings),
                    image: settings.image_for(name),
                })),
                Resource::Dockerfile(dockerfile) => {
                    Some(BuildTarget::Dockerfile(DockerfileTarget {
                        name: name.clone(),
                        dockerfile: manifest.resolve_path(&dockerfile.path),
                        context: manifest.resolve_path(&dockerfile.context),
                        registry: settings.registry.clone().filter(|r| !r.is_empty()),
                        image: settings.dockerfile_image_for(name),
                    }))
                }
                _ => None,
            })
            .collect();

        Self { targets }
    }

    pub fn targets(&self) -> &[BuildTarget] {
        &self.targets
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Build every target in order, stopping at the first one that aborts
    pub async fn run(&self, builder: &ContainerBuilder<'_>) -> Result<BuildReport> {
        let mut report = BuildReport::default();

        for target in &self.targets {
            info!(resource = target.name(), image = target.image(), "building image");
            let outcome = match target {
                BuildTarget::Project(project) => builder.build_project(project).await?,
                BuildTarget::Dockerfile(dockerfile) => builder.build_dockerfile(dockerfile).await?,
            };

            if !outcome.is_success() {
                warn!(resource = target.name(), "build aborted, skipping remaining targets");
            }
            let outcome = outcome.into_result()?;

            report
                .images
                .insert(outcome.target.clone(), outcome.image.clone());
            report.outcomes.push(outcome);
        }

        Ok(report)
    }
}

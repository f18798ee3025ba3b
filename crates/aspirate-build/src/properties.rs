//! Project and container build properties

use aspirate_core::ContainerSettings;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

use crate::arguments::ArgumentsBuilder;
use crate::error::{BuildError, Result};
use crate::process::{Environment, ProcessExecutor};

pub const DOTNET_COMMAND: &str = "dotnet";
pub const CONTAINER_PUBLISH_PROFILE: &str = "DefaultContainer";
pub const DEFAULT_RUNTIME_IDENTIFIER: &str = "linux-x64";

/// How a project is published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishProperties {
    pub publish_single_file: String,
    pub publish_trimmed: String,
    pub self_contained: String,
    pub os: String,
    pub arch: String,
}

impl Default for PublishProperties {
    fn default() -> Self {
        Self {
            publish_single_file: "false".to_string(),
            publish_trimmed: "false".to_string(),
            self_contained: "true".to_string(),
            os: "linux".to_string(),
            arch: "x64".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MsBuildOutput {
    #[serde(default)]
    properties: MsBuildPublishing,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MsBuildPublishing {
    #[serde(default)]
    publish_single_file: String,
    #[serde(default)]
    publish_trimmed: String,
}

impl PublishProperties {
    /// Read publishing properties from `dotnet msbuild -getProperty` JSON output
    ///
    /// Empty or missing properties keep their defaults.
    pub fn from_msbuild_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let mut properties = Self::default();
        if json.trim().is_empty() {
            return Ok(properties);
        }

        let output: MsBuildOutput = serde_json::from_str(json)?;
        if !output.properties.publish_single_file.is_empty() {
            properties.publish_single_file = output.properties.publish_single_file;
        }
        if !output.properties.publish_trimmed.is_empty() {
            properties.publish_trimmed = output.properties.publish_trimmed;
        }
        Ok(properties)
    }

    /// Query the project's own publishing properties
    ///
    /// A failing query falls back to the defaults.
    pub async fn query(executor: &dyn ProcessExecutor, project: &Path) -> Result<Self> {
        let args = ArgumentsBuilder::new()
            .argument("msbuild", project.display().to_string())
            .flag("-getProperty:PublishSingleFile")
            .flag("-getProperty:PublishTrimmed")
            .build();

        let output = executor
            .execute(DOTNET_COMMAND, &args, &Environment::new())
            .await?;

        if !output.is_success() {
            warn!(
                project = %project.display(),
                exit_code = output.exit_code,
                "could not read msbuild properties, using defaults"
            );
            return Ok(Self::default());
        }

        let properties =
            Self::from_msbuild_json(&output.stdout).map_err(|e| BuildError::InvalidProperties {
                project: project.display().to_string(),
                message: e.to_string(),
            })?;
        debug!(project = %project.display(), ?properties, "publish properties");
        Ok(properties)
    }

    /// Set OS and architecture from a runtime identifier such as `linux-arm64`
    pub fn with_runtime_identifier(mut self, runtime_identifier: Option<&str>) -> Self {
        let rid = runtime_identifier
            .filter(|rid| !rid.is_empty())
            .unwrap_or(DEFAULT_RUNTIME_IDENTIFIER);
        match rid.split_once('-') {
            Some((os, arch)) => {
                self.os = os.to_string();
                self.arch = arch.to_string();
            }
            None => self.os = rid.to_string(),
        }
        self
    }
}

/// Where a project image is pushed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerProperties {
    pub registry: Option<String>,
    pub repository: Option<String>,
    pub image_name: Option<String>,
    pub tag: String,
}

impl ContainerProperties {
    /// Properties for the project resource `name`
    ///
    /// A repository is only set when a prefix is configured; otherwise the
    /// image name alone decides the repository.
    pub fn for_project(name: &str, settings: &ContainerSettings) -> Self {
        let repository = settings
            .repository_prefix
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|prefix| format!("{prefix}/{name}"));

        Self {
            registry: settings.registry.clone().filter(|r| !r.is_empty()),
            repository,
            image_name: Some(name.to_string()),
            tag: settings.tag.clone(),
        }
    }
}

/// `dotnet publish` arguments for a container build
pub fn publish_arguments(
    project: &Path,
    publish: &PublishProperties,
    container: &ContainerProperties,
) -> ArgumentsBuilder {
    ArgumentsBuilder::new()
        .argument("publish", project.display().to_string())
        .property("PublishProfile", CONTAINER_PUBLISH_PROFILE)
        .property("PublishSingleFile", &publish.publish_single_file)
        .property("PublishTrimmed", &publish.publish_trimmed)
        .argument("--self-contained", publish.self_contained.as_str())
        .argument("--os", publish.os.as_str())
        .argument("--arch", publish.arch.as_str())
        .property_if_set("ContainerRegistry", container.registry.as_deref())
        .property_if_set("ContainerRepository", container.repository.as_deref())
        .property_if_set("ContainerImageName", container.image_name.as_deref())
        .property("ContainerImageTag", &container.tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{CommandOutput, MockProcessExecutor};

    #[test]
    fn test_msbuild_json() {
        let json = r#"{"Properties": {"PublishSingleFile": "true", "PublishTrimmed": ""}}"#;
        let properties = PublishProperties::from_msbuild_json(json).unwrap();
        assert_eq!(properties.publish_single_file, "true");
        assert_eq!(properties.publish_trimmed, "false");

        assert_eq!(
            PublishProperties::from_msbuild_json("{}").unwrap(),
            PublishProperties::default()
        );
        assert!(PublishProperties::from_msbuild_json("not json").is_err());
    }

    #[test]
    fn test_runtime_identifier() {
        let properties = PublishProperties::default().with_runtime_identifier(Some("linux-musl-arm64"));
        assert_eq!(properties.os, "linux");
        assert_eq!(properties.arch, "musl-arm64");

        let properties = PublishProperties::default().with_runtime_identifier(None);
        assert_eq!((properties.os.as_str(), properties.arch.as_str()), ("linux", "x64"));
    }

    #[tokio::test]
    async fn test_query_falls_back_on_failure() {
        let executor = MockProcessExecutor::with_responses([CommandOutput::failure(1, "MSB1009")]);
        let properties = PublishProperties::query(&executor, Path::new("Api.csproj"))
            .await
            .unwrap();
        assert_eq!(properties, PublishProperties::default());
        assert_eq!(
            executor.command_lines(),
            ["dotnet msbuild Api.csproj -getProperty:PublishSingleFile -getProperty:PublishTrimmed"]
        );
    }

    #[test]
    fn test_publish_arguments() {
        let settings = ContainerSettings {
            registry: Some("ghcr.io".to_string()),
            tag: "1.0.0".to_string(),
            ..Default::default()
        };
        let container = ContainerProperties::for_project("api", &settings);
        let args = publish_arguments(Path::new("src/Api.csproj"), &PublishProperties::default(), &container);

        assert_eq!(
            args.to_string(),
            "publish src/Api.csproj -p:PublishProfile=DefaultContainer -p:PublishSingleFile=false \
             -p:PublishTrimmed=false --self-contained true --os linux --arch x64 \
             -p:ContainerRegistry=ghcr.io -p:ContainerImageName=api -p:ContainerImageTag=1.0.0"
        );
    }

    #[test]
    fn test_repository_prefix() {
        let settings = ContainerSettings {
            repository_prefix: Some("acme".to_string()),
            ..Default::default()
        };
        let container = ContainerProperties::for_project("api", &settings);
        assert_eq!(container.registry, None);
        assert_eq!(container.repository.as_deref(), Some("acme/api"));
        assert_eq!(container.tag, "latest");
    }
}

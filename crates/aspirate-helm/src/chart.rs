//! Chart layout on disk
//!
//! ```text
//! <chart>/
//!   Chart.yaml
//!   values.yaml
//!   templates/<name>-<kind>.yaml
//! ```

use aspirate_kube::KubeObject;
use futures::future::try_join_all;
use indexmap::IndexMap;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::postprocess::PostProcessor;
use crate::values::ChartValues;

pub const CHART_FILE: &str = "Chart.yaml";
pub const VALUES_FILE: &str = "values.yaml";
pub const TEMPLATES_DIR: &str = "templates";

pub const CHART_API_VERSION: &str = "v2";
pub const CHART_VERSION: &str = "1.0.0";
pub const CHART_DESCRIPTION: &str = "A Helm chart to Deploy your Aspire Project to Kubernetes.";

/// Contents of `Chart.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    pub api_version: String,
    pub name: String,
    pub description: String,
    pub app_version: String,
    pub version: String,
}

impl ChartMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            api_version: CHART_API_VERSION.to_string(),
            name: name.into(),
            description: CHART_DESCRIPTION.to_string(),
            app_version: CHART_VERSION.to_string(),
            version: CHART_VERSION.to_string(),
        }
    }
}

/// What [`HelmChartCreator::create`] wrote
#[derive(Debug, Clone)]
pub struct ChartOutput {
    pub chart_path: PathBuf,
    pub templates: Vec<PathBuf>,

    /// Template files written by more than one object; the last object wins
    pub collisions: Vec<String>,

    pub values: ChartValues,
}

/// Writes a complete chart from a set of objects
#[derive(Debug, Clone)]
pub struct HelmChartCreator {
    chart_path: PathBuf,
    metadata: ChartMetadata,
}

impl HelmChartCreator {
    pub fn new(chart_path: impl Into<PathBuf>, metadata: ChartMetadata) -> Self {
        Self {
            chart_path: chart_path.into(),
            metadata,
        }
    }

    /// Post-process `objects` and write the chart
    ///
    /// Objects are processed in order before anything touches the disk. The
    /// chart directory is then removed and recreated, so this must run once
    /// per generation. Template files are written concurrently.
    pub async fn create(&self, mut objects: Vec<KubeObject>) -> Result<ChartOutput> {
        let mut processor = PostProcessor::new();
        let mut templates: IndexMap<String, String> = IndexMap::new();
        let mut collisions = Vec::new();

        for object in &mut objects {
            processor.process(object)?;
            let file_name = format!("{}.yaml", object.file_stem());
            if templates.insert(file_name.clone(), object.to_yaml()?).is_some() {
                warn!(file = %file_name, "template written by more than one object");
                collisions.push(file_name);
            }
        }

        let values = processor.finish();

        self.recreate_directory().await?;

        let templates_dir = self.chart_path.join(TEMPLATES_DIR);
        let writes = templates.into_iter().map(|(file_name, content)| {
            let path = templates_dir.join(file_name);
            async move {
                tokio::fs::write(&path, content).await?;
                debug!(path = %path.display(), "wrote template");
                Ok::<_, crate::error::HelmError>(path)
            }
        });
        let written = try_join_all(writes).await?;

        tokio::fs::write(self.chart_path.join(VALUES_FILE), values.to_yaml()?).await?;
        tokio::fs::write(
            self.chart_path.join(CHART_FILE),
            serde_yaml::to_string(&self.metadata)?,
        )
        .await?;

        info!(path = %self.chart_path.display(), templates = written.len(), "generated helm chart");

        Ok(ChartOutput {
            chart_path: self.chart_path.clone(),
            templates: written,
            collisions,
            values,
        })
    }

    async fn recreate_directory(&self) -> Result<()> {
        if tokio::fs::try_exists(&self.chart_path).await? {
            tokio::fs::remove_dir_all(&self.chart_path).await?;
        }
        tokio::fs::create_dir_all(self.chart_path.join(TEMPLATES_DIR)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn object(value: serde_json::Value) -> KubeObject {
        KubeObject::from_json(value).unwrap()
    }

    fn config_map(name: &str, data: serde_json::Value) -> KubeObject {
        object(json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": {"name": name},
            "data": data
        }))
    }

    fn deployment(name: &str, image: &str) -> KubeObject {
        object(json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {"name": name, "namespace": "apps"},
            "spec": {
                "selector": {"matchLabels": {"app": name}},
                "template": {
                    "metadata": {"labels": {"app": name}},
                    "spec": {"containers": [{"name": name, "image": image}]}
                }
            }
        }))
    }

    #[tokio::test]
    async fn test_end_to_end_chart() {
        let temp = TempDir::new().unwrap();
        let chart = temp.path().join("chart");
        let creator = HelmChartCreator::new(&chart, ChartMetadata::new("my-chart"));

        let output = creator
            .create(vec![
                config_map("my-config", json!({"FOO": "bar"})),
                deployment("my-app", "myimage"),
            ])
            .await
            .unwrap();

        assert!(output.collisions.is_empty());
        assert_eq!(output.templates.len(), 2);

        let config = fs::read_to_string(chart.join("templates/my-config-configmap.yaml")).unwrap();
        assert!(config.contains(".Values.myConfig.env.FOO | default .Values.global.env.FOO"));

        let app = fs::read_to_string(chart.join("templates/my-app-deployment.yaml")).unwrap();
        assert!(app.contains(".Values.myApp.image.repository"));
        assert!(app.contains(".Values.myApp.image.pullPolicy"));
        assert!(!app.contains("namespace"));

        let values = fs::read_to_string(chart.join("values.yaml")).unwrap();
        insta::assert_snapshot!(values, @r"
        myConfig:
          env:
            FOO: bar
        myApp:
          image:
            repository: myimage
            tag: latest
            pullPolicy: Always
        global:
          env: {}
        ");

        let chart_yaml = fs::read_to_string(chart.join("Chart.yaml")).unwrap();
        insta::assert_snapshot!(chart_yaml, @r"
        apiVersion: v2
        name: my-chart
        description: A Helm chart to Deploy your Aspire Project to Kubernetes.
        appVersion: 1.0.0
        version: 1.0.0
        ");
    }

    #[tokio::test]
    async fn test_shared_env_goes_global() {
        let temp = TempDir::new().unwrap();
        let creator = HelmChartCreator::new(temp.path().join("chart"), ChartMetadata::new("c"));

        let output = creator
            .create(vec![
                config_map("api", json!({"LOG_LEVEL": "info", "PORT": "80"})),
                config_map("worker", json!({"LOG_LEVEL": "info"})),
            ])
            .await
            .unwrap();

        assert_eq!(output.values.global.env["LOG_LEVEL"], "info");
        assert_eq!(output.values.resources["api"].env.len(), 1);
        assert!(!output.values.resources.contains_key("worker"));
    }

    #[tokio::test]
    async fn test_directory_is_recreated() {
        let temp = TempDir::new().unwrap();
        let chart = temp.path().join("chart");
        fs::create_dir_all(chart.join("templates")).unwrap();
        fs::write(chart.join("templates/stale-service.yaml"), "stale").unwrap();

        HelmChartCreator::new(&chart, ChartMetadata::new("c"))
            .create(vec![deployment("web", "nginx:1.25")])
            .await
            .unwrap();

        assert!(!chart.join("templates/stale-service.yaml").exists());
        assert!(chart.join("templates/web-deployment.yaml").exists());
    }

    #[tokio::test]
    async fn test_colliding_file_names_last_wins() {
        let temp = TempDir::new().unwrap();
        let chart = temp.path().join("chart");

        let output = HelmChartCreator::new(&chart, ChartMetadata::new("c"))
            .create(vec![
                config_map("Web", json!({"FIRST": "1"})),
                config_map("web", json!({"SECOND": "2"})),
            ])
            .await
            .unwrap();

        assert_eq!(output.collisions, ["web-configmap.yaml"]);
        assert_eq!(output.templates.len(), 1);
        let content = fs::read_to_string(chart.join("templates/web-configmap.yaml")).unwrap();
        assert!(content.contains("SECOND"));
        assert!(!content.contains("FIRST"));
    }

    #[tokio::test]
    async fn test_invalid_image_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let chart = temp.path().join("chart");
        fs::create_dir_all(&chart).unwrap();
        fs::write(chart.join("values.yaml"), "previous").unwrap();

        let result = HelmChartCreator::new(&chart, ChartMetadata::new("c"))
            .create(vec![deployment("web", "")])
            .await;

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(chart.join("values.yaml")).unwrap(), "previous");
    }
}

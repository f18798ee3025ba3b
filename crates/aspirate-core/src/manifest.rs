//! Aspire manifest loading
//!
//! The manifest is read into raw entries first. Turning an entry into a typed
//! [`Resource`](crate::Resource) is the job of the handler registry, which
//! knows the JSON shape behind each type tag.

use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// A manifest entry whose body has not been interpreted yet
#[derive(Debug, Clone, PartialEq)]
pub struct RawResource {
    pub name: String,
    pub type_tag: String,
    pub body: JsonValue,
}

/// An entry left out while reading the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub name: String,
    pub reason: String,
}

/// A parsed Aspire manifest
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    /// Entries with a type tag, in manifest order
    pub entries: Vec<RawResource>,

    /// Entries that could not be read as resources
    pub skipped: Vec<SkippedEntry>,

    /// Directory the manifest was loaded from (relative paths resolve here)
    pub base_dir: Option<PathBuf>,
}

impl Manifest {
    /// Load a manifest from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CoreError::ManifestNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let mut manifest = Self::from_json(&content)?;
        manifest.base_dir = path.parent().map(Path::to_path_buf);
        Ok(manifest)
    }

    /// Parse a manifest from a JSON string
    ///
    /// Both `{"resources": {...}}` and a bare map of resources are accepted.
    pub fn from_json(json: &str) -> Result<Self> {
        let document: JsonValue = serde_json::from_str(json)?;

        let JsonValue::Object(mut root) = document else {
            return Err(CoreError::InvalidManifest {
                message: "top level must be a JSON object".to_string(),
            });
        };

        let entries = match root.remove("resources") {
            Some(JsonValue::Object(resources)) => resources,
            Some(_) => {
                return Err(CoreError::InvalidManifest {
                    message: "'resources' must be a JSON object".to_string(),
                });
            }
            None => root,
        };

        let mut manifest = Manifest::default();

        for (name, body) in entries {
            let type_tag = match body.get("type").and_then(JsonValue::as_str) {
                Some(tag) => tag.to_string(),
                None => {
                    tracing::warn!(resource = %name, "skipping manifest entry without a type");
                    manifest.skipped.push(SkippedEntry {
                        name,
                        reason: "no 'type' field".to_string(),
                    });
                    continue;
                }
            };

            manifest.entries.push(RawResource {
                name,
                type_tag,
                body,
            });
        }

        Ok(manifest)
    }

    /// Resolve a manifest-relative path
    pub fn resolve_path(&self, relative: &str) -> PathBuf {
        match &self.base_dir {
            Some(base) => base.join(relative),
            None => PathBuf::from(relative),
        }
    }
}

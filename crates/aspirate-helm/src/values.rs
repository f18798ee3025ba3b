//! The chart values tree
//!
//! Values are collected per resource while objects are post-processed
//! ([`ValuesTree`]), then deduplicated once into the frozen [`ChartValues`]
//! that becomes `values.yaml`. Env entries that two resources share with the
//! same value move to `global.env`; templates fall back to the global entry,
//! so either location resolves.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::{HelmError, Result};

/// Reserved top-level key for shared values
pub const GLOBAL_KEY: &str = "global";

/// Image settings of one workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageValues {
    pub repository: String,
    pub tag: String,
    pub pull_policy: String,
}

/// Values of one resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceValues {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageValues>,
}

impl ResourceValues {
    pub fn is_empty(&self) -> bool {
        self.env.is_empty() && self.image.is_none()
    }
}

/// Shared values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GlobalValues {
    pub env: IndexMap<String, String>,
}

/// Values being collected, keyed by camelCase resource name
#[derive(Debug, Clone, Default)]
pub struct ValuesTree {
    resources: IndexMap<String, ResourceValues>,
    global: GlobalValues,
}

impl ValuesTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_env(&mut self, resource: &str, key: &str, value: &str) {
        self.section(resource)
            .env
            .insert(key.to_string(), value.to_string());
    }

    pub fn set_image(&mut self, resource: &str, image: ImageValues) {
        self.section(resource).image = Some(image);
    }

    /// Drop the section of `resource` if nothing was collected for it
    pub fn remove_empty(&mut self, resource: &str) {
        if self.resources.get(resource).is_some_and(ResourceValues::is_empty) {
            self.resources.shift_remove(resource);
        }
    }

    pub fn promote_to_global(&mut self, key: &str, value: &str) {
        self.global.env.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, resource: &str) -> Option<&ResourceValues> {
        self.resources.get(resource)
    }

    fn section(&mut self, resource: &str) -> &mut ResourceValues {
        self.resources.entry(resource.to_string()).or_default()
    }

    /// Whether another resource holds `key` with exactly `value`
    fn shared_elsewhere(&self, resource: &str, key: &str, value: &str) -> bool {
        self.resources
            .iter()
            .filter(|(name, _)| name.as_str() != resource)
            .any(|(_, other)| other.env.get(key).is_some_and(|v| v == value))
    }

    /// Move shared env entries to `global.env` and freeze the tree
    ///
    /// Resources are visited in insertion order. For each env key:
    /// - already global with the same value: dropped locally
    /// - already global with another value: kept locally as an override
    /// - held with the same value by another resource: promoted
    /// - otherwise: kept locally
    ///
    /// A resource left without env loses its `env` section, and its whole
    /// entry if nothing else remains.
    pub fn deduplicate(mut self) -> ChartValues {
        let names: Vec<String> = self.resources.keys().cloned().collect();

        for name in &names {
            let env = match self.resources.get(name) {
                Some(section) if !section.env.is_empty() => section.env.clone(),
                _ => continue,
            };

            let mut kept = IndexMap::with_capacity(env.len());
            for (key, value) in env {
                match self.global.env.get(&key) {
                    Some(global) if *global == value => {}
                    Some(_) => {
                        kept.insert(key, value);
                    }
                    None if self.shared_elsewhere(name, &key, &value) => {
                        self.promote_to_global(&key, &value);
                    }
                    None => {
                        kept.insert(key, value);
                    }
                }
            }

            if let Some(section) = self.resources.get_mut(name) {
                section.env = kept;
            }
            self.remove_empty(name);
        }

        ChartValues {
            resources: self.resources,
            global: self.global,
        }
    }
}

/// Deduplicated values, ready to be written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartValues {
    pub resources: IndexMap<String, ResourceValues>,
    pub global: GlobalValues,
}

impl ChartValues {
    pub fn to_yaml(&self) -> Result<String> {
        if self.resources.contains_key(GLOBAL_KEY) {
            return Err(HelmError::ReservedName {
                resource: GLOBAL_KEY.to_string(),
                key: GLOBAL_KEY.to_string(),
            });
        }
        Ok(serde_yaml::to_string(self)?)
    }
}

impl Serialize for ChartValues {
    /// Resource sections in order, `global` last
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.resources.len() + 1))?;
        for (name, values) in &self.resources {
            map.serialize_entry(name, values)?;
        }
        map.serialize_entry(GLOBAL_KEY, &self.global)?;
        map.end()
    }
}

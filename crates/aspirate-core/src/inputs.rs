//! Input value resolution
//!
//! Inputs are resolved once per generation run so every reference to the same
//! input sees the same value, generated ones included.

use indexmap::IndexMap;
use rand::Rng;
use rand::distr::Alphanumeric;

use crate::resource::{Input, Resources};

/// A resolved input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputValue {
    pub value: String,
    pub secret: bool,
}

/// Resolved inputs keyed by (resource name, input name)
#[derive(Debug, Clone, Default)]
pub struct InputValues {
    values: IndexMap<(String, String), InputValue>,
}

impl InputValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every input of every resource, generating random values where asked
    pub fn resolve(resources: &Resources) -> Self {
        Self::resolve_with(resources, generate_alphanumeric)
    }

    /// Resolve inputs with a custom generator (receives the requested length)
    pub fn resolve_with<F>(resources: &Resources, mut generate: F) -> Self
    where
        F: FnMut(usize) -> String,
    {
        let mut resolved = Self::new();

        for (resource_name, resource) in resources {
            let Some(inputs) = resource.inputs() else {
                continue;
            };

            for (input_name, input) in inputs {
                let value = resolve_input(resource_name, input_name, input, &mut generate);
                resolved.insert(resource_name, input_name, value, input.secret);
            }
        }

        resolved
    }

    /// Set or replace a value
    pub fn insert(&mut self, resource: &str, input: &str, value: impl Into<String>, secret: bool) {
        self.values.insert(
            (resource.to_string(), input.to_string()),
            InputValue {
                value: value.into(),
                secret,
            },
        );
    }

    pub fn get(&self, resource: &str, input: &str) -> Option<&InputValue> {
        self.values.get(&(resource.to_string(), input.to_string()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn resolve_input<F>(resource: &str, name: &str, input: &Input, generate: &mut F) -> String
where
    F: FnMut(usize) -> String,
{
    match &input.default {
        Some(default) => match (&default.value, &default.generate) {
            (Some(value), _) => value.clone(),
            (None, Some(spec)) => generate(spec.min_length),
            (None, None) => {
                tracing::warn!(resource, input = name, "input default has neither value nor generator");
                String::new()
            }
        },
        None => {
            tracing::warn!(resource, input = name, "input has no default, using an empty value");
            String::new()
        }
    }
}

fn generate_alphanumeric(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{ParameterResource, Resource};

    fn parameter(inputs: &str) -> Resource {
        Resource::Parameter(ParameterResource {
            value: "{p.inputs.value}".to_string(),
            inputs: serde_json::from_str(inputs).unwrap(),
        })
    }

    #[test]
    fn test_literal_default() {
        let mut resources = Resources::new();
        resources.insert(
            "p".to_string(),
            parameter(r#"{"value": {"type": "string", "default": {"value": "hello"}}}"#),
        );

        let inputs = InputValues::resolve(&resources);
        let value = inputs.get("p", "value").unwrap();
        assert_eq!(value.value, "hello");
        assert!(!value.secret);
    }

    #[test]
    fn test_generated_value_length() {
        let mut resources = Resources::new();
        resources.insert(
            "p".to_string(),
            parameter(r#"{"value": {"secret": true, "default": {"generate": {"minLength": 16}}}}"#),
        );

        let inputs = InputValues::resolve(&resources);
        let value = inputs.get("p", "value").unwrap();
        assert_eq!(value.value.len(), 16);
        assert!(value.value.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(value.secret);
    }

    #[test]
    fn test_custom_generator_and_missing_default() {
        let mut resources = Resources::new();
        resources.insert(
            "p".to_string(),
            parameter(
                r#"{
                    "a": {"default": {"generate": {}}},
                    "b": {"type": "string"}
                }"#,
            ),
        );

        let inputs = InputValues::resolve_with(&resources, |len| "x".repeat(len));
        assert_eq!(inputs.get("p", "a").unwrap().value.len(), 22);
        assert_eq!(inputs.get("p", "b").unwrap().value, "");
        assert_eq!(inputs.len(), 2);
    }
}

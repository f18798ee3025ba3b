//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Manifest not found: {path}")]
    ManifestNotFound { path: String },

    #[error("Invalid manifest: {message}")]
    InvalidManifest { message: String },

    #[error("Failed to parse manifest JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown resource type '{tag}'{}", did_you_mean(.suggestion))]
    UnknownResourceType {
        tag: String,
        suggestion: Option<String>,
    },

    #[error("Resource '{resource}' is missing required field: {field}")]
    MissingField { resource: String, field: String },

    #[error("Cannot resolve expression '{{{expression}}}': {message}")]
    Expression { expression: String, message: String },
}

impl CoreError {
    pub(crate) fn expression(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Expression {
            expression: expression.into(),
            message: message.into(),
        }
    }
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(" (did you mean '{}'?)", s))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, CoreError>;

//! Error types for aspirate-kube

use thiserror::Error;

/// Result type for aspirate-kube operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Errors that can occur while turning resources into Kubernetes objects
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// No handler registered for a type tag
    #[error("no handler for resource type '{tag}'{}", hint(.suggestion))]
    HandlerNotFound {
        tag: String,
        suggestion: Option<String>,
    },

    /// Resource body does not match its type's shape
    #[error("invalid resource '{name}': {message}")]
    InvalidResource { name: String, message: String },

    /// Handler received a resource of another type
    #[error("resource '{name}' is a {actual} but was given to the {expected} handler")]
    HandlerMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    /// Object kind outside ConfigMap/Secret/Deployment/StatefulSet/Service
    #[error("unsupported object kind: {0}")]
    UnsupportedKind(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Manifest, input or expression error
    #[error(transparent)]
    Core(#[from] aspirate_core::CoreError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn hint(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(" (did you mean '{}'?)", s))
        .unwrap_or_default()
}

impl From<serde_json::Error> for KubeError {
    fn from(e: serde_json::Error) -> Self {
        KubeError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for KubeError {
    fn from(e: serde_yaml::Error) -> Self {
        KubeError::Serialization(e.to_string())
    }
}

impl KubeError {
    /// Whether the error only concerns a resource type this build does not know
    pub fn is_unknown_type(&self) -> bool {
        matches!(
            self,
            KubeError::HandlerNotFound { .. }
                | KubeError::Core(aspirate_core::CoreError::UnknownResourceType { .. })
        )
    }
}

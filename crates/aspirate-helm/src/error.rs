//! Error types for aspirate-helm

use thiserror::Error;

/// Result type for aspirate-helm operations
pub type Result<T> = std::result::Result<T, HelmError>;

/// Errors that can occur while producing a Helm chart
#[derive(Debug, Error)]
pub enum HelmError {
    /// A workload container without a usable image
    #[error("invalid image '{image}' on '{resource}': {message}")]
    InvalidImage {
        resource: String,
        image: String,
        message: String,
    },

    /// A resource whose values section would clash with a reserved key
    #[error("resource '{resource}' maps to the reserved values key '{key}'")]
    ReservedName { resource: String, key: String },

    /// Object handling error
    #[error(transparent)]
    Kube(#[from] aspirate_kube::KubeError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_yaml::Error> for HelmError {
    fn from(e: serde_yaml::Error) -> Self {
        HelmError::Serialization(e.to_string())
    }
}

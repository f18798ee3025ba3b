//! CLI error types with exit code handling
//!
//! Library errors are folded into a few categories, each with its own exit
//! code. Build aborts carry the orchestrator's code through unchanged.

use aspirate_build::BuildError;
use aspirate_core::CoreError;
use aspirate_helm::HelmError;
use aspirate_kube::KubeError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// The manifest or one of its resources is unusable
    #[error("Manifest error: {message}")]
    #[diagnostic(code(aspirate::cli::manifest))]
    Manifest {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Image build or push gave up
    #[error("Build failed: {message}")]
    #[diagnostic(code(aspirate::cli::build))]
    Build {
        message: String,
        exit_code: i32,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(aspirate::cli::io))]
    Io { message: String },

    /// Internal error (serialization, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(aspirate::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Manifest { .. } => exit_codes::MANIFEST_ERROR,
            CliError::Build { exit_code, .. } => *exit_code,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create a manifest error
    pub fn manifest(message: impl Into<String>) -> Self {
        Self::Manifest {
            message: message.into(),
            help: None,
        }
    }

    /// Create a manifest error with help text
    pub fn manifest_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Manifest {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Io(e) => e.into(),
            missing @ CoreError::ManifestNotFound { .. } => CliError::manifest_with_help(
                missing.to_string(),
                "generate one with `dotnet run --publisher manifest --output-path manifest.json`",
            ),
            other => CliError::manifest(other.to_string()),
        }
    }
}

impl From<KubeError> for CliError {
    fn from(err: KubeError) -> Self {
        match err {
            KubeError::Core(e) => e.into(),
            KubeError::Io(e) => e.into(),
            KubeError::Serialization(message) => CliError::internal(message),
            other => CliError::manifest(other.to_string()),
        }
    }
}

impl From<HelmError> for CliError {
    fn from(err: HelmError) -> Self {
        match err {
            HelmError::Kube(e) => e.into(),
            HelmError::Io(e) => e.into(),
            HelmError::Serialization(message) => CliError::internal(message),
            invalid @ HelmError::InvalidImage { .. } => CliError::manifest_with_help(
                invalid.to_string(),
                "set --container-registry or check the image of the resource",
            ),
            reserved @ HelmError::ReservedName { .. } => CliError::manifest_with_help(
                reserved.to_string(),
                "rename the resource in the AppHost",
            ),
        }
    }
}

impl From<BuildError> for CliError {
    fn from(err: BuildError) -> Self {
        let help = match &err {
            BuildError::Aborted { diagnostics, .. } if !diagnostics.is_empty() => {
                Some(diagnostics.clone())
            }
            BuildError::Spawn { command, .. } => Some(format!("is '{command}' installed and on PATH?")),
            _ => None,
        };
        CliError::Build {
            message: err.to_string(),
            exit_code: err.exit_code(),
            help,
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

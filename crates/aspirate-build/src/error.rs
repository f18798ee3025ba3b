//! Error types for aspirate-build

use thiserror::Error;

use crate::classify::FailureKind;
use crate::exit_codes;

/// Result type for aspirate-build operations
pub type Result<T> = std::result::Result<T, BuildError>;

/// Errors that can occur while building and pushing images
#[derive(Debug, Error)]
pub enum BuildError {
    /// The orchestrator gave up on a build target
    #[error("build of '{target}' aborted ({kind}), exit code {exit_code}")]
    Aborted {
        target: String,
        kind: FailureKind,
        exit_code: i32,
        diagnostics: String,
    },

    /// A tool invocation without recovery policy failed
    #[error("'{command}' failed with exit code {exit_code}: {stderr}")]
    ToolFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    /// The tool could not be started at all
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Project properties could not be read
    #[error("invalid msbuild properties for '{project}': {message}")]
    InvalidProperties { project: String, message: String },

    /// The prompt could not be answered
    #[error("prompt failed: {0}")]
    Prompt(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::Aborted { exit_code, .. } => *exit_code,
            _ => exit_codes::UNRECOVERABLE,
        }
    }
}

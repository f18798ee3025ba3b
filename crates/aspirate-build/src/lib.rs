//! Aspirate container builds
//!
//! Builds the images for project and dockerfile resources before manifests
//! are generated:
//!
//! - `project.v0` resources are published with `dotnet publish` using the
//!   container publish profile, recovering from duplicate output files and
//!   missing registry logins
//! - `dockerfile.v0` resources are built (and pushed) with docker or podman
//!
//! All external tools run behind [`ProcessExecutor`] and all questions go
//! through [`Prompter`], so the state machine in [`orchestrator`] is tested
//! without a container runtime.

pub mod arguments;
pub mod classify;
pub mod error;
pub mod exit_codes;
pub mod orchestrator;
pub mod plan;
pub mod process;
pub mod prompt;
pub mod properties;

pub use arguments::ArgumentsBuilder;
pub use classify::{FailureKind, classify};
pub use error::{BuildError, Result};
pub use orchestrator::{
    BuildOptions, BuildOutcome, BuildState, BuildStatus, ContainerBuilder, DockerfileTarget,
    ProjectTarget,
};
pub use plan::{BuildPlan, BuildReport, BuildTarget};
pub use process::{
    CommandOutput, Environment, Invocation, MockProcessExecutor, ProcessExecutor,
    TokioProcessExecutor,
};
pub use prompt::{Prompter, RegistryCredentials, ScriptedPrompter};
pub use properties::{ContainerProperties, PublishProperties};

//! Container build orchestration
//!
//! Project builds run `dotnet publish` and recover from known failures:
//!
//! ```text
//! Building -> Succeeded
//!          -> Failed(DuplicateOutputFiles)   -> RetryPrompt -> Retrying -> Building
//!                                                           -> Aborted(9999)
//!          -> Failed(NoRegistryAccess)       -> LoginPrompt -> LoggingIn -> Building
//!                                                           -> Aborted(1000 non-interactive, 9999 declined)
//!          -> Failed(UnknownRegistryAddress) -> Aborted(1013)
//!          -> Failed(Unknown)                -> Aborted(9999)
//! ```
//!
//! Dockerfile builds have no recovery: a failing build or push is a
//! [`BuildError::ToolFailed`].

use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::arguments::ArgumentsBuilder;
use crate::classify::{FailureKind, classify};
use crate::error::{BuildError, Result};
use crate::exit_codes;
use crate::process::{CommandOutput, Environment, ProcessExecutor};
use crate::prompt::{Prompter, REGISTRY_ENV, REGISTRY_PASSWORD_ENV, REGISTRY_USER_ENV};
use crate::properties::{
    ContainerProperties, DOTNET_COMMAND, PublishProperties, publish_arguments,
};

/// Login attempts per build target
pub const MAX_LOGIN_ATTEMPTS: usize = 3;

pub const RETRY_DUPLICATE_FILES_MESSAGE: &str = "dotnet publish does not allow duplicate file names in the publish output by default. \
     Retry the build explicitly allowing them?";

pub const LOGIN_MESSAGE: &str =
    "The container registry could not be accessed during the build. Log in to the registry and retry?";

/// A state the orchestrator passed through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Building,
    Failed(FailureKind),
    RetryPrompt,
    Retrying,
    LoginPrompt,
    LoggingIn,
    Succeeded,
    Aborted(i32),
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Building => f.write_str("building"),
            Self::Failed(kind) => write!(f, "failed ({kind})"),
            Self::RetryPrompt => f.write_str("asking to retry"),
            Self::Retrying => f.write_str("retrying"),
            Self::LoginPrompt => f.write_str("asking to log in"),
            Self::LoggingIn => f.write_str("logging in"),
            Self::Succeeded => f.write_str("succeeded"),
            Self::Aborted(code) => write!(f, "aborted ({code})"),
        }
    }
}

/// A `.csproj` to publish as a container image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTarget {
    pub name: String,
    pub project_path: PathBuf,
    pub container: ContainerProperties,
    pub image: String,
}

/// A Dockerfile to build and optionally push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerfileTarget {
    pub name: String,
    pub dockerfile: PathBuf,
    pub context: PathBuf,
    pub registry: Option<String>,
    pub image: String,
}

/// Final status of one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    Succeeded,
    Aborted {
        kind: FailureKind,
        exit_code: i32,
        diagnostics: String,
    },
}

/// Result of building one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    pub target: String,
    pub image: String,
    pub status: BuildStatus,

    /// Every state visited, in order
    pub states: Vec<BuildState>,
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        self.status == BuildStatus::Succeeded
    }

    /// Turn an aborted outcome into [`BuildError::Aborted`]
    pub fn into_result(self) -> Result<Self> {
        match self.status {
            BuildStatus::Succeeded => Ok(self),
            BuildStatus::Aborted {
                kind,
                exit_code,
                diagnostics,
            } => Err(BuildError::Aborted {
                target: self.target,
                kind,
                exit_code,
                diagnostics,
            }),
        }
    }
}

/// Options controlling how builds run
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// `docker` or `podman`
    pub container_builder: String,
    pub non_interactive: bool,
    pub runtime_identifier: Option<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            container_builder: "docker".to_string(),
            non_interactive: false,
            runtime_identifier: None,
        }
    }
}

/// Recorded progress of one target
struct Tracker {
    target: String,
    image: String,
    states: Vec<BuildState>,
}

impl Tracker {
    fn new(target: &str, image: &str) -> Self {
        Self {
            target: target.to_string(),
            image: image.to_string(),
            states: Vec::new(),
        }
    }

    fn enter(&mut self, state: BuildState) {
        debug!(resource = %self.target, %state, "build state");
        self.states.push(state);
    }

    fn succeed(mut self) -> BuildOutcome {
        self.enter(BuildState::Succeeded);
        info!(resource = %self.target, image = %self.image, "built image");
        BuildOutcome {
            target: self.target,
            image: self.image,
            status: BuildStatus::Succeeded,
            states: self.states,
        }
    }

    fn abort(mut self, kind: FailureKind, exit_code: i32, diagnostics: String) -> BuildOutcome {
        self.enter(BuildState::Aborted(exit_code));
        BuildOutcome {
            target: self.target,
            image: self.image,
            status: BuildStatus::Aborted {
                kind,
                exit_code,
                diagnostics,
            },
            states: self.states,
        }
    }
}

/// Drives builds through a process executor, asking a prompter when needed
pub struct ContainerBuilder<'a> {
    executor: &'a dyn ProcessExecutor,
    prompter: &'a dyn Prompter,
    options: BuildOptions,
}

impl<'a> ContainerBuilder<'a> {
    pub fn new(
        executor: &'a dyn ProcessExecutor,
        prompter: &'a dyn Prompter,
        options: BuildOptions,
    ) -> Self {
        Self {
            executor,
            prompter,
            options,
        }
    }

    /// Publish a project as a container image
    ///
    /// Aborts are returned as an outcome, not an error; errors are reserved
    /// for tools that cannot be run and failed prompts.
    pub async fn build_project(&self, target: &ProjectTarget) -> Result<BuildOutcome> {
        let publish = PublishProperties::query(self.executor, &target.project_path)
            .await?
            .with_runtime_identifier(self.options.runtime_identifier.as_deref());
        let mut args = publish_arguments(&target.project_path, &publish, &target.container);

        let mut tracker = Tracker::new(&target.name, &target.image);
        let mut retried = false;
        let mut logins = 0;

        loop {
            tracker.enter(BuildState::Building);
            let output = self
                .executor
                .execute(DOTNET_COMMAND, args.args(), &Environment::new())
                .await?;
            if output.is_success() {
                return Ok(tracker.succeed());
            }

            let diagnostics = output.diagnostics();
            let kind = classify(&diagnostics);
            tracker.enter(BuildState::Failed(kind));

            match kind {
                FailureKind::DuplicateOutputFiles => {
                    tracker.enter(BuildState::RetryPrompt);
                    if retried || !self.confirm(RETRY_DUPLICATE_FILES_MESSAGE, true)? {
                        return Ok(tracker.abort(kind, exit_codes::UNRECOVERABLE, diagnostics));
                    }
                    tracker.enter(BuildState::Retrying);
                    args = args.property("ErrorOnDuplicatePublishOutputFiles", false);
                    retried = true;
                }
                FailureKind::NoRegistryAccess => {
                    tracker.enter(BuildState::LoginPrompt);
                    if self.options.non_interactive {
                        return Ok(tracker.abort(
                            kind,
                            exit_codes::REGISTRY_ACCESS_DENIED,
                            diagnostics,
                        ));
                    }
                    if logins >= MAX_LOGIN_ATTEMPTS || !self.confirm(LOGIN_MESSAGE, false)? {
                        return Ok(tracker.abort(kind, exit_codes::UNRECOVERABLE, diagnostics));
                    }

                    tracker.enter(BuildState::LoggingIn);
                    logins += 1;
                    let login = self.login().await?;
                    if !login.is_success() {
                        return Ok(tracker.abort(
                            kind,
                            exit_codes::UNRECOVERABLE,
                            login.diagnostics(),
                        ));
                    }
                }
                FailureKind::UnknownRegistryAddress => {
                    return Ok(tracker.abort(
                        kind,
                        exit_codes::UNKNOWN_REGISTRY_ADDRESS,
                        diagnostics,
                    ));
                }
                FailureKind::Unknown => {
                    return Ok(tracker.abort(kind, exit_codes::UNRECOVERABLE, diagnostics));
                }
            }
        }
    }

    /// Build a Dockerfile and push it when a registry is set
    pub async fn build_dockerfile(&self, target: &DockerfileTarget) -> Result<BuildOutcome> {
        let mut tracker = Tracker::new(&target.name, &target.image);
        let builder = self.options.container_builder.as_str();

        tracker.enter(BuildState::Building);
        let build = ArgumentsBuilder::new()
            .argument("build", "")
            .argument("-t", target.image.as_str())
            .argument("-f", target.dockerfile.display().to_string())
            .flag(target.context.display().to_string());
        self.run_checked(builder, build).await?;

        if target.registry.as_deref().is_some_and(|r| !r.is_empty()) {
            let push = ArgumentsBuilder::new().argument("push", target.image.as_str());
            self.run_checked(builder, push).await?;
        }

        Ok(tracker.succeed())
    }

    /// Interactive answer, or `default` without asking when non-interactive
    fn confirm(&self, message: &str, non_interactive_default: bool) -> Result<bool> {
        if self.options.non_interactive {
            return Ok(non_interactive_default);
        }
        self.prompter.confirm(message)
    }

    /// Log in with credentials passed only through the environment
    async fn login(&self) -> Result<CommandOutput> {
        let credentials = self.prompter.request_credentials()?;
        let script = format!(
            "printf %s \"${REGISTRY_PASSWORD_ENV}\" | {} login \"${REGISTRY_ENV}\" --username \"${REGISTRY_USER_ENV}\" --password-stdin",
            self.options.container_builder
        );
        let args = vec!["-c".to_string(), script];
        self.executor
            .execute("sh", &args, &credentials.to_env())
            .await
    }

    async fn run_checked(&self, command: &str, args: ArgumentsBuilder) -> Result<CommandOutput> {
        let output = self
            .executor
            .execute(command, args.args(), &Environment::new())
            .await?;
        if !output.is_success() {
            return Err(BuildError::ToolFailed {
                command: format!("{command} {args}"),
                exit_code: output.exit_code,
                stderr: output.diagnostics(),
            });
        }
        Ok(output)
    }
}

//! Process execution boundary
//!
//! The orchestrator only ever needs "run this, give me the exit code and
//! output". [`TokioProcessExecutor`] does that for real;
//! [`MockProcessExecutor`] replays scripted outputs in tests.

use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use tokio::process::Command;
use tracing::debug;

use crate::error::{BuildError, Result};

/// Environment passed to a child process on top of the inherited one
pub type Environment = IndexMap<String, String>;

/// Captured result of one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Both streams; build tools report errors on either
    pub fn diagnostics(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
        }
    }
}

/// Runs external tools
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    /// Run `command` with `args`, adding `env` to the inherited environment
    ///
    /// A non-zero exit is not an error; only failing to start the process is.
    async fn execute(
        &self,
        command: &str,
        args: &[String],
        env: &Environment,
    ) -> Result<CommandOutput>;
}

/// Executor backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct TokioProcessExecutor {
    current_dir: Option<PathBuf>,
}

impl TokioProcessExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }
}

#[async_trait]
impl ProcessExecutor for TokioProcessExecutor {
    async fn execute(
        &self,
        command: &str,
        args: &[String],
        env: &Environment,
    ) -> Result<CommandOutput> {
        debug!(command, args = %args.join(" "), "executing");

        let mut cmd = Command::new(command);
        cmd.args(args)
            .envs(env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await.map_err(|source| BuildError::Spawn {
            command: command.to_string(),
            source,
        })?;

        let result = CommandOutput {
            // Killed by a signal
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(command, exit_code = result.exit_code, "finished");
        Ok(result)
    }
}

/// One recorded call to [`MockProcessExecutor`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub args: Vec<String>,
    pub env: Environment,
}

impl Invocation {
    /// `command arg1 arg2 ...`
    pub fn command_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// In-memory executor for testing
///
/// Outputs are returned in the order they were queued; once the queue is
/// empty every call succeeds with empty output.
#[derive(Clone, Default)]
pub struct MockProcessExecutor {
    responses: Arc<Mutex<VecDeque<CommandOutput>>>,
    invocations: Arc<Mutex<Vec<Invocation>>>,
}

impl MockProcessExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with queued outputs
    pub fn with_responses(responses: impl IntoIterator<Item = CommandOutput>) -> Self {
        let executor = Self::new();
        executor.responses.lock().unwrap().extend(responses);
        executor
    }

    pub fn push_response(&self, output: CommandOutput) {
        self.responses.lock().unwrap().push_back(output);
    }

    /// Every call made so far
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// Command lines of every call made so far
    pub fn command_lines(&self) -> Vec<String> {
        self.invocations()
            .iter()
            .map(Invocation::command_line)
            .collect()
    }
}

#[async_trait]
impl ProcessExecutor for MockProcessExecutor {
    async fn execute(
        &self,
        command: &str,
        args: &[String],
        env: &Environment,
    ) -> Result<CommandOutput> {
        self.invocations.lock().unwrap().push(Invocation {
            command: command.to_string(),
            args: args.to_vec(),
            env: env.clone(),
        });

        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_joins_streams() {
        let output = CommandOutput {
            exit_code: 1,
            stdout: "out".to_string(),
            stderr: "err".to_string(),
        };
        assert_eq!(output.diagnostics(), "out\nerr");
        assert_eq!(CommandOutput::failure(1, "err").diagnostics(), "err");
        assert_eq!(CommandOutput::success("out").diagnostics(), "out");
    }

    #[tokio::test]
    async fn test_mock_replays_and_records() {
        let executor = MockProcessExecutor::with_responses([CommandOutput::failure(1, "boom")]);

        let env = Environment::from([("KEY".to_string(), "value".to_string())]);
        let first = executor
            .execute("docker", &["build".to_string()], &env)
            .await
            .unwrap();
        let second = executor.execute("docker", &[], &Environment::new()).await.unwrap();

        assert_eq!(first.exit_code, 1);
        assert!(second.is_success());
        assert_eq!(executor.command_lines(), ["docker build", "docker"]);
        assert_eq!(executor.invocations()[0].env["KEY"], "value");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tokio_executor_captures_output() {
        let temp = tempfile::TempDir::new().unwrap();
        let executor = TokioProcessExecutor::new().current_dir(temp.path());
        let env = Environment::from([("ASPIRATE_TEST".to_string(), "hello".to_string())]);

        let output = executor
            .execute(
                "sh",
                &["-c".to_string(), "printf %s \"$ASPIRATE_TEST\"; echo oops >&2; exit 3".to_string()],
                &env,
            )
            .await
            .unwrap();

        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stdout, "hello");
        assert_eq!(output.stderr.trim(), "oops");
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let err = TokioProcessExecutor::new()
            .execute("aspirate-no-such-tool", &[], &Environment::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::Spawn { .. }));
    }
}

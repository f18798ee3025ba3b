//! Operator prompts
//!
//! The orchestrator asks every question through [`Prompter`], so the state
//! machine never touches a terminal and tests can script the answers.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

use crate::error::{BuildError, Result};
use crate::process::Environment;

pub const REGISTRY_ENV: &str = "ASPIRATE_REGISTRY";
pub const REGISTRY_USER_ENV: &str = "ASPIRATE_REGISTRY_USER";
pub const REGISTRY_PASSWORD_ENV: &str = "ASPIRATE_REGISTRY_PASSWORD";

/// Registry login details
#[derive(Clone, PartialEq, Eq)]
pub struct RegistryCredentials {
    pub registry: String,
    pub username: String,
    pub password: String,
}

impl RegistryCredentials {
    /// Environment for the login invocation
    pub fn to_env(&self) -> Environment {
        Environment::from([
            (REGISTRY_ENV.to_string(), self.registry.clone()),
            (REGISTRY_USER_ENV.to_string(), self.username.clone()),
            (REGISTRY_PASSWORD_ENV.to_string(), self.password.clone()),
        ])
    }
}

impl fmt::Debug for RegistryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryCredentials")
            .field("registry", &self.registry)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Asks the operator
pub trait Prompter: Send + Sync {
    fn confirm(&self, message: &str) -> Result<bool>;

    /// Registry address, username and (masked) password
    fn request_credentials(&self) -> Result<RegistryCredentials>;
}

/// Prompter answering from a script, for tests
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    confirmations: Mutex<VecDeque<bool>>,
    credentials: Mutex<VecDeque<RegistryCredentials>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn confirm_with(self, answer: bool) -> Self {
        self.confirmations.lock().unwrap().push_back(answer);
        self
    }

    pub fn credentials_with(self, credentials: RegistryCredentials) -> Self {
        self.credentials.lock().unwrap().push_back(credentials);
        self
    }

    /// Questions asked so far, in order
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, message: &str) -> Result<bool> {
        self.asked.lock().unwrap().push(message.to_string());
        self.confirmations
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| BuildError::Prompt(format!("no scripted answer for: {message}")))
    }

    fn request_credentials(&self) -> Result<RegistryCredentials> {
        self.asked.lock().unwrap().push("credentials".to_string());
        self.credentials
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| BuildError::Prompt("no scripted credentials".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> RegistryCredentials {
        RegistryCredentials {
            registry: "ghcr.io".to_string(),
            username: "octocat".to_string(),
            password: "s3cret".to_string(),
        }
    }

    #[test]
    fn test_credentials_env_and_debug() {
        let creds = credentials();
        let env = creds.to_env();
        assert_eq!(env[REGISTRY_ENV], "ghcr.io");
        assert_eq!(env[REGISTRY_USER_ENV], "octocat");
        assert_eq!(env[REGISTRY_PASSWORD_ENV], "s3cret");
        assert!(!format!("{creds:?}").contains("s3cret"));
    }

    #[test]
    fn test_scripted_prompter() {
        let prompter = ScriptedPrompter::new()
            .confirm_with(true)
            .credentials_with(credentials());

        assert!(prompter.confirm("Retry?").unwrap());
        assert!(prompter.confirm("Again?").is_err());
        assert_eq!(prompter.request_credentials().unwrap(), credentials());
        assert_eq!(prompter.asked(), ["Retry?", "Again?", "credentials"]);
    }
}

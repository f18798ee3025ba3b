//! Terminal prompter

use aspirate_build::{BuildError, Prompter, RegistryCredentials};
use console::{Term, style};
use tokio::runtime::{Handle, RuntimeFlavor};

/// Asks on the terminal, writing questions to stderr
pub struct ConsolePrompter {
    term: Term,
}

impl Default for ConsolePrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsolePrompter {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    fn ask(&self, question: &str) -> Result<String, BuildError> {
        self.term
            .write_str(&format!("{} {} ", style("?").yellow().bold(), question))
            .and_then(|_| self.term.read_line())
            .map(|answer| answer.trim().to_string())
            .map_err(prompt_error)
    }
}

impl Prompter for ConsolePrompter {
    fn confirm(&self, message: &str) -> Result<bool, BuildError> {
        blocking(|| loop {
            match self.ask(&format!("{message} [y/N]"))?.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "" | "n" | "no" => return Ok(false),
                _ => {
                    let _ = self.term.write_line("Please answer 'y' or 'n'.");
                }
            }
        })
    }

    fn request_credentials(&self) -> Result<RegistryCredentials, BuildError> {
        blocking(|| {
            let registry = self.ask("Registry:")?;
            let username = self.ask("Username:")?;
            let password =
                rpassword::prompt_password(format!("{} Password: ", style("?").yellow().bold()))
                    .map_err(prompt_error)?;

            Ok(RegistryCredentials {
                registry,
                username,
                password,
            })
        })
    }
}

/// Run a terminal read without stalling a multi-threaded runtime's worker
fn blocking<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

fn prompt_error(err: std::io::Error) -> BuildError {
    BuildError::Prompt(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_outside_runtime() {
        assert_eq!(blocking(|| 42), 42);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_blocking_on_multi_thread_worker() {
        let answer = tokio::spawn(async { blocking(|| "y".to_string()) })
            .await
            .unwrap();
        assert_eq!(answer, "y");
    }

    #[tokio::test]
    async fn test_blocking_on_current_thread() {
        assert_eq!(blocking(|| 7), 7);
    }
}

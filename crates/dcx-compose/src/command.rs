//! Process invocation behind a swappable runner.
//!
//! [`ComposeClient`](crate::ComposeClient) describes every docker call as an
//! [`Invocation`] and hands it to a [`CommandRunner`]. Production code uses
//! [`ProcessRunner`]; tests plug in a fake that records invocations and
//! returns canned output.

use std::fmt;
use std::process::Stdio;

use async_trait::async_trait;
use camino::Utf8PathBuf;
use tokio::process::Command;
use tracing::debug;

use crate::error::ComposeError;

/// A single program execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to run.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<String>,
    /// Working directory, inherited when `None`.
    pub cwd: Option<Utf8PathBuf>,
    /// Extra environment variables for the child.
    pub env: Vec<(String, String)>,
    /// Variables removed from the inherited environment.
    pub env_remove: Vec<String>,
}

impl Invocation {
    /// Creates an invocation of `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
            env_remove: Vec::new(),
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<Utf8PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Adds an environment variable.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Keeps `key` out of the child's environment.
    #[must_use]
    pub fn without_env(mut self, key: impl Into<String>) -> Self {
        self.env_remove.push(key.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
}

impl CommandOutput {
    /// A successful run that printed `stdout`.
    #[must_use]
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed run with exit `code` that printed `stderr`.
    #[must_use]
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Returns `true` if the process exited with status 0.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Executes invocations.
#[async_trait]
pub trait CommandRunner: Send + Sync + fmt::Debug {
    /// Runs `invocation` to completion and captures its output.
    ///
    /// A non-zero exit is *not* an error at this level.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Spawn`] if the program cannot be started.
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, ComposeError>;
}

/// Runs invocations as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, ComposeError> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .kill_on_drop(true);
        for key in &invocation.env_remove {
            command.env_remove(key);
        }
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }

        debug!(command = %invocation, "Running docker command");
        let output = command
            .output()
            .await
            .map_err(|err| ComposeError::spawn(&invocation.program, err))?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_display() {
        let inv = Invocation::new("docker")
            .arg("compose")
            .args(["up", "-d"])
            .with_cwd("/srv/web")
            .with_env("DOCKER_HOST", "tcp://h:2375");
        assert_eq!(inv.to_string(), "docker compose up -d");
        assert_eq!(inv.cwd.as_deref(), Some(camino::Utf8Path::new("/srv/web")));
        assert_eq!(inv.env, vec![("DOCKER_HOST".to_owned(), "tcp://h:2375".to_owned())]);
    }

    #[test]
    fn test_output_constructors() {
        assert!(CommandOutput::success("ok").is_success());
        assert!(!CommandOutput::failure(1, "bad").is_success());
        assert!(!CommandOutput::default().is_success());
    }

    #[tokio::test]
    async fn test_process_runner_missing_program() {
        let inv = Invocation::new("dcx-definitely-not-a-real-binary");
        let err = ProcessRunner.run(&inv).await.unwrap_err();
        assert!(err.is_docker_missing());
    }
}

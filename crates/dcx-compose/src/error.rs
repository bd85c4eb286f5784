//! Error types for the dcx-compose crate.

/// Errors produced by docker and docker compose invocations.
///
/// # Examples
///
/// ```
/// use dcx_compose::ComposeError;
///
/// let err = ComposeError::CommandFailed {
///     command: "docker compose kill".to_owned(),
///     code: Some(1),
///     stderr: "no such service".to_owned(),
/// };
/// assert!(!err.is_docker_missing());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// The docker binary could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The command ran and exited unsuccessfully.
    #[error("`{command}` exited with {}: {stderr}", exit_status(.code))]
    CommandFailed {
        /// The rendered command line.
        command: String,
        /// Exit code, `None` when killed by a signal.
        code: Option<i32>,
        /// Trimmed standard error.
        stderr: String,
    },

    /// Docker printed output that could not be parsed.
    #[error("unexpected output from `{command}`: {source}")]
    Parse {
        /// The rendered command line.
        command: String,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// `docker inspect` returned no object for the container.
    #[error("no such container: {0}")]
    ContainerNotFound(String),
}

#[allow(clippy::ref_option)] // Called with a field reference from the derive
fn exit_status(code: &Option<i32>) -> String {
    code.map_or_else(|| "a signal".to_owned(), |c| format!("status {c}"))
}

impl ComposeError {
    /// Creates a new [`ComposeError::Spawn`] error.
    #[inline]
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Creates a new [`ComposeError::Parse`] error.
    #[inline]
    pub fn parse(command: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Parse {
            command: command.into(),
            source,
        }
    }

    /// Returns `true` if the docker binary itself is unavailable.
    #[inline]
    #[must_use]
    pub fn is_docker_missing(&self) -> bool {
        matches!(self, Self::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_spawn_not_found_is_docker_missing() {
        let err = ComposeError::spawn("docker", io::Error::new(io::ErrorKind::NotFound, "nope"));
        assert!(err.is_docker_missing());
        assert_eq!(err.to_string(), "failed to run docker: nope");
    }

    #[test]
    fn test_command_failed_display() {
        let err = ComposeError::CommandFailed {
            command: "docker compose stop".to_owned(),
            code: Some(2),
            stderr: "boom".to_owned(),
        };
        insta::assert_snapshot!(err.to_string(), @"`docker compose stop` exited with status 2: boom");
    }

    #[test]
    fn test_command_failed_by_signal_display() {
        let err = ComposeError::CommandFailed {
            command: "docker ps".to_owned(),
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("a signal"));
        assert!(!err.is_docker_missing());
    }
}

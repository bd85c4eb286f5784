//! High-level compose operations.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use futures_util::future::try_join_all;
use tracing::{debug, info};

use crate::command::{CommandOutput, CommandRunner, Invocation, ProcessRunner};
use crate::error::ComposeError;
use crate::host::DockerHost;
use crate::types::{
    ContainerDetails, ContainerSummary, LogTail, merge_log_streams, parse_inspect, parse_ps,
};

/// Default docker executable.
pub const DOCKER_PROGRAM: &str = "docker";

const DOCKER_HOST_VAR: &str = "DOCKER_HOST";

/// Lifecycle commands that take no arguments beyond the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectCommand {
    /// `docker compose kill`
    Kill,
    /// `docker compose pull`
    Pull,
    /// `docker compose build`
    Build,
    /// `docker compose start`
    Start,
    /// `docker compose stop`
    Stop,
}

impl ProjectCommand {
    /// The compose subcommand name, also used in API responses.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kill => "kill",
            Self::Pull => "pull",
            Self::Build => "build",
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

/// A compose project on disk: its directory and descriptor file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    /// Project directory; also the working directory of every call.
    pub dir: Utf8PathBuf,
    /// Descriptor file inside `dir`.
    pub descriptor: Utf8PathBuf,
}

impl ProjectRef {
    /// References the project in `dir` with descriptor `descriptor_name`.
    #[must_use]
    pub fn new(dir: &Utf8Path, descriptor_name: &str) -> Self {
        Self {
            dir: dir.to_owned(),
            descriptor: dir.join(descriptor_name),
        }
    }
}

/// Runs docker compose for registered projects.
///
/// Cheap to clone; clones share the runner and the [`DockerHost`].
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use dcx_compose::{ComposeClient, ProjectRef};
///
/// # async fn example() -> Result<(), dcx_compose::ComposeError> {
/// let client = ComposeClient::new();
/// let project = ProjectRef::new(Utf8Path::new("/srv/web"), "docker-compose.yml");
///
/// let started = client.up(&project).await?;
/// for container in started {
///     println!("{}", container.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ComposeClient {
    runner: Arc<dyn CommandRunner>,
    host: DockerHost,
    program: String,
}

impl Default for ComposeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ComposeClient {
    /// Creates a client that runs the real `docker` binary.
    #[must_use]
    pub fn new() -> Self {
        Self::with_runner(Arc::new(ProcessRunner))
    }

    /// Creates a client backed by `runner`.
    #[must_use]
    pub fn with_runner(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            host: DockerHost::default(),
            program: DOCKER_PROGRAM.to_owned(),
        }
    }

    /// Uses `host` as the shared docker host override.
    #[must_use]
    pub fn with_host(mut self, host: DockerHost) -> Self {
        self.host = host;
        self
    }

    /// Overrides the docker executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Returns the shared docker host override.
    #[inline]
    #[must_use]
    pub const fn host(&self) -> &DockerHost {
        &self.host
    }

    /// Runs `docker compose up -d` and returns the project's containers.
    pub async fn up(&self, project: &ProjectRef) -> Result<Vec<ContainerSummary>, ComposeError> {
        self.compose(project, ["up", "-d"]).await?;
        info!(project = %project.dir, "Project is up");
        self.ps(project).await
    }

    /// Runs a lifecycle command against the whole project.
    pub async fn run(&self, project: &ProjectRef, command: ProjectCommand) -> Result<(), ComposeError> {
        self.compose(project, [command.as_str()]).await?;
        info!(project = %project.dir, command = command.as_str(), "Compose command finished");
        Ok(())
    }

    /// Scales `service` to `replicas` containers.
    pub async fn scale(
        &self,
        project: &ProjectRef,
        service: &str,
        replicas: u32,
    ) -> Result<(), ComposeError> {
        let scale = format!("{service}={replicas}");
        self.compose(
            project,
            ["up", "-d", "--no-recreate", "--scale", scale.as_str(), service],
        )
        .await?;
        info!(project = %project.dir, service, replicas, "Service scaled");
        Ok(())
    }

    /// Lists the project's containers, stopped ones included.
    pub async fn ps(&self, project: &ProjectRef) -> Result<Vec<ContainerSummary>, ComposeError> {
        let invocation = self.compose_invocation(project, ["ps", "--all", "--format", "json"]);
        let output = self.execute(&invocation).await?;
        parse_ps(&output.stdout).map_err(|err| ComposeError::parse(invocation.to_string(), err))
    }

    /// Inspects one container.
    ///
    /// # Errors
    ///
    /// Besides command failures, returns [`ComposeError::ContainerNotFound`]
    /// if docker reports nothing for `id`.
    pub async fn container(&self, id: &str) -> Result<ContainerDetails, ComposeError> {
        let invocation = self.docker_invocation().args(["inspect", id]);
        let output = self.execute(&invocation).await?;
        parse_inspect(&output.stdout)
            .map_err(|err| ComposeError::parse(invocation.to_string(), err))?
            .into_iter()
            .next()
            .ok_or_else(|| ComposeError::ContainerNotFound(id.to_owned()))
    }

    /// Fetches timestamped log lines of one container.
    pub async fn container_logs(&self, id: &str, tail: LogTail) -> Result<Vec<String>, ComposeError> {
        let tail = tail.to_string();
        let invocation = self
            .docker_invocation()
            .args(["logs", "--timestamps", "--tail", tail.as_str(), id]);
        let output = self.execute(&invocation).await?;
        Ok(merge_log_streams(&output.stdout, &output.stderr))
    }

    /// Fetches log lines for every container of the project, keyed by
    /// container name.
    pub async fn project_logs(
        &self,
        project: &ProjectRef,
        tail: LogTail,
    ) -> Result<Vec<(String, Vec<String>)>, ComposeError> {
        let containers = self.ps(project).await?;
        try_join_all(containers.into_iter().map(|container| async move {
            let lines = self.container_logs(&container.id, tail).await?;
            Ok::<_, ComposeError>((container.name, lines))
        }))
        .await
    }

    fn docker_invocation(&self) -> Invocation {
        let invocation = Invocation::new(&self.program);
        match self.host.get() {
            Some(host) => invocation.with_env(DOCKER_HOST_VAR, host),
            None => invocation.without_env(DOCKER_HOST_VAR),
        }
    }

    fn compose_invocation<'a>(
        &self,
        project: &ProjectRef,
        args: impl IntoIterator<Item = &'a str>,
    ) -> Invocation {
        self.docker_invocation()
            .args([
                "compose",
                "--project-directory",
                project.dir.as_str(),
                "-f",
                project.descriptor.as_str(),
            ])
            .args(args)
            .with_cwd(project.dir.clone())
    }

    async fn compose<'a>(
        &self,
        project: &ProjectRef,
        args: impl IntoIterator<Item = &'a str>,
    ) -> Result<CommandOutput, ComposeError> {
        let invocation = self.compose_invocation(project, args);
        self.execute(&invocation).await
    }

    async fn execute(&self, invocation: &Invocation) -> Result<CommandOutput, ComposeError> {
        let output = self.runner.run(invocation).await?;
        if !output.is_success() {
            debug!(command = %invocation, code = ?output.code, "Docker command failed");
            return Err(ComposeError::CommandFailed {
                command: invocation.to_string(),
                code: output.code,
                stderr: output.stderr.trim().to_owned(),
            });
        }
        Ok(output)
    }
}

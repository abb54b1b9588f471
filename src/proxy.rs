//! Proxy orchestrator: the prepare → run → shutdown lifecycle.
//!
//! Preparing owns a temporary build context (rendered config plus a verbatim
//! Dockerfile copy) and always releases it, then builds the image. Running
//! launches the container either blocking or supervised; a supervised run can
//! be stopped gracefully with an interrupt.

use std::fs;
use std::future::Future;
use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::docker::{DockerCli, RunMode};
use crate::error::{Error, Result};
use crate::template;

/// Pause between an interrupt and cancelling the supervised run task.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(1);

/// Fixed name of the container definition inside the build context.
const CONTEXT_DOCKERFILE: &str = "Dockerfile";

/// Lifecycle phase of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Rendering the config and building the image
    Preparing,
    /// The container run is in flight
    Running,
    /// Interrupt received, grace period and cancellation pending
    ShuttingDown,
    /// Terminal
    Stopped,
}

/// Drives the full bootstrap lifecycle for a single proxy container.
pub struct Proxy {
    settings: Settings,
    docker: DockerCli,
    state: LifecycleState,
}

impl Proxy {
    pub fn new(settings: Settings) -> Self {
        Self::with_docker(settings, DockerCli::new())
    }

    /// Substitutes the docker collaborator, for tests.
    pub fn with_docker(settings: Settings, docker: DockerCli) -> Self {
        Self {
            settings,
            docker,
            state: LifecycleState::Preparing,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Runs the full lifecycle: prepare (render + build), then run until the
    /// container exits or the operator interrupts a supervised run.
    pub async fn start(&mut self) -> Result<()> {
        self.prepare().await?;
        self.run().await
    }

    /// Renders the config into a fresh build context, copies the container
    /// definition next to it, and builds the tagged image.
    ///
    /// The context directory is deleted when this function returns, on
    /// success and on every error path alike.
    async fn prepare(&mut self) -> Result<()> {
        self.transition(LifecycleState::Preparing);

        let context = tempfile::tempdir()?;
        debug!(path = %context.path().display(), "Creating temporary build context");

        let config_name = self.settings.template.file_name();
        let rendered = context.path().join(&config_name);
        info!(
            dest = %rendered.display(),
            "Compiling configuration into temporary build context"
        );

        let variables = self.settings.template_variables();
        debug!(
            variables = %serde_json::Value::Object(variables.clone()),
            "Using template variables"
        );
        template::render(&self.settings.template, &rendered, &variables)?;
        if self.settings.verbose {
            debug!("{}", fs::read_to_string(&rendered)?);
        }

        self.settings
            .dockerfile
            .copy_to(&context.path().join(CONTEXT_DOCKERFILE))?;

        let build_args = vec![
            "--no-cache".to_string(),
            "--build-arg".to_string(),
            format!("nginx_config={config_name}"),
        ];
        self.docker
            .build(
                &self.settings.tag,
                context.path(),
                &build_args,
                self.settings.verbose,
            )
            .await
        // `context` drops here, removing the directory whether or not the
        // build succeeded
    }

    /// Launches the container in the configured mode and sees the lifecycle
    /// through to Stopped.
    async fn run(&mut self) -> Result<()> {
        self.transition(LifecycleState::Running);
        let run_args = vec!["--network=host".to_string()];

        if self.settings.sync {
            // Blocking mode installs no signal listener: an interrupt takes
            // the default disposition and is not intercepted here.
            self.docker
                .run(
                    &self.settings.tag,
                    self.settings.port,
                    &run_args,
                    self.settings.verbose,
                    RunMode::Blocking,
                )
                .await?;
        } else {
            let docker = self.docker.clone();
            let tag = self.settings.tag.clone();
            let port = self.settings.port;
            let verbose = self.settings.verbose;
            let handle = tokio::spawn(async move {
                docker
                    .run(&tag, port, &run_args, verbose, RunMode::Supervised)
                    .await
            });
            self.supervise(handle, async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await?;
        }

        self.transition(LifecycleState::Stopped);
        info!("Done");
        Ok(())
    }

    /// Awaits the supervised run task until it finishes or `interrupt`
    /// resolves first.
    ///
    /// On interrupt: wait [`SHUTDOWN_GRACE_PERIOD`], cancel the task, and
    /// report a clean stop regardless of how the task ended in the meantime.
    /// Cancellation is cooperative — the underlying external process is not
    /// separately killed or confirmed dead.
    async fn supervise(
        &mut self,
        mut handle: JoinHandle<Result<()>>,
        interrupt: impl Future<Output = ()>,
    ) -> Result<()> {
        tokio::select! {
            result = &mut handle => return flatten(result),
            _ = interrupt => {
                warn!("Received interrupt. Attempting to stop gracefully ...");
            }
        }

        self.transition(LifecycleState::ShuttingDown);
        tokio::time::sleep(SHUTDOWN_GRACE_PERIOD).await;
        handle.abort();
        let _ = handle.await;
        Ok(())
    }

    fn transition(&mut self, next: LifecycleState) {
        debug!(from = ?self.state, to = ?next, "Lifecycle transition");
        self.state = next;
    }
}

fn flatten(result: std::result::Result<Result<()>, JoinError>) -> Result<()> {
    match result {
        Ok(inner) => inner,
        Err(join_err) => Err(Error::Io(std::io::Error::other(join_err))),
    }
}

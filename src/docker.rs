//! Docker collaborators: image build and container run.
//!
//! Both collaborators are external command-line tools resolved from the
//! executable search path and treated as black boxes. A non-zero exit
//! surfaces as a typed error naming the tag; the caller decides process
//! fate. Nothing here retries.

use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// How the container run is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Wait in place until the container exits; output is not streamed.
    Blocking,
    /// Spawn the process and, when verbose, forward its standard output
    /// line by line until the stream closes, then await exit.
    Supervised,
}

/// Thin wrapper around the docker command line tool.
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: String,
}

impl DockerCli {
    /// Uses `docker` from the executable search path.
    pub fn new() -> Self {
        Self {
            program: "docker".to_string(),
        }
    }

    /// Substitutes another program, e.g. podman or a recording stub in tests.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Builds `tag` from the prepared build context at `source`.
    ///
    /// Waits for the build to complete. Stdout is suppressed unless
    /// `verbose`; stderr is always surfaced.
    pub async fn build(
        &self,
        tag: &str,
        source: &Path,
        build_args: &[String],
        verbose: bool,
    ) -> Result<()> {
        info!(
            tag,
            source = %source.display(),
            args = ?build_args,
            "Building container image"
        );

        let mut cmd = Command::new(&self.program);
        cmd.arg("build").arg("-t").arg(tag).args(build_args).arg(source);
        if !verbose {
            cmd.stdout(Stdio::null());
        }
        debug!(command = ?cmd.as_std(), "Invoking build tool");

        let status = cmd.status().await?;
        if !status.success() {
            return Err(Error::BuildFailed {
                tag: tag.to_string(),
                code: status.code(),
            });
        }
        Ok(())
    }

    /// Starts `tag` with container port 80 mapped to host `port`.
    pub async fn run(
        &self,
        tag: &str,
        port: u16,
        run_args: &[String],
        verbose: bool,
        mode: RunMode,
    ) -> Result<()> {
        info!(tag, port, mode = ?mode, "Starting container");

        let mut cmd = Command::new(&self.program);
        cmd.arg("run")
            .arg("-p")
            .arg(format!("{port}:80"))
            .args(run_args)
            .arg(tag);
        debug!(command = ?cmd.as_std(), "Invoking run tool");

        let status = match mode {
            RunMode::Blocking => {
                if !verbose {
                    cmd.stdout(Stdio::null());
                }
                cmd.status().await?
            }
            RunMode::Supervised => {
                if verbose {
                    cmd.stdout(Stdio::piped());
                } else {
                    cmd.stdout(Stdio::null());
                }
                let mut child = cmd.spawn()?;
                if let Some(stdout) = child.stdout.take() {
                    let mut lines = BufReader::new(stdout).lines();
                    while let Some(line) = lines.next_line().await? {
                        info!(target: "docker", "{}", line);
                    }
                }
                child.wait().await?
            }
        };

        if !status.success() {
            return Err(Error::RunFailed {
                tag: tag.to_string(),
                code: status.code(),
            });
        }
        Ok(())
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

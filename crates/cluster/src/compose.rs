//! Invocation of the container orchestration tool.

use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info};

/// Program used when `D2_COMPOSE_COMMAND` is not set.
pub const DEFAULT_COMPOSE_COMMAND: &str = "docker-compose";

/// One call of the orchestration tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeInvocation {
    /// Compose project name (`-p`)
    pub project: String,
    /// Compose file (`-f`)
    pub compose_file: PathBuf,
    /// Subcommand and its arguments, e.g. `["up", "-d"]`
    pub args: Vec<String>,
    /// Extra environment for the process
    pub env: BTreeMap<String, String>,
}

impl ComposeInvocation {
    /// Arguments following the program name.
    #[must_use]
    pub fn command_args(&self) -> Vec<String> {
        let mut args = vec![
            "-p".to_string(),
            self.project.clone(),
            "-f".to_string(),
            self.compose_file.display().to_string(),
        ];
        args.extend(self.args.iter().cloned());
        args
    }
}

/// Runs the orchestration tool.
#[async_trait]
pub trait ComposeRunner: Send + Sync {
    /// Run `invocation` to completion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Subprocess`] if the tool cannot be started or exits
    /// unsuccessfully.
    async fn run(&self, invocation: &ComposeInvocation) -> Result<()>;
}

/// [`ComposeRunner`] spawning `docker-compose` (or a configured replacement)
/// with inherited stdio.
#[derive(Debug, Clone)]
pub struct DockerCompose {
    program: String,
    base_args: Vec<String>,
}

impl Default for DockerCompose {
    fn default() -> Self {
        Self::new(DEFAULT_COMPOSE_COMMAND)
    }
}

impl DockerCompose {
    /// Use a whitespace-separated command line such as `docker compose`.
    #[must_use]
    pub fn new(command: &str) -> Self {
        let mut parts = command.split_whitespace().map(String::from);
        let program = parts
            .next()
            .unwrap_or_else(|| DEFAULT_COMPOSE_COMMAND.to_string());
        Self {
            program,
            base_args: parts.collect(),
        }
    }

    /// Honour `D2_COMPOSE_COMMAND`, falling back to `docker-compose`.
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var("D2_COMPOSE_COMMAND") {
            Ok(command) if !command.trim().is_empty() => Self::new(&command),
            _ => Self::default(),
        }
    }

    /// The program being run.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl ComposeRunner for DockerCompose {
    async fn run(&self, invocation: &ComposeInvocation) -> Result<()> {
        let args = invocation.command_args();
        info!(program = %self.program, ?args, "Running");

        let status = Command::new(&self.program)
            .args(&self.base_args)
            .args(&args)
            .envs(&invocation.env)
            .status()
            .await
            .map_err(|e| Error::subprocess(&self.program, None, e.to_string()))?;

        if !status.success() {
            return Err(Error::subprocess(
                &self.program,
                status.code(),
                format!("{} {}", self.program, args.join(" ")),
            ));
        }

        debug!(program = %self.program, "Completed");
        Ok(())
    }
}

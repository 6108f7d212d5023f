//! The `up` workflow.
//!
//! Each step runs to completion before the next starts and the first failure
//! aborts the run. Nothing is rolled back: the cached template, the staged
//! seed and the patched descriptor are all safe to reuse on the next attempt.

use crate::compose::{ComposeInvocation, ComposeRunner};
use crate::config::ClusterConfig;
use crate::environment::{compose_project_name, make_environment};
use crate::layout::{compose_namespace, template_path};
use crate::seed::{SeedRequest, Seeder};
use crate::{Error, Result};
use d2_cache::{CacheStore, GetOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Placeholder in the server descriptor replaced with the context fragment.
pub const CONTEXT_PLACEHOLDER: &str = "{REPLACE_WITH_CONTEXT}";

const SERVER_DESCRIPTOR: &str = "config/tomcat-server.xml";
const PRISTINE_SUFFIX: &str = "orig";
const COMPOSE_FILE: &str = "docker-compose.yml";

/// Flags of one `up` invocation that are not part of the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpOptions {
    /// Seed the demo database
    pub seed: bool,
    /// Seed from this local dump instead of downloading
    pub seed_file: Option<PathBuf>,
    /// Refresh the cached template (and downloaded dump)
    pub update: bool,
}

impl UpOptions {
    fn wants_seed(&self) -> bool {
        self.seed || self.seed_file.is_some()
    }
}

/// XML replacing [`CONTEXT_PLACEHOLDER`]; empty for the root context.
#[must_use]
pub fn context_fragment(context_path: &str) -> String {
    if context_path.is_empty() {
        String::new()
    } else {
        format!(r#"<Context path="{context_path}" docBase="ROOT/" />"#)
    }
}

/// Brings a resolved cluster up.
pub struct Provisioner<'a> {
    cache: &'a CacheStore,
    compose: &'a dyn ComposeRunner,
    seeder: &'a dyn Seeder,
}

impl<'a> Provisioner<'a> {
    /// Create a provisioner.
    #[must_use]
    pub fn new(
        cache: &'a CacheStore,
        compose: &'a dyn ComposeRunner,
        seeder: &'a dyn Seeder,
    ) -> Self {
        Self {
            cache,
            compose,
            seeder,
        }
    }

    /// Ensure the template, optionally seed, patch the context and launch.
    ///
    /// # Errors
    ///
    /// Returns the error of the first step that fails.
    #[instrument(skip_all, fields(name = %config.name))]
    pub async fn up(&self, config: &ClusterConfig, options: &UpOptions) -> Result<()> {
        let location = self.ensure_template(config, options.update).await?;

        if options.wants_seed() {
            self.seeder
                .seed(&SeedRequest {
                    cache_location: location.clone(),
                    version: config.db_version.clone(),
                    database_url: config.demo_database_url.clone(),
                    path: options.seed_file.clone(),
                    update: options.update,
                })
                .await?;
        }

        patch_context(&location, &config.context_path).await?;
        self.launch(config, &location).await
    }

    /// Location of the unpacked template, fetching it when absent or when
    /// `update` is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateUnavailable`] if the archive cannot be fetched
    /// or does not contain the configured directory.
    pub async fn ensure_template(&self, config: &ClusterConfig, update: bool) -> Result<PathBuf> {
        let path = template_path(&config.name, &config.docker_compose_directory);
        let location = self.cache.location(&path);

        if self.cache.exists(&path) && !update {
            debug!(location = %location.display(), "Using cached docker-compose template");
            return Ok(location);
        }

        info!("Initializing Docker Compose repository");
        self.cache
            .get(
                &config.docker_compose_repository,
                &compose_namespace(&config.name),
                GetOptions::forced(),
            )
            .await
            .map_err(|e| Error::TemplateUnavailable {
                name: config.name.clone(),
                message: "download failed".to_string(),
                source: Some(e),
            })?;

        if !location.is_dir() {
            return Err(Error::template_unavailable(
                &config.name,
                format!(
                    "archive has no '{}' directory",
                    config.docker_compose_directory
                ),
            ));
        }

        Ok(location)
    }

    async fn launch(&self, config: &ClusterConfig, location: &Path) -> Result<()> {
        let invocation = ComposeInvocation {
            project: compose_project_name(&config.name),
            compose_file: location.join(COMPOSE_FILE),
            args: vec!["up".to_string(), "-d".to_string()],
            env: make_environment(config),
        };

        info!(image = %config.docker_image, port = config.port, "Spinning up cluster");
        self.compose.run(&invocation).await
    }
}

/// Render the server descriptor of the template at `location` for
/// `context_path`.
///
/// The untouched descriptor is kept next to it with an `.orig` suffix and
/// every patch starts from that copy.
///
/// # Errors
///
/// Returns [`Error::FileIo`] if the descriptor cannot be read or written.
pub async fn patch_context(location: &Path, context_path: &str) -> Result<()> {
    let descriptor = location.join(SERVER_DESCRIPTOR);
    let pristine = descriptor.with_extension(format!("xml.{PRISTINE_SUFFIX}"));

    let has_pristine = tokio::fs::try_exists(&pristine)
        .await
        .map_err(|e| Error::file_io("inspect", &pristine, e))?;

    let original = if has_pristine {
        tokio::fs::read_to_string(&pristine)
            .await
            .map_err(|e| Error::file_io("read", &pristine, e))?
    } else {
        let text = tokio::fs::read_to_string(&descriptor)
            .await
            .map_err(|e| Error::file_io("read", &descriptor, e))?;
        tokio::fs::write(&pristine, &text)
            .await
            .map_err(|e| Error::file_io("write", &pristine, e))?;
        text
    };

    if !original.contains(CONTEXT_PLACEHOLDER) {
        warn!(
            descriptor = %descriptor.display(),
            "Server descriptor has no {CONTEXT_PLACEHOLDER} placeholder"
        );
    }

    let patched = original.replace(CONTEXT_PLACEHOLDER, &context_fragment(context_path));
    tokio::fs::write(&descriptor, patched)
        .await
        .map_err(|e| Error::file_io("write", &descriptor, e))?;

    debug!(%context_path, "Patched server descriptor");
    Ok(())
}

//! Demo database seeding.

use crate::image::substitute_version;
use crate::layout::database_path;
use crate::{Error, Result};
use async_trait::async_trait;
use d2_cache::{CacheStore, GetOptions};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

const SEED_DIR: &str = "seed";

/// What to seed and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRequest {
    /// Unpacked template directory of the cluster
    pub cache_location: PathBuf,
    /// Database version to seed
    pub version: String,
    /// Dump URL template, `{version}` is replaced with [`Self::version`]
    pub database_url: String,
    /// Local dump to use instead of downloading
    pub path: Option<PathBuf>,
    /// Download the dump again even if cached
    pub update: bool,
}

impl SeedRequest {
    /// Where the template's database service expects the dump.
    #[must_use]
    pub fn target(&self) -> PathBuf {
        self.cache_location
            .join(SEED_DIR)
            .join(format!("{}.sql.gz", self.version))
    }
}

/// Prepares a database dump for a cluster.
#[async_trait]
pub trait Seeder: Send + Sync {
    /// Seed according to `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if the dump cannot be obtained or staged.
    async fn seed(&self, request: &SeedRequest) -> Result<()>;
}

/// Stages a gzipped SQL dump inside the cluster template.
#[derive(Debug, Clone)]
pub struct DumpSeeder {
    cache: CacheStore,
}

impl DumpSeeder {
    /// Seeder downloading dumps through `cache`.
    #[must_use]
    pub const fn new(cache: CacheStore) -> Self {
        Self { cache }
    }

    async fn source(&self, request: &SeedRequest) -> Result<PathBuf> {
        if let Some(path) = &request.path {
            if !tokio::fs::try_exists(path).await.unwrap_or(false) {
                return Err(Error::seed(format!(
                    "Seed file {} does not exist",
                    path.display()
                )));
            }
            return Ok(path.clone());
        }

        let url = substitute_version(&request.database_url, &request.version);
        let options = GetOptions {
            force: request.update,
        };
        Ok(self
            .cache
            .get(&url, &database_path(&request.version), options)
            .await?)
    }
}

async fn stage(source: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::file_io("create", parent, e))?;
    }
    tokio::fs::copy(source, target)
        .await
        .map_err(|e| Error::file_io("copy seed file to", target, e))?;
    Ok(())
}

#[async_trait]
impl Seeder for DumpSeeder {
    #[instrument(skip(self, request), fields(version = %request.version))]
    async fn seed(&self, request: &SeedRequest) -> Result<()> {
        let source = self.source(request).await?;
        let target = request.target();

        info!(source = %source.display(), target = %target.display(), "Seeding database");
        stage(&source, &target).await
    }
}

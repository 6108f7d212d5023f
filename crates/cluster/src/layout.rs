//! Logical cache paths owned by the cluster tooling.
//!
//! ```text
//! clusters/<name>/config.json                       persisted record
//! clusters/<name>/docker-compose/<directory>/...    deployment template
//! databases/<dbVersion>.sql.gz                      downloaded demo dumps
//! ```

use crate::{Error, Result};
use d2_cache::CacheStore;

const CLUSTER_DIR: &str = "clusters";
const DOCKER_COMPOSE_CACHE_NAME: &str = "docker-compose";
const CACHE_FILE: &str = "config.json";
const DATABASE_DIR: &str = "databases";

/// Reject names that would not map to a single cache directory.
///
/// # Errors
///
/// Returns a configuration error for empty names or names containing path
/// separators or `..`.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(Error::configuration_with_help(
            format!("Invalid cluster name '{name}'"),
            "Use a version such as 2.38 or a plain name such as dev",
        ));
    }
    Ok(())
}

/// Namespace holding everything cached for cluster `name`.
#[must_use]
pub fn cluster_namespace(name: &str) -> String {
    format!("{CLUSTER_DIR}/{name}")
}

/// Path of the persisted record for cluster `name`.
#[must_use]
pub fn record_path(name: &str) -> String {
    format!("{CLUSTER_DIR}/{name}/{CACHE_FILE}")
}

/// Namespace the template archive is unpacked into.
#[must_use]
pub fn compose_namespace(name: &str) -> String {
    format!("{CLUSTER_DIR}/{name}/{DOCKER_COMPOSE_CACHE_NAME}")
}

/// Path of the unpacked template directory.
#[must_use]
pub fn template_path(name: &str, directory: &str) -> String {
    format!("{}/{directory}", compose_namespace(name))
}

/// Path of a cached demo database dump.
#[must_use]
pub fn database_path(db_version: &str) -> String {
    format!("{DATABASE_DIR}/{db_version}.sql.gz")
}

/// Remove everything cached for cluster `name`.
///
/// # Errors
///
/// Returns an error for invalid names or if removal fails.
pub fn clean_cluster(cache: &CacheStore, name: &str) -> Result<()> {
    validate_name(name)?;
    cache.purge(cluster_namespace(name))?;
    Ok(())
}

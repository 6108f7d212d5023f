//! `d2 cluster` commands.

use crate::cli::ClusterTarget;
use d2_cache::CacheStore;
use d2_cluster::paths;
use d2_cluster::{
    ClusterArgs, ClusterConfig, ConfigResolver, DEFAULTS, DockerCompose, DumpSeeder, Provisioner,
    StaticConfig, UpOptions, clean_cluster,
};
use miette::IntoDiagnostic;
use tracing::{debug, info};

fn open_cache() -> miette::Result<CacheStore> {
    let root = paths::cache_dir()?;
    debug!(root = %root.display(), "Opening cache");
    Ok(CacheStore::open(root)?)
}

fn load_static_config(target: &ClusterTarget) -> miette::Result<StaticConfig> {
    let path = match &target.config {
        Some(path) => path.clone(),
        None => paths::cluster_config_file()?,
    };
    Ok(StaticConfig::load(&path)?)
}

fn resolve(cache: &CacheStore, target: &ClusterTarget) -> miette::Result<ClusterConfig> {
    let static_config = load_static_config(target)?;
    let args = ClusterArgs::new(&target.name).with_overrides(target.overrides());
    Ok(ConfigResolver::new(&DEFAULTS, &static_config, cache).resolve(&args)?)
}

/// `d2 cluster up`
pub async fn up(target: &ClusterTarget, options: &UpOptions) -> miette::Result<()> {
    let cache = open_cache()?;
    let config = resolve(&cache, target)?;

    let compose = DockerCompose::from_env();
    let seeder = DumpSeeder::new(cache.clone());
    Provisioner::new(&cache, &compose, &seeder)
        .up(&config, options)
        .await?;

    let port = config.port;
    let context = config.context_path;
    info!("Cluster '{}' is starting on http://localhost:{port}{context}", config.name);
    Ok(())
}

/// `d2 cluster config`
pub fn config(target: &ClusterTarget) -> miette::Result<()> {
    let cache = open_cache()?;
    let config = resolve(&cache, target)?;
    let json = serde_json::to_string_pretty(&config).into_diagnostic()?;
    println!("{json}");
    Ok(())
}

/// `d2 cluster clean`
pub fn clean(name: &str) -> miette::Result<()> {
    let cache = open_cache()?;
    clean_cluster(&cache, name)?;
    info!(%name, "Removed cached cluster files");
    Ok(())
}

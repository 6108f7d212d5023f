//! Four-layer configuration resolution.

use super::{ClusterConfig, ClusterLayer, Defaults, PersistedRecord, StaticConfig};
use crate::image::{Substitutions, render_image};
use crate::layout::{record_path, validate_name};
use crate::{Error, Result};
use d2_cache::CacheStore;
use tracing::{debug, instrument, warn};

/// Where a layer came from, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LayerSource {
    /// Built-in defaults
    Defaults,
    /// Static cluster configuration file
    StaticConfig,
    /// Record persisted by the previous resolution
    Persisted,
    /// Arguments of the current invocation
    Arguments,
}

/// A layer tagged with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    /// Where the values came from
    pub source: LayerSource,
    /// The values
    pub values: ClusterLayer,
}

/// Live arguments for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterArgs {
    /// Cluster name (required)
    pub name: String,
    /// Overrides supplied on the command line
    pub overrides: ClusterLayer,
}

impl ClusterArgs {
    /// Arguments naming a cluster, without overrides.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            overrides: ClusterLayer::default(),
        }
    }

    /// Set the overrides.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ClusterLayer) -> Self {
        self.overrides = overrides;
        self
    }

    fn layer(&self) -> ClusterLayer {
        ClusterLayer {
            name: Some(self.name.clone()),
            ..self.overrides.clone()
        }
    }
}

/// Merges defaults, static config, the persisted record and live arguments.
#[derive(Debug)]
pub struct ConfigResolver<'a> {
    defaults: &'a Defaults,
    static_config: &'a StaticConfig,
    cache: &'a CacheStore,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn required<T>(value: Option<T>, key: &str) -> Result<T> {
    value.ok_or_else(|| {
        Error::configuration_with_help(
            format!("No value for '{key}' in any configuration layer"),
            format!("Set '{key}' in cluster.toml or pass it on the command line"),
        )
    })
}

impl<'a> ConfigResolver<'a> {
    /// Create a resolver.
    #[must_use]
    pub const fn new(
        defaults: &'a Defaults,
        static_config: &'a StaticConfig,
        cache: &'a CacheStore,
    ) -> Self {
        Self {
            defaults,
            static_config,
            cache,
        }
    }

    /// The ordered layers for `args`, lowest precedence first.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid cluster names or when the persisted
    /// record cannot be read for a reason other than absence.
    pub fn layers(&self, args: &ClusterArgs) -> Result<Vec<Layer>> {
        validate_name(&args.name)?;

        Ok(vec![
            Layer {
                source: LayerSource::Defaults,
                values: self.defaults.layer(),
            },
            Layer {
                source: LayerSource::StaticConfig,
                values: self.static_config.layer_for(&args.name),
            },
            Layer {
                source: LayerSource::Persisted,
                values: self.persisted_layer(&args.name)?,
            },
            Layer {
                source: LayerSource::Arguments,
                values: args.layer(),
            },
        ])
    }

    /// Resolve the configuration for `args` and persist its record.
    ///
    /// # Errors
    ///
    /// Propagates cache I/O failures. A missing or malformed persisted
    /// record is not an error.
    #[instrument(skip(self), fields(name = %args.name))]
    pub fn resolve(&self, args: &ClusterArgs) -> Result<ClusterConfig> {
        let layers = self.layers(args)?;
        let merged = ClusterLayer::merged(layers.iter().map(|l| &l.values));

        let config = derive(&args.name, merged)?;
        debug!(?config, "Resolved configuration");

        self.cache
            .write_json(record_path(&config.name), &PersistedRecord::project(&config))?;

        Ok(config)
    }

    fn persisted_layer(&self, name: &str) -> Result<ClusterLayer> {
        let path = record_path(name);
        match self.cache.read(&path) {
            Ok(bytes) => match serde_json::from_slice::<PersistedRecord>(&bytes) {
                Ok(record) => Ok(record.into_layer()),
                Err(e) => {
                    warn!(%path, error = %e, "Ignoring malformed cluster record");
                    Ok(ClusterLayer::default())
                }
            },
            Err(e) if e.is_not_found() => {
                debug!(%path, "No cluster record yet");
                Ok(ClusterLayer::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Compute derived fields from the merged layer.
fn derive(name: &str, merged: ClusterLayer) -> Result<ClusterConfig> {
    let dhis2_version = non_empty(merged.dhis2_version).unwrap_or_else(|| name.to_string());
    let db_version = non_empty(merged.db_version).unwrap_or_else(|| dhis2_version.clone());
    let custom_context = merged.custom_context.unwrap_or(false);
    let context_path = if custom_context {
        format!("/{name}")
    } else {
        String::new()
    };

    let channel = non_empty(merged.channel);
    let variant = non_empty(merged.variant);
    let image = required(non_empty(merged.image), "image")?;

    let docker_image = render_image(
        &image,
        &Substitutions::new(channel.as_deref(), Some(&dhis2_version)),
        variant.as_deref(),
    );

    Ok(ClusterConfig {
        name: name.to_string(),
        dhis2_version,
        db_version,
        channel,
        image,
        docker_image,
        variant,
        context_path,
        custom_context,
        port: required(merged.port, "port")?,
        demo_database_url: required(non_empty(merged.demo_database_url), "demoDatabaseURL")?,
        docker_compose_repository: required(
            non_empty(merged.docker_compose_repository),
            "dockerComposeRepository",
        )?,
        docker_compose_directory: required(
            non_empty(merged.docker_compose_directory),
            "dockerComposeDirectory",
        )?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULTS;
    use d2_cache::{Fetcher, HttpFetcher};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn cache(tmp: &TempDir) -> CacheStore {
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new().unwrap());
        CacheStore::with_fetcher(tmp.path(), fetcher)
    }

    #[test]
    fn test_derive_defaults_from_name() {
        let config = derive("2.38", DEFAULTS.layer()).unwrap();
        assert_eq!(config.dhis2_version, "2.38");
        assert_eq!(config.db_version, "2.38");
        assert_eq!(config.context_path, "");
        assert_eq!(config.docker_image, "dhis2/core:2.38-latest-alpine");
    }

    #[test]
    fn test_derive_custom_context() {
        let mut layer = DEFAULTS.layer();
        layer.custom_context = Some(true);
        let config = derive("dev", layer).unwrap();
        assert_eq!(config.context_path, "/dev");
    }

    #[test]
    fn test_empty_strings_count_as_unset() {
        let mut layer = DEFAULTS.layer();
        layer.dhis2_version = Some(String::new());
        layer.db_version = Some(String::new());
        let config = derive("2.39", layer).unwrap();
        assert_eq!(config.dhis2_version, "2.39");
        assert_eq!(config.db_version, "2.39");
    }

    #[test]
    fn test_missing_required_key_is_configuration_error() {
        let err = derive("2.38", ClusterLayer::default()).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_layers_are_ordered() {
        let tmp = TempDir::new().unwrap();
        let cache = cache(&tmp);
        let static_config = StaticConfig::default();
        let resolver = ConfigResolver::new(&DEFAULTS, &static_config, &cache);

        let sources: Vec<_> = resolver
            .layers(&ClusterArgs::new("2.38"))
            .unwrap()
            .into_iter()
            .map(|l| l.source)
            .collect();

        assert_eq!(
            sources,
            vec![
                LayerSource::Defaults,
                LayerSource::StaticConfig,
                LayerSource::Persisted,
                LayerSource::Arguments
            ]
        );
    }

    #[test]
    fn test_invalid_name_rejected() {
        let tmp = TempDir::new().unwrap();
        let cache = cache(&tmp);
        let static_config = StaticConfig::default();
        let resolver = ConfigResolver::new(&DEFAULTS, &static_config, &cache);
        assert!(resolver.resolve(&ClusterArgs::new("../etc")).is_err());
    }
}

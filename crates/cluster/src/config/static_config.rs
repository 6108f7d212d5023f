//! Static cluster configuration loaded from `cluster.toml`.
//!
//! ```toml
//! # applies to every cluster
//! port = 8080
//! channel = "stable"
//!
//! [clusters."2.38"]
//! dbVersion = "2.38"
//! customContext = true
//!
//! [clusters.dev]
//! dhis2Version = "2.41"
//! channel = "dev"
//! ```

use super::ClusterLayer;
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Static configuration bag: shared keys plus per-cluster tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StaticConfig {
    /// Keys applying to every cluster
    #[serde(flatten)]
    pub shared: ClusterLayer,

    /// Per-cluster entries keyed by cluster name
    #[serde(default)]
    pub clusters: BTreeMap<String, ClusterLayer>,
}

impl StaticConfig {
    /// Parse TOML text.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the text is not valid TOML or has
    /// keys of the wrong type.
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| {
            Error::configuration_with_help(
                format!("Invalid cluster configuration: {e}"),
                "Keys use camelCase, e.g. dhis2Version, dbVersion, customContext",
            )
        })
    }

    /// Load from `path`. A missing file is an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                debug!(path = %path.display(), "Loaded cluster configuration");
                Self::parse(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No cluster configuration file");
                Ok(Self::default())
            }
            Err(e) => Err(Error::file_io("read", path, e)),
        }
    }

    /// Layer for cluster `name`: shared keys overridden by its own table.
    #[must_use]
    pub fn layer_for(&self, name: &str) -> ClusterLayer {
        let mut layer = self.shared.clone();
        if let Some(entry) = self.clusters.get(name) {
            layer.overlay(entry);
        }
        layer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
port = 8081
channel = "stable"

[clusters."2.38"]
dbVersion = "2.37"
port = 9000

[clusters.dev]
channel = "dev"
"#;

    #[test]
    fn test_parse_shared_and_named() {
        let config = StaticConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.shared.port, Some(8081));
        assert_eq!(config.clusters.len(), 2);
        assert_eq!(
            config.clusters["2.38"].db_version.as_deref(),
            Some("2.37")
        );
    }

    #[test]
    fn test_named_entry_overrides_shared() {
        let config = StaticConfig::parse(SAMPLE).unwrap();

        let layer = config.layer_for("2.38");
        assert_eq!(layer.port, Some(9000));
        assert_eq!(layer.channel.as_deref(), Some("stable"));

        let dev = config.layer_for("dev");
        assert_eq!(dev.port, Some(8081));
        assert_eq!(dev.channel.as_deref(), Some("dev"));
    }

    #[test]
    fn test_unknown_cluster_gets_shared_keys() {
        let config = StaticConfig::parse(SAMPLE).unwrap();
        let layer = config.layer_for("2.40");
        assert_eq!(layer.port, Some(8081));
        assert!(layer.db_version.is_none());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let err = StaticConfig::parse("port = \"not a number\"").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let config = StaticConfig::load(&tmp.path().join("cluster.toml")).unwrap();
        assert_eq!(config, StaticConfig::default());
    }

    #[test]
    fn test_load_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cluster.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = StaticConfig::load(&path).unwrap();
        assert_eq!(config.layer_for("dev").channel.as_deref(), Some("dev"));
    }
}

//! The per-cluster record persisted between invocations.

use super::{ClusterConfig, ClusterLayer};
use serde::{Deserialize, Serialize};

/// Projection of the last resolved configuration, stored at
/// `clusters/<name>/config.json`.
///
/// Only inputs are stored. Derived values such as the rendered image are
/// recomputed on every run so template changes take effect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedRecord {
    /// Release channel
    pub channel: Option<String>,
    /// Demo database version
    pub db_version: Option<String>,
    /// DHIS2 core version
    pub dhis2_version: Option<String>,
    /// Custom context flag
    pub custom_context: Option<bool>,
    /// Image template
    pub image: Option<String>,
    /// Exposed port
    pub port: Option<u16>,
}

impl PersistedRecord {
    /// Project a resolved configuration.
    #[must_use]
    pub fn project(config: &ClusterConfig) -> Self {
        Self {
            channel: config.channel.clone(),
            db_version: Some(config.db_version.clone()),
            dhis2_version: Some(config.dhis2_version.clone()),
            custom_context: Some(config.custom_context),
            image: Some(config.image.clone()),
            port: Some(config.port),
        }
    }

    /// The record as a configuration layer.
    #[must_use]
    pub fn into_layer(self) -> ClusterLayer {
        ClusterLayer {
            channel: self.channel,
            db_version: self.db_version,
            dhis2_version: self.dhis2_version,
            custom_context: self.custom_context,
            image: self.image,
            port: self.port,
            ..ClusterLayer::default()
        }
    }
}

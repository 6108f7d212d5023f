//! Partial cluster configuration contributed by one precedence layer.

use serde::{Deserialize, Serialize};

/// One layer of cluster configuration. Every key is optional; a layer only
/// overrides the keys it defines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterLayer {
    /// Cluster name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// DHIS2 core version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dhis2_version: Option<String>,

    /// Demo database version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_version: Option<String>,

    /// Release channel (stable, dev, canary, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    /// Image template with `{version}`/`{channel}` placeholders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Image variant suffix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,

    /// Serve DHIS2 under `/<name>` instead of `/`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_context: Option<bool>,

    /// Exposed port
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// URL template of the demo database dump
    #[serde(rename = "demoDatabaseURL", skip_serializing_if = "Option::is_none")]
    pub demo_database_url: Option<String>,

    /// Archive URL of the docker-compose template repository
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_compose_repository: Option<String>,

    /// Directory inside the template archive that holds the compose file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_compose_directory: Option<String>,
}

macro_rules! overlay_fields {
    ($base:ident, $higher:ident, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = &$higher.$field {
                $base.$field = Some(value.clone());
            }
        )+
    };
}

// An empty string is the same as leaving the key out.
macro_rules! overlay_strings {
    ($base:ident, $higher:ident, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $higher.$field.as_ref().filter(|v| !v.is_empty()) {
                $base.$field = Some(value.clone());
            }
        )+
    };
}

impl ClusterLayer {
    /// Apply `higher` on top of `self`, keeping keys `higher` leaves unset
    /// or sets to an empty string.
    pub fn overlay(&mut self, higher: &Self) {
        overlay_strings!(
            self,
            higher,
            name,
            dhis2_version,
            db_version,
            channel,
            image,
            variant,
            demo_database_url,
            docker_compose_repository,
            docker_compose_directory,
        );
        overlay_fields!(self, higher, custom_context, port);
    }

    /// Merge layers lowest-precedence first.
    #[must_use]
    pub fn merged<'a>(layers: impl IntoIterator<Item = &'a Self>) -> Self {
        layers.into_iter().fold(Self::default(), |mut acc, layer| {
            acc.overlay(layer);
            acc
        })
    }

    /// Whether the layer defines no keys at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

//! The canonical, fully resolved cluster configuration.

use serde::Serialize;

/// Resolved configuration driving one provisioning run.
///
/// Invariants established by [`super::ConfigResolver::resolve`]:
/// - `dhis2_version` falls back to `name`, `db_version` to `dhis2_version`
/// - `context_path` is `/<name>` iff `custom_context`, otherwise empty
/// - `docker_image` is always rendered from `image`, never taken from input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    /// Cluster name
    pub name: String,
    /// DHIS2 core version
    pub dhis2_version: String,
    /// Demo database version
    pub db_version: String,
    /// Release channel, if any
    pub channel: Option<String>,
    /// Image template
    pub image: String,
    /// Rendered image reference
    pub docker_image: String,
    /// Image variant suffix, if any
    pub variant: Option<String>,
    /// Tomcat context path (`""` or `/<name>`)
    pub context_path: String,
    /// Whether a custom context path is used
    pub custom_context: bool,
    /// Exposed port
    pub port: u16,
    /// URL template of the demo database dump
    #[serde(rename = "demoDatabaseURL")]
    pub demo_database_url: String,
    /// Archive URL of the docker-compose template repository
    pub docker_compose_repository: String,
    /// Directory inside the template archive that holds the compose file
    pub docker_compose_directory: String,
}

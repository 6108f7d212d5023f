//! Built-in defaults, the lowest precedence layer.

use super::ClusterLayer;

/// Immutable built-in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Defaults {
    /// Image template
    pub image: &'static str,
    /// Exposed port
    pub port: u16,
    /// Archive URL of the docker-compose template repository
    pub docker_compose_repository: &'static str,
    /// Top-level directory of that archive
    pub docker_compose_directory: &'static str,
    /// URL template of the demo database dump
    pub demo_database_url: &'static str,
}

/// The defaults shipped with d2.
pub const DEFAULTS: Defaults = Defaults {
    image: "dhis2/core:{version}-latest-alpine",
    port: 8080,
    docker_compose_repository: "https://github.com/amcgee/dhis2-backend/archive/master.tar.gz",
    docker_compose_directory: "dhis2-backend-master",
    demo_database_url: "https://github.com/dhis2/dhis2-demo-db/blob/master/sierra-leone/{version}/dhis2-db-sierra-leone.sql.gz?raw=true",
};

impl Defaults {
    /// The defaults as a configuration layer.
    #[must_use]
    pub fn layer(&self) -> ClusterLayer {
        ClusterLayer {
            image: Some(self.image.to_string()),
            port: Some(self.port),
            docker_compose_repository: Some(self.docker_compose_repository.to_string()),
            docker_compose_directory: Some(self.docker_compose_directory.to_string()),
            demo_database_url: Some(self.demo_database_url.to_string()),
            ..ClusterLayer::default()
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        DEFAULTS
    }
}

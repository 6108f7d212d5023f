//! Runtime environment handed to the orchestration subprocess.

use crate::config::ClusterConfig;
use std::collections::BTreeMap;
use tracing::debug;

/// Cluster name.
pub const DHIS2_CORE_NAME: &str = "DHIS2_CORE_NAME";
/// Resolved image reference. The only variable carrying the image.
pub const DHIS2_CORE_IMAGE: &str = "DHIS2_CORE_IMAGE";
/// Tomcat context path.
pub const DHIS2_CORE_CONTEXT_PATH: &str = "DHIS2_CORE_CONTEXT_PATH";
/// DHIS2 core version.
pub const DHIS2_CORE_VERSION: &str = "DHIS2_CORE_VERSION";
/// Demo database version.
pub const DHIS2_CORE_DB_VERSION: &str = "DHIS2_CORE_DB_VERSION";
/// Exposed port.
pub const DHIS2_CORE_PORT: &str = "DHIS2_CORE_PORT";

/// Build the environment for `docker-compose`.
#[must_use]
pub fn make_environment(config: &ClusterConfig) -> BTreeMap<String, String> {
    let env: BTreeMap<String, String> = [
        (DHIS2_CORE_NAME, config.name.clone()),
        (DHIS2_CORE_IMAGE, config.docker_image.clone()),
        (DHIS2_CORE_CONTEXT_PATH, config.context_path.clone()),
        (DHIS2_CORE_VERSION, config.dhis2_version.clone()),
        (DHIS2_CORE_DB_VERSION, config.db_version.clone()),
        (DHIS2_CORE_PORT, config.port.to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    debug!(?env, "Runtime environment");
    env
}

/// Deterministic compose project name for a cluster.
///
/// Lowercased, with `.` turned into `_` and anything else outside
/// `[a-z0-9_-]` dropped, so `2.38` becomes `d2-cluster-2_38`.
#[must_use]
pub fn compose_project_name(name: &str) -> String {
    let suffix: String = name
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            '.' => Some('_'),
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' => Some(c),
            _ => None,
        })
        .collect();
    format!("d2-cluster-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClusterConfig {
        ClusterConfig {
            name: "dev".into(),
            dhis2_version: "2.41".into(),
            db_version: "2.40".into(),
            channel: Some("dev".into()),
            image: "dhis2/core{channel}:{version}".into(),
            docker_image: "dhis2/core-dev:2.41".into(),
            variant: None,
            context_path: "/dev".into(),
            custom_context: true,
            port: 8081,
            demo_database_url: "u".into(),
            docker_compose_repository: "r".into(),
            docker_compose_directory: "d".into(),
        }
    }

    #[test]
    fn test_make_environment() {
        let env = make_environment(&config());
        assert_eq!(env.len(), 6);
        assert_eq!(env[DHIS2_CORE_NAME], "dev");
        assert_eq!(env[DHIS2_CORE_IMAGE], "dhis2/core-dev:2.41");
        assert_eq!(env[DHIS2_CORE_CONTEXT_PATH], "/dev");
        assert_eq!(env[DHIS2_CORE_VERSION], "2.41");
        assert_eq!(env[DHIS2_CORE_DB_VERSION], "2.40");
        assert_eq!(env[DHIS2_CORE_PORT], "8081");
        assert!(!env.contains_key("DHIS2_CORE_TAG"));
    }

    #[test]
    fn test_compose_project_name() {
        assert_eq!(compose_project_name("2.38"), "d2-cluster-2_38");
        assert_eq!(compose_project_name("Dev Box"), "d2-cluster-devbox");
        assert_eq!(compose_project_name("2.38"), compose_project_name("2.38"));
    }

    #[test]
    fn test_compose_project_name_keeps_versions_apart() {
        let names = ["2.38", "238", "2.3.8", "23.8"];
        let projects: std::collections::BTreeSet<_> =
            names.iter().map(|n| compose_project_name(n)).collect();
        assert_eq!(projects.len(), names.len());
    }
}

//! Integration tests for configuration resolution
//!
//! Cover layer precedence, derived fields and the persisted record that
//! makes resolution self-healing.

use async_trait::async_trait;
use d2_cache::{CacheStore, Fetcher};
use d2_cluster::config::{LayerSource, PersistedRecord};
use d2_cluster::{ClusterArgs, ClusterLayer, ConfigResolver, DEFAULTS, StaticConfig};
use std::sync::Arc;
use tempfile::TempDir;

struct Offline;

#[async_trait]
impl Fetcher for Offline {
    async fn fetch(&self, url: &str) -> d2_cache::Result<Vec<u8>> {
        Err(d2_cache::Error::fetch(url, "offline"))
    }
}

fn cache(tmp: &TempDir) -> CacheStore {
    CacheStore::with_fetcher(tmp.path(), Arc::new(Offline))
}

fn record(cache: &CacheStore, name: &str) -> serde_json::Value {
    let bytes = cache.read(format!("clusters/{name}/config.json")).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn test_first_run_with_empty_inputs() {
    let tmp = TempDir::new().unwrap();
    let cache = cache(&tmp);
    let static_config = StaticConfig::default();
    let resolver = ConfigResolver::new(&DEFAULTS, &static_config, &cache);

    let config = resolver.resolve(&ClusterArgs::new("2.38")).unwrap();

    assert_eq!(config.dhis2_version, "2.38");
    assert_eq!(config.db_version, "2.38");
    assert_eq!(config.port, 8080);
    assert_eq!(config.docker_image, "dhis2/core:2.38-latest-alpine");
    assert_eq!(config.context_path, "");
    assert!(!config.custom_context);
}

#[test]
fn test_each_layer_overrides_the_one_below() {
    let tmp = TempDir::new().unwrap();
    let cache = cache(&tmp);

    // static config overrides defaults
    let static_config = StaticConfig::parse(
        r#"
        port = 8081
        image = "dhis2/core{channel}:{version}"
        channel = "dev"

        [clusters.dev]
        dhis2Version = "2.40"
        dbVersion = "2.39"
        "#,
    )
    .unwrap();

    // persisted record overrides static config
    cache
        .write_json(
            "clusters/dev/config.json",
            &PersistedRecord {
                port: Some(8082),
                ..PersistedRecord::default()
            },
        )
        .unwrap();

    let resolver = ConfigResolver::new(&DEFAULTS, &static_config, &cache);

    // live arguments override everything
    let args = ClusterArgs::new("dev").with_overrides(ClusterLayer {
        dhis2_version: Some("2.41".into()),
        ..ClusterLayer::default()
    });
    let config = resolver.resolve(&args).unwrap();

    assert_eq!(config.port, 8082);
    assert_eq!(config.dhis2_version, "2.41");
    assert_eq!(config.db_version, "2.39");
    assert_eq!(config.channel.as_deref(), Some("dev"));
    assert_eq!(config.docker_image, "dhis2/core-dev:2.41");
    assert_eq!(
        config.docker_compose_repository,
        DEFAULTS.docker_compose_repository
    );
}

#[test]
fn test_layers_expose_each_contribution() {
    let tmp = TempDir::new().unwrap();
    let cache = cache(&tmp);
    let static_config = StaticConfig::parse("[clusters.dev]\nport = 9000\n").unwrap();
    let resolver = ConfigResolver::new(&DEFAULTS, &static_config, &cache);

    let layers = resolver
        .layers(&ClusterArgs::new("dev").with_overrides(ClusterLayer {
            port: Some(9001),
            ..ClusterLayer::default()
        }))
        .unwrap();

    let port_of = |source| {
        layers
            .iter()
            .find(|l| l.source == source)
            .and_then(|l| l.values.port)
    };
    assert_eq!(port_of(LayerSource::Defaults), Some(8080));
    assert_eq!(port_of(LayerSource::StaticConfig), Some(9000));
    assert_eq!(port_of(LayerSource::Persisted), None);
    assert_eq!(port_of(LayerSource::Arguments), Some(9001));
}

#[test]
fn test_record_round_trip() {
    let tmp = TempDir::new().unwrap();
    let cache = cache(&tmp);
    let static_config = StaticConfig::default();
    let resolver = ConfigResolver::new(&DEFAULTS, &static_config, &cache);

    let first = resolver
        .resolve(&ClusterArgs::new("dev").with_overrides(ClusterLayer {
            dhis2_version: Some("2.40".into()),
            db_version: Some("2.39".into()),
            channel: Some("canary".into()),
            custom_context: Some(true),
            port: Some(8090),
            ..ClusterLayer::default()
        }))
        .unwrap();

    let second = resolver.resolve(&ClusterArgs::new("dev")).unwrap();

    assert_eq!(second.dhis2_version, first.dhis2_version);
    assert_eq!(second.db_version, first.db_version);
    assert_eq!(second.channel, first.channel);
    assert_eq!(second.image, first.image);
    assert_eq!(second.port, first.port);
    assert_eq!(second.custom_context, first.custom_context);
    assert_eq!(second.context_path, "/dev");
}

#[test]
fn test_record_has_exactly_six_keys() {
    let tmp = TempDir::new().unwrap();
    let cache = cache(&tmp);
    let static_config = StaticConfig::default();
    let resolver = ConfigResolver::new(&DEFAULTS, &static_config, &cache);

    resolver.resolve(&ClusterArgs::new("2.38")).unwrap();

    let value = record(&cache, "2.38");
    let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            "channel",
            "customContext",
            "dbVersion",
            "dhis2Version",
            "image",
            "port"
        ]
    );
    assert!(value["channel"].is_null());

    let text = String::from_utf8(cache.read("clusters/2.38/config.json").unwrap()).unwrap();
    assert!(text.contains("\n    \"dbVersion\": \"2.38\""));
}

#[test]
fn test_corrupt_record_is_rebuilt() {
    let tmp = TempDir::new().unwrap();
    let cache = cache(&tmp);
    cache
        .write("clusters/2.38/config.json", b"{ not json")
        .unwrap();

    let static_config = StaticConfig::default();
    let resolver = ConfigResolver::new(&DEFAULTS, &static_config, &cache);
    let config = resolver.resolve(&ClusterArgs::new("2.38")).unwrap();

    assert_eq!(config.port, 8080);
    assert_eq!(record(&cache, "2.38")["port"], 8080);
}

#[test]
fn test_db_version_follows_dhis2_version() {
    let tmp = TempDir::new().unwrap();
    let cache = cache(&tmp);
    let static_config = StaticConfig::default();
    let resolver = ConfigResolver::new(&DEFAULTS, &static_config, &cache);

    let config = resolver
        .resolve(&ClusterArgs::new("mine").with_overrides(ClusterLayer {
            dhis2_version: Some("2.39".into()),
            ..ClusterLayer::default()
        }))
        .unwrap();

    assert_eq!(config.db_version, "2.39");
}

#[test]
fn test_empty_strings_fall_through_to_lower_layers() {
    let tmp = TempDir::new().unwrap();
    let cache = cache(&tmp);
    let static_config = StaticConfig::parse(
        r#"
        image = ""
        demoDatabaseURL = ""

        [clusters."2.38"]
        dockerComposeDirectory = ""
        "#,
    )
    .unwrap();
    let resolver = ConfigResolver::new(&DEFAULTS, &static_config, &cache);

    let args = ClusterArgs::new("2.38").with_overrides(ClusterLayer {
        image: Some(String::new()),
        docker_compose_repository: Some(String::new()),
        ..ClusterLayer::default()
    });
    let config = resolver.resolve(&args).unwrap();

    assert_eq!(config.image, DEFAULTS.image);
    assert_eq!(config.docker_image, "dhis2/core:2.38-latest-alpine");
    assert_eq!(config.demo_database_url, DEFAULTS.demo_database_url);
    assert_eq!(
        config.docker_compose_repository,
        DEFAULTS.docker_compose_repository
    );
    assert_eq!(
        config.docker_compose_directory,
        DEFAULTS.docker_compose_directory
    );
    assert_eq!(record(&cache, "2.38")["image"], DEFAULTS.image);
}

//! Local DHIS2 clusters on docker-compose
//!
//! This crate turns a cluster name plus overrides into a running stack:
//! - [`config`] merges defaults, `cluster.toml`, the persisted record and
//!   live arguments into a [`ClusterConfig`]
//! - [`image`] renders image references from templates such as
//!   `dhis2/core{channel}:{version}`
//! - [`Provisioner`] caches the deployment template, seeds the database,
//!   patches the Tomcat context and runs `docker-compose`
//!
//! Everything on disk lives in a [`d2_cache::CacheStore`]; see [`layout`]
//! for the paths.

pub mod compose;
pub mod config;
pub mod environment;
mod error;
pub mod image;
pub mod layout;
pub mod paths;
pub mod provision;
pub mod seed;

// Re-export error types at crate root
pub use error::{Error, Result};

pub use compose::{ComposeInvocation, ComposeRunner, DockerCompose};
pub use config::{ClusterArgs, ClusterConfig, ClusterLayer, ConfigResolver, DEFAULTS, StaticConfig};
pub use environment::{compose_project_name, make_environment};
pub use image::{Substitutions, render_image};
pub use layout::clean_cluster;
pub use provision::{Provisioner, UpOptions};
pub use seed::{DumpSeeder, SeedRequest, Seeder};

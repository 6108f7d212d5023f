//! Cluster configuration types and resolution.
//!
//! Resolution merges four layers, lowest precedence first:
//!
//! 1. [`Defaults`] - built-in constants
//! 2. [`StaticConfig`] - `cluster.toml`, shared keys then the cluster's own table
//! 3. [`PersistedRecord`] - what the previous run resolved for this cluster
//! 4. [`ClusterArgs`] - the current command line
//!
//! Each layer only overrides the keys it defines. Derived fields are computed
//! after the merge and the record is written back on every run.

mod defaults;
mod layer;
mod record;
mod resolved;
mod resolver;
mod static_config;

pub use defaults::{DEFAULTS, Defaults};
pub use layer::ClusterLayer;
pub use record::PersistedRecord;
pub use resolved::ClusterConfig;
pub use resolver::{ClusterArgs, ConfigResolver, Layer, LayerSource};
pub use static_config::StaticConfig;

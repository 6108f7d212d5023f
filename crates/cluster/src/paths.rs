//! Platform-appropriate locations for d2 data.
//!
//! | Platform | Cache Dir | Config File |
//! |----------|-----------|-------------|
//! | **macOS** | `~/Library/Caches/d2` | `~/Library/Application Support/d2/cluster.toml` |
//! | **Linux** | `~/.cache/d2` (XDG_CACHE_HOME) | `~/.config/d2/cluster.toml` (XDG_CONFIG_HOME) |
//! | **Windows** | `%LOCALAPPDATA%\d2` | `%APPDATA%\d2\cluster.toml` |
//!
//! Environment overrides for testing and CI:
//! - `D2_CACHE_DIR` - Override cache directory
//! - `D2_CLUSTER_CONFIG` - Override the static cluster configuration file

use crate::{Error, Result};
use std::path::PathBuf;

/// Get the cache directory for d2.
///
/// Resolution order:
/// 1. `D2_CACHE_DIR` environment variable
/// 2. Platform cache directory + `/d2`
///
/// # Errors
///
/// Returns an error if the cache directory cannot be determined.
pub fn cache_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("D2_CACHE_DIR")
        && !dir.is_empty()
    {
        return Ok(PathBuf::from(dir));
    }

    let base = dirs::cache_dir().ok_or_else(|| {
        Error::configuration_with_help(
            "Could not determine cache directory",
            "Set D2_CACHE_DIR to a writable directory",
        )
    })?;

    Ok(base.join("d2"))
}

/// Get the path of the static cluster configuration file.
///
/// Resolution order:
/// 1. `D2_CLUSTER_CONFIG` environment variable
/// 2. Platform config directory + `/d2/cluster.toml`
///
/// # Errors
///
/// Returns an error if the config directory cannot be determined.
pub fn cluster_config_file() -> Result<PathBuf> {
    if let Ok(file) = std::env::var("D2_CLUSTER_CONFIG")
        && !file.is_empty()
    {
        return Ok(PathBuf::from(file));
    }

    let base = dirs::config_dir().ok_or_else(|| {
        Error::configuration_with_help(
            "Could not determine config directory",
            "Set D2_CLUSTER_CONFIG or pass --config",
        )
    })?;

    Ok(base.join("d2").join("cluster.toml"))
}

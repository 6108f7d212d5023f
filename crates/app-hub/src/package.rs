//! App package files read from the package root.
//!
//! Both files are parsed as plain JSON and nothing in them is executed.

use crate::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// App descriptor file name.
pub const D2_CONFIG_FILE: &str = "d2.config.json";
/// Package manifest file name.
pub const PACKAGE_FILE: &str = "package.json";

const BUNDLE_DIR: &str = "build/bundle";

/// The app descriptor (`d2.config.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDescriptor {
    /// `app`, `login_app`, `lib`, ...
    #[serde(rename = "type")]
    pub app_type: Option<String>,
    /// App Hub application id
    pub id: Option<String>,
    /// Human readable title
    pub title: Option<String>,
    /// Minimum supported DHIS2 version
    #[serde(rename = "minDHIS2Version")]
    pub min_dhis2_version: Option<String>,
    /// Maximum supported DHIS2 version
    #[serde(rename = "maxDHIS2Version")]
    pub max_dhis2_version: Option<String>,
}

impl AppDescriptor {
    /// Whether the descriptor describes a library rather than an app.
    #[must_use]
    pub fn is_library(&self) -> bool {
        self.app_type.as_deref() == Some("lib")
    }
}

/// The fields of `package.json` used for publishing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageManifest {
    /// Package name
    #[serde(default)]
    pub name: String,
    /// Package version
    #[serde(default)]
    pub version: String,
}

impl PackageManifest {
    /// Bundle produced by the app build, `build/bundle/<name>-<version>.zip`.
    ///
    /// Scoped names drop the scope, so `@dhis2/foo` bundles as `foo`.
    #[must_use]
    pub fn bundle_path(&self, pkg_root: &Path) -> PathBuf {
        let name = self.name.rsplit('/').next().unwrap_or(&self.name);
        pkg_root
            .join(BUNDLE_DIR)
            .join(format!("{name}-{}.zip", self.version))
    }
}

/// Read and parse a JSON file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and [`Error::Json`] if
/// it does not parse.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(e, path))?;
    serde_json::from_str(&text).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

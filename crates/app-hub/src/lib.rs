//! App Hub publishing for DHIS2 apps
//!
//! A release plugin with four stages:
//! - `verify_conditions` checks the package can be published and fails with a
//!   coded [`Error::Validation`] otherwise
//! - `publish` uploads `build/bundle/<name>-<version>.zip`
//! - `success` / `fail` report the outcome
//!
//! [`AppHubPlugin::run`] drives them in order.

mod client;
mod error;
mod package;
mod plugin;

// Re-export error types at crate root
pub use error::{Error, Result, ValidationCode};

pub use client::{AppHubClient, HttpAppHubClient, UploadRequest};
pub use package::{AppDescriptor, D2_CONFIG_FILE, PACKAGE_FILE, PackageManifest};
pub use plugin::{
    AppHubPlugin, DEFAULT_BASE_URL, DEFAULT_CHANNEL, PluginConfig, ReleaseContext, TOKEN_VAR,
};

//! Release lifecycle stages for App Hub publishing.

use crate::client::{AppHubClient, UploadRequest};
use crate::error::ValidationCode;
use crate::package::{AppDescriptor, D2_CONFIG_FILE, PACKAGE_FILE, PackageManifest, read_json};
use crate::{Error, Result};
use semver::Version;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Default App Hub instance.
pub const DEFAULT_BASE_URL: &str = "https://apps.dhis2.org";
/// Default release channel.
pub const DEFAULT_CHANNEL: &str = "stable";
/// Environment variable holding the App Hub API token.
pub const TOKEN_VAR: &str = "APP_HUB_TOKEN";

/// Plugin configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    /// Directory containing `d2.config.json` and `package.json`
    pub pkg_root: PathBuf,
    /// App Hub base URL
    pub base_url: String,
    /// Release channel
    pub channel: String,
}

impl PluginConfig {
    /// Configuration for `pkg_root` with the default App Hub and channel.
    #[must_use]
    pub fn new(pkg_root: impl Into<PathBuf>) -> Self {
        Self {
            pkg_root: pkg_root.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            channel: DEFAULT_CHANNEL.to_string(),
        }
    }
}

/// State of the release being made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseContext {
    /// Environment visible to the release
    pub env: BTreeMap<String, String>,
    /// Version about to be released
    pub next_version: Version,
}

impl ReleaseContext {
    /// Context using the current process environment.
    #[must_use]
    pub fn from_process(next_version: Version) -> Self {
        Self {
            env: std::env::vars().collect(),
            next_version,
        }
    }

    fn token(&self) -> Option<&str> {
        self.env
            .get(TOKEN_VAR)
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }
}

/// Files of a package that passed verification.
#[derive(Debug, Clone)]
struct VerifiedPackage {
    descriptor: AppDescriptor,
    manifest: PackageManifest,
    app_id: String,
    min_dhis2_version: String,
    token: String,
}

/// Verifies and publishes an app to the App Hub.
pub struct AppHubPlugin {
    config: PluginConfig,
    client: Arc<dyn AppHubClient>,
}

impl AppHubPlugin {
    /// Create a plugin uploading through `client`.
    #[must_use]
    pub fn new(config: PluginConfig, client: Arc<dyn AppHubClient>) -> Self {
        Self { config, client }
    }

    /// Check that the package can be published.
    ///
    /// # Errors
    ///
    /// Returns the first failing precondition as [`Error::Validation`].
    pub fn verify_conditions(&self, ctx: &ReleaseContext) -> Result<()> {
        self.verify(ctx).map(|_| ())
    }

    fn verify(&self, ctx: &ReleaseContext) -> Result<VerifiedPackage> {
        let pkg_root = &self.config.pkg_root;
        let config_path = pkg_root.join(D2_CONFIG_FILE);
        let package_path = pkg_root.join(PACKAGE_FILE);

        if !config_path.is_file() {
            return Err(Error::validation(
                ValidationCode::MissingD2Config,
                format!(
                    "Failed to locate {D2_CONFIG_FILE} file, does it exist in {}?",
                    pkg_root.display()
                ),
                format!("{D2_CONFIG_FILE} is necessary to automatically publish to the App Hub"),
            ));
        }
        let descriptor: AppDescriptor = read_json(&config_path)?;

        if !package_path.is_file() {
            return Err(Error::validation(
                ValidationCode::MissingPackage,
                format!(
                    "Failed to locate {PACKAGE_FILE} file, does it exist in {}?",
                    pkg_root.display()
                ),
                format!("{PACKAGE_FILE} is necessary to automatically publish to the App Hub"),
            ));
        }
        let manifest: PackageManifest = read_json(&package_path)?;

        let behind = Version::parse(&manifest.version).map_or(true, |v| v < ctx.next_version);
        if behind {
            return Err(Error::validation(
                ValidationCode::PackageVersion,
                format!(
                    "Wrong version detected in {}, expected {} but got {}.",
                    package_path.display(),
                    ctx.next_version,
                    manifest.version
                ),
                format!(
                    "The version in {PACKAGE_FILE} should be updated to the next release version before publishing."
                ),
            ));
        }

        if descriptor.is_library() {
            return Err(Error::validation(
                ValidationCode::AppHubSupport,
                "App Hub does not support publishing libraries.",
                format!("The type in {D2_CONFIG_FILE} must not be 'lib'"),
            ));
        }

        let Some(app_id) = descriptor.id.clone().filter(|id| !id.is_empty()) else {
            return Err(Error::validation(
                ValidationCode::MissingAppHubId,
                format!("'id' field missing from {D2_CONFIG_FILE}"),
                format!("The App Hub application id must be defined in {D2_CONFIG_FILE}"),
            ));
        };

        let Some(min_dhis2_version) = descriptor
            .min_dhis2_version
            .clone()
            .filter(|v| !v.is_empty())
        else {
            return Err(Error::validation(
                ValidationCode::MissingMinDhis2Version,
                format!("'minDHIS2Version' field missing from {D2_CONFIG_FILE}"),
                format!("The minimum supported DHIS2 version must be defined in {D2_CONFIG_FILE}"),
            ));
        };

        let Some(token) = ctx.token() else {
            return Err(Error::validation(
                ValidationCode::MissingAppHubToken,
                format!("{TOKEN_VAR} is missing from the environment"),
                format!("You need to supply the API token to the {TOKEN_VAR} env var."),
            ));
        };

        Ok(VerifiedPackage {
            descriptor,
            manifest,
            app_id,
            min_dhis2_version,
            token: token.to_string(),
        })
    }

    /// Upload the built bundle.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the package no longer verifies, or
    /// [`Error::Publish`] if the upload fails.
    #[instrument(skip_all, fields(pkg_root = %self.config.pkg_root.display()))]
    pub async fn publish(&self, ctx: &ReleaseContext) -> Result<()> {
        let package = self.verify(ctx)?;
        let bundle = package.manifest.bundle_path(&self.config.pkg_root);

        self.client
            .upload(&UploadRequest {
                base_url: self.config.base_url.clone(),
                app_id: package.app_id,
                token: package.token,
                bundle,
                version: package.manifest.version,
                channel: self.config.channel.clone(),
                min_dhis_version: package.min_dhis2_version,
                max_dhis_version: package.descriptor.max_dhis2_version,
            })
            .await
    }

    /// Report a successful release.
    pub fn success(&self, ctx: &ReleaseContext) {
        info!(
            version = %ctx.next_version,
            channel = %self.config.channel,
            "Published successfully to the App Hub"
        );
    }

    /// Report a failed release.
    pub fn fail(&self, ctx: &ReleaseContext, err: &Error) {
        error!(
            version = %ctx.next_version,
            code = err.validation_code().map(|c| c.as_str()),
            error = %err,
            "Publishing to the App Hub failed"
        );
    }

    /// Run verify, publish and success, reporting failure on the way out.
    ///
    /// # Errors
    ///
    /// Returns the error of the stage that failed.
    pub async fn run(&self, ctx: &ReleaseContext) -> Result<()> {
        let result = match self.verify_conditions(ctx) {
            Ok(()) => self.publish(ctx).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                self.success(ctx);
                Ok(())
            }
            Err(e) => {
                self.fail(ctx, &e);
                Err(e)
            }
        }
    }
}

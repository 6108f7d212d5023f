//! App Hub upload client.

use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// One app version to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// App Hub base URL
    pub base_url: String,
    /// App Hub application id
    pub app_id: String,
    /// API token
    pub token: String,
    /// Built bundle to upload
    pub bundle: PathBuf,
    /// Version being released
    pub version: String,
    /// Release channel
    pub channel: String,
    /// Minimum supported DHIS2 version
    pub min_dhis_version: String,
    /// Maximum supported DHIS2 version
    pub max_dhis_version: Option<String>,
}

impl UploadRequest {
    /// Endpoint receiving new versions of the app.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}/api/v2/apps/{}/versions",
            self.base_url.trim_end_matches('/'),
            self.app_id
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionMetadata<'a> {
    version: &'a str,
    channel: &'a str,
    min_dhis_version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_dhis_version: Option<&'a str>,
}

/// Uploads app versions to the App Hub.
#[async_trait]
pub trait AppHubClient: Send + Sync {
    /// Upload `request`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Publish`] if the upload is rejected or fails.
    async fn upload(&self, request: &UploadRequest) -> Result<()>;
}

/// [`AppHubClient`] over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpAppHubClient {
    client: Client,
}

impl HttpAppHubClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("d2/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::publish(format!("Failed to create HTTP client: {e}"), None))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl AppHubClient for HttpAppHubClient {
    async fn upload(&self, request: &UploadRequest) -> Result<()> {
        let bytes = tokio::fs::read(&request.bundle)
            .await
            .map_err(|e| Error::io(e, &request.bundle))?;
        let file_name = request
            .bundle
            .file_name()
            .map_or_else(|| "app.zip".to_string(), |n| n.to_string_lossy().into_owned());

        let metadata = serde_json::to_string(&VersionMetadata {
            version: &request.version,
            channel: &request.channel,
            min_dhis_version: &request.min_dhis_version,
            max_dhis_version: request.max_dhis_version.as_deref(),
        })
        .map_err(|e| Error::publish(format!("Failed to encode version metadata: {e}"), None))?;

        let file = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/zip")
            .map_err(|e| Error::publish(e.to_string(), None))?;
        let form = Form::new().part("file", file).text("version", metadata);

        let endpoint = request.endpoint();
        info!(%endpoint, version = %request.version, "Uploading app bundle");

        let response = self
            .client
            .post(&endpoint)
            .header("Authorization", format!("Bearer {}", request.token))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::publish(e.to_string(), None))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::publish(
                format!("{status}: {body}"),
                Some(status.as_u16()),
            ));
        }

        debug!(%status, "Upload accepted");
        Ok(())
    }
}

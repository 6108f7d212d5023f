//! `d2 app` commands.

use d2_app_hub::{AppHubPlugin, HttpAppHubClient, PluginConfig, ReleaseContext};
use semver::Version;
use std::sync::Arc;

/// `d2 app publish`
pub async fn publish(config: PluginConfig, next_version: Version) -> miette::Result<()> {
    let client = Arc::new(HttpAppHubClient::new()?);
    let plugin = AppHubPlugin::new(config, client);
    plugin
        .run(&ReleaseContext::from_process(next_version))
        .await?;
    Ok(())
}

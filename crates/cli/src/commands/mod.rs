pub mod app;
pub mod cluster;
pub mod version;

use crate::cli::{AppCommands, ClusterCommands, Commands};
use tracing::Instrument;

/// Run a parsed command.
pub async fn execute(command: Commands) -> miette::Result<()> {
    match command {
        Commands::Version => {
            let _span = crate::command_span!("version").entered();
            version::execute();
            Ok(())
        }
        Commands::Cluster { subcommand } => match subcommand {
            ClusterCommands::Up {
                target,
                seed,
                seed_file,
                update,
            } => {
                let options = d2_cluster::UpOptions {
                    seed,
                    seed_file,
                    update,
                };
                cluster::up(&target, &options)
                    .instrument(crate::command_span!("cluster up"))
                    .await
            }
            ClusterCommands::Config { target } => {
                let _span = crate::command_span!("cluster config").entered();
                cluster::config(&target)
            }
            ClusterCommands::Clean { name } => {
                let _span = crate::command_span!("cluster clean").entered();
                cluster::clean(&name)
            }
        },
        Commands::App { subcommand } => match subcommand {
            AppCommands::Publish {
                pkg_root,
                next_version,
                base_url,
                channel,
            } => {
                let config = d2_app_hub::PluginConfig {
                    pkg_root,
                    base_url,
                    channel,
                };
                app::publish(config, next_version)
                    .instrument(crate::command_span!("app publish"))
                    .await
            }
        },
    }
}

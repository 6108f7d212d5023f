use crate::tracing::{LogLevel, TracingFormat};
use clap::{Args, Parser, Subcommand};
use d2_app_hub::{DEFAULT_BASE_URL, DEFAULT_CHANNEL};
use d2_cluster::ClusterLayer;
use semver::Version;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "d2")]
#[command(about = "Run local DHIS2 clusters and publish apps to the App Hub")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "info",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(long, global = true, help = "Log output format", value_enum)]
    pub format: Option<TracingFormat>,

    #[arg(long, global = true, help = "Output logs in JSON format")]
    pub json: bool,
}

impl Cli {
    /// Format requested by `--json` or `--format`, compact otherwise.
    pub fn tracing_format(&self) -> TracingFormat {
        if self.json {
            TracingFormat::Json
        } else {
            self.format.unwrap_or(TracingFormat::Compact)
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Show version information")]
    Version,
    #[command(about = "Manage local DHIS2 clusters")]
    Cluster {
        #[command(subcommand)]
        subcommand: ClusterCommands,
    },
    #[command(about = "Front-end application commands")]
    App {
        #[command(subcommand)]
        subcommand: AppCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ClusterCommands {
    #[command(about = "Spin up a new cluster")]
    Up {
        #[command(flatten)]
        target: ClusterTarget,

        #[arg(short = 's', long, help = "Seed the demo database")]
        seed: bool,

        #[arg(long, help = "Seed from a local .sql.gz dump")]
        seed_file: Option<PathBuf>,

        #[arg(short = 'u', long, help = "Refresh the cached template and database dump")]
        update: bool,
    },
    #[command(about = "Print the resolved configuration of a cluster")]
    Config {
        #[command(flatten)]
        target: ClusterTarget,
    },
    #[command(about = "Remove everything cached for a cluster")]
    Clean {
        #[arg(help = "Cluster name")]
        name: String,
    },
}

/// Cluster name plus the overrides forming the highest configuration layer.
///
/// None of these have clap defaults: an absent flag must leave lower layers
/// in charge.
#[derive(Args, Debug, Clone, Default)]
pub struct ClusterTarget {
    #[arg(help = "Cluster name, usually a DHIS2 version such as 2.38")]
    pub name: String,

    #[arg(long, help = "Demo database version")]
    pub db_version: Option<String>,

    #[arg(long, help = "DHIS2 core version")]
    pub dhis2_version: Option<String>,

    #[arg(long, help = "Release channel (stable, dev, canary)")]
    pub channel: Option<String>,

    #[arg(long, help = "Image template, e.g. dhis2/core{channel}:{version}")]
    pub image: Option<String>,

    #[arg(long, help = "Image variant appended to the tag")]
    pub variant: Option<String>,

    #[arg(
        short = 'c',
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Serve DHIS2 under /<name> instead of /; --custom-context=false goes back to /"
    )]
    pub custom_context: Option<bool>,

    #[arg(short = 'p', long, help = "Port to expose DHIS2 on [default: 8080]")]
    pub port: Option<u16>,

    #[arg(long, help = "Static cluster configuration file")]
    pub config: Option<PathBuf>,
}

impl ClusterTarget {
    /// The command line as a configuration layer.
    pub fn overrides(&self) -> ClusterLayer {
        ClusterLayer {
            db_version: self.db_version.clone(),
            dhis2_version: self.dhis2_version.clone(),
            channel: self.channel.clone(),
            image: self.image.clone(),
            variant: self.variant.clone(),
            custom_context: self.custom_context,
            port: self.port,
            ..ClusterLayer::default()
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum AppCommands {
    #[command(about = "Verify and publish an app to the App Hub")]
    Publish {
        #[arg(long, default_value = ".", help = "Directory containing d2.config.json")]
        pkg_root: PathBuf,

        #[arg(long, help = "Version being released")]
        next_version: Version,

        #[arg(long, default_value = DEFAULT_BASE_URL, help = "App Hub base URL")]
        base_url: String,

        #[arg(long, default_value = DEFAULT_CHANNEL, help = "Release channel")]
        channel: String,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}

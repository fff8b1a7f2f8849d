// CLI module for handling command-line interface

use crate::commands::OutputFormat;
use crate::software::{Package, ReleaseType};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ardl")]
#[command(version)]
#[command(about = "Find and download Arista EOS and CloudVision images")]
pub struct Cli {
    /// Arista API token (overrides ARISTA_TOKEN and ardl.toml)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Read the folder tree from an XML file instead of the portal
    #[arg(long, global = true, value_name = "XML")]
    pub catalog_file: Option<PathBuf>,

    /// Log verbosity (overrides RUST_LOG)
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Query the software catalog
    Info {
        #[command(subcommand)]
        command: InfoCommands,
    },
    /// Download images
    Get {
        #[command(subcommand)]
        command: GetCommands,
    },
    /// Troubleshooting helpers
    Debug {
        #[command(subcommand)]
        command: DebugCommands,
    },
}

#[derive(Args)]
pub struct PackageArgs {
    /// eos or cvp
    #[arg(long, default_value = "eos")]
    pub package: Package,

    #[arg(long, value_enum, default_value_t = OutputFormat::Fancy)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct FilterArgs {
    /// MAJOR.MINOR branch, e.g. 4.29
    #[arg(long)]
    pub branch: Option<String>,

    /// Release letter: M, F or I (INT is an alias for I). Builds with the
    /// -INT marker keep their own letter, so 4.32.0F-INT matches F
    #[arg(long)]
    pub release_type: Option<ReleaseType>,
}

#[derive(Subcommand)]
pub enum InfoCommands {
    /// List published versions, newest first
    Versions {
        #[command(flatten)]
        package: PackageArgs,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show the newest version matching the filters
    Latest {
        #[command(flatten)]
        package: PackageArgs,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// List branches
    Branches {
        #[command(flatten)]
        package: PackageArgs,
    },
    /// Show the flavor table
    Mapping {
        #[command(flatten)]
        package: PackageArgs,
    },
    /// List the files published for one version
    Files {
        #[command(flatten)]
        package: PackageArgs,
        #[arg(long)]
        version: String,
    },
}

#[derive(Args)]
pub struct TransferArgs {
    /// Output directory (default from ardl.toml, else the current directory)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Show what would be downloaded without downloading
    #[arg(long)]
    pub dry_run: bool,

    /// Download again even if the file exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct DockerArgs {
    /// Import the container image into Docker
    #[arg(long)]
    pub import_docker: bool,

    #[arg(long, requires = "import_docker")]
    pub docker_name: Option<String>,

    #[arg(long, requires = "import_docker")]
    pub docker_tag: Option<String>,
}

#[derive(Subcommand)]
pub enum GetCommands {
    /// Download an EOS image
    Eos {
        /// Image flavor (see `ardl info mapping`)
        #[arg(long)]
        format: Option<String>,

        #[arg(long, conflicts_with = "latest", required_unless_present = "latest")]
        version: Option<String>,

        /// Pick the newest version matching --branch/--release-type
        #[arg(long)]
        latest: bool,

        #[arg(long, requires = "latest")]
        branch: Option<String>,

        /// Release letter: M, F or I (INT is an alias for I). Builds with
        /// the -INT marker keep their own letter, so 4.32.0F-INT matches F
        #[arg(long, requires = "latest")]
        release_type: Option<ReleaseType>,

        #[command(flatten)]
        transfer: TransferArgs,

        #[command(flatten)]
        docker: DockerArgs,

        /// Provision the vEOS image on this EVE-NG host
        #[arg(long, conflicts_with = "import_docker")]
        eve_ng: bool,

        /// Reuse the image already on disk
        #[arg(long)]
        skip_download: bool,
    },
    /// Download a CloudVision image
    Cvp {
        /// Image flavor (see `ardl info mapping --package cvp`)
        #[arg(long)]
        format: Option<String>,

        #[arg(long, conflicts_with = "latest", required_unless_present = "latest")]
        version: Option<String>,

        #[arg(long)]
        latest: bool,

        #[arg(long, requires = "latest")]
        branch: Option<String>,

        #[command(flatten)]
        transfer: TransferArgs,
    },
    /// Download a file by its server path
    Path {
        #[arg(long)]
        source: String,

        #[command(flatten)]
        transfer: TransferArgs,

        #[command(flatten)]
        docker: DockerArgs,
    },
}

#[derive(Subcommand)]
pub enum DebugCommands {
    /// Save the raw folder tree XML
    Xml {
        #[arg(long)]
        output: PathBuf,
    },
}

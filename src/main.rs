mod checksum;
mod cli;
mod commands;
mod config;
mod constants;
mod deploy;
mod download;
mod error;
mod software;
mod sources;
mod ui;

use clap::Parser;
use cli::{Cli, Commands, DebugCommands, GetCommands, InfoCommands};
use commands::Context;
use commands::get::{DeployOptions, DockerOptions, TransferOptions, VersionChoice};
use software::{Package, VersionFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    if let Err(e) = run(cli).await {
        ui::error(&format!("{:#}", e));
        if let Some(core) = e.chain().find_map(|c| c.downcast_ref::<error::Error>()) {
            ui::hint(&core.hint());
        }
        std::process::exit(1);
    }
}

fn init_logging(level: Option<cli::LogLevel>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.filter_level(level.into());
    }
    builder.init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    software::flavor::validate_table()?;

    let settings = config::Settings::load()?.with_token(cli.token);
    let ctx = Context::new(settings, cli.catalog_file);

    match cli.command {
        Commands::Info { command } => match command {
            InfoCommands::Versions { package, filter } => {
                let filter = VersionFilter::new(filter.branch, filter.release_type);
                commands::info::versions(&ctx, package.package, filter, package.format).await
            }
            InfoCommands::Latest { package, filter } => {
                let filter = VersionFilter::new(filter.branch, filter.release_type);
                commands::info::latest(&ctx, package.package, filter, package.format).await
            }
            InfoCommands::Branches { package } => {
                commands::info::branches(&ctx, package.package, package.format).await
            }
            InfoCommands::Mapping { package } => {
                commands::info::mapping(package.package, package.format)
            }
            InfoCommands::Files { package, version } => {
                commands::info::files(&ctx, package.package, &version, package.format).await
            }
        },
        Commands::Get { command } => match command {
            GetCommands::Eos {
                format,
                version,
                latest: _,
                branch,
                release_type,
                transfer,
                docker,
                eve_ng,
                skip_download,
            } => {
                let deploy = DeployOptions {
                    docker: docker_options(docker),
                    eve_ng,
                    skip_download,
                };
                commands::get::software(
                    &ctx,
                    Package::Eos,
                    format.as_deref(),
                    version_choice(version, branch, release_type),
                    transfer_options(transfer),
                    deploy,
                )
                .await
            }
            GetCommands::Cvp {
                format,
                version,
                latest: _,
                branch,
                transfer,
            } => {
                commands::get::software(
                    &ctx,
                    Package::Cvp,
                    format.as_deref(),
                    version_choice(version, branch, None),
                    transfer_options(transfer),
                    DeployOptions::default(),
                )
                .await
            }
            GetCommands::Path {
                source,
                transfer,
                docker,
            } => {
                commands::get::path(
                    &ctx,
                    &source,
                    transfer_options(transfer),
                    docker_options(docker),
                )
                .await
            }
        },
        Commands::Debug { command } => match command {
            DebugCommands::Xml { output } => commands::debug::xml(&ctx, &output).await,
        },
    }
}

/// `--version` wins; clap guarantees `--latest` otherwise
fn version_choice(
    version: Option<String>,
    branch: Option<String>,
    release_type: Option<software::ReleaseType>,
) -> VersionChoice {
    match version {
        Some(raw) => VersionChoice::Exact(raw),
        None => VersionChoice::Latest(VersionFilter::new(branch, release_type)),
    }
}

fn transfer_options(args: cli::TransferArgs) -> TransferOptions {
    TransferOptions {
        output_dir: args.output,
        dry_run: args.dry_run,
        force: args.force,
    }
}

fn docker_options(args: cli::DockerArgs) -> DockerOptions {
    DockerOptions {
        import: args.import_docker,
        name: args.docker_name,
        tag: args.docker_tag,
    }
}

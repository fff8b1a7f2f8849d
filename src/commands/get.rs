// Get commands: resolve an image in the catalog, download it, verify it and
// optionally hand it to Docker or EVE-NG

use crate::checksum::{self, ChecksumKind};
use crate::commands::Context;
use crate::deploy::{docker, eveng};
use crate::download::{self, CancelFlag, DownloadJob, DownloadOutcome};
use crate::software::{FlavorMapping, Package, Version, VersionFilter, catalog, flavor, selector};
use crate::sources::CatalogSource;
use crate::sources::http::extract_filename;
use crate::ui;
use anyhow::Result;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Which version the user asked for
#[derive(Debug, Clone)]
pub enum VersionChoice {
    Exact(String),
    Latest(VersionFilter),
}

/// Flags shared by every get command
#[derive(Debug, Clone, Default)]
pub struct TransferOptions {
    pub output_dir: Option<PathBuf>,
    pub dry_run: bool,
    pub force: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DockerOptions {
    pub import: bool,
    pub name: Option<String>,
    pub tag: Option<String>,
}

/// What to do with the image once it is on disk
#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    pub docker: DockerOptions,
    pub eve_ng: bool,
    /// Reuse an image already in the output directory
    pub skip_download: bool,
}

/// Download a package image of `flavor_key` (package default when unset)
pub async fn software(
    ctx: &Context,
    package: Package,
    flavor_key: Option<&str>,
    choice: VersionChoice,
    transfer: TransferOptions,
    deploy: DeployOptions,
) -> Result<()> {
    let mapping = flavor::lookup(package, flavor_key.unwrap_or(package.default_flavor()))?;
    check_deploy_flags(mapping, &deploy)?;

    let source = ctx.source()?;
    let tree = ctx.fetch_tree(source.as_ref()).await?;

    let version = match choice {
        VersionChoice::Exact(raw) => Version::parse(&raw, package)?,
        VersionChoice::Latest(filter) => {
            let version =
                selector::latest(catalog::available_versions(&tree, package), package, &filter)?;
            info!("Latest {} matching {} is {}", package, filter, version);
            version
        }
    };

    let file_path = catalog::resolve_file_path(&tree, &version, mapping)?;
    let checksum_path = catalog::resolve_checksum_path(&file_path, package);
    debug!("Resolved {} {} to {}", version, mapping.flavor, file_path);

    let output_dir = if deploy.eve_ng {
        eveng::image_dir(&version)
    } else {
        transfer
            .output_dir
            .clone()
            .unwrap_or_else(|| ctx.settings.download.output_dir.clone())
    };
    let image = output_dir.join(extract_filename(&file_path));
    let reference = docker::image_reference(
        deploy
            .docker
            .name
            .as_deref()
            .unwrap_or(&ctx.settings.docker.name),
        deploy
            .docker
            .tag
            .as_deref()
            .unwrap_or(&version.to_string()),
    );

    if transfer.dry_run {
        ui::status("[dry-run]", &format!("{} {} ({})", package, version, mapping.flavor));
        ui::status("[dry-run]", &format!("Would download {}", file_path));
        ui::status("[dry-run]", &format!("Would download {}", checksum_path));
        ui::status("[dry-run]", &format!("Destination {}", image.display()));
        if deploy.docker.import {
            ui::status("[dry-run]", &format!("Would import as {}", reference));
        }
        if deploy.eve_ng {
            ui::status(
                "[dry-run]",
                &format!("Would convert to {}", output_dir.join(eveng::DISK_NAME).display()),
            );
        }
        return Ok(());
    }

    if deploy.docker.import {
        docker::check_docker_available().await?;
        if !transfer.force && docker::image_exists(&reference).await? {
            ui::success(&format!("{} already present in Docker, skipping", reference));
            return Ok(());
        }
    }
    if deploy.eve_ng {
        eveng::check_eve_host().await?;
    }

    if deploy.skip_download {
        if !image.exists() {
            anyhow::bail!(
                "--skip-download given but {} does not exist. Run without it first.",
                image.display()
            );
        }
        ui::dim(&format!("Using existing {}", image.display()));
    } else {
        ui::action(&format!("Downloading {} {} ({})", package, version, mapping.flavor));
        let outcomes = fetch(
            ctx,
            source.as_ref(),
            &[file_path.as_str(), checksum_path.as_str()],
            &output_dir,
            transfer.force,
        )
        .await?;
        verify(&outcomes, ChecksumKind::for_package(package)).await?;
    }

    if deploy.docker.import {
        docker::import_image(&image, &reference).await?;
        ui::success(&format!("Imported {} as {}", image.display(), reference));
    }
    if deploy.eve_ng {
        let disk = eveng::provision(&image).await?;
        ui::success(&format!("EVE-NG image ready at {}", disk.display()));
    }
    Ok(())
}

/// Download one file by its server path, without a checksum
pub async fn path(
    ctx: &Context,
    server_path: &str,
    transfer: TransferOptions,
    docker_options: DockerOptions,
) -> Result<()> {
    let file_name = extract_filename(server_path);
    if file_name.is_empty() {
        anyhow::bail!("'{}' does not name a file", server_path);
    }
    if docker_options.import && !file_name.contains(".tar") {
        anyhow::bail!("--import-docker needs a container archive, got '{}'", file_name);
    }

    let output_dir = transfer
        .output_dir
        .clone()
        .unwrap_or_else(|| ctx.settings.download.output_dir.clone());
    let reference = docker::image_reference(
        docker_options
            .name
            .as_deref()
            .unwrap_or(&ctx.settings.docker.name),
        docker_options.tag.as_deref().unwrap_or("latest"),
    );

    if transfer.dry_run {
        ui::status("[dry-run]", &format!("Would download {}", server_path));
        ui::status(
            "[dry-run]",
            &format!("Destination {}", output_dir.join(&file_name).display()),
        );
        if docker_options.import {
            ui::status("[dry-run]", &format!("Would import as {}", reference));
        }
        return Ok(());
    }

    if docker_options.import {
        docker::check_docker_available().await?;
    }

    let source = ctx.source()?;
    let outcomes = fetch(ctx, source.as_ref(), &[server_path], &output_dir, transfer.force).await?;

    if docker_options.import
        && let Some(outcome) = outcomes.first()
    {
        docker::import_image(outcome.path(), &reference).await?;
        ui::success(&format!("Imported {} as {}", outcome.path().display(), reference));
    }
    Ok(())
}

/// Refuse deployment targets the flavor cannot serve, before any network I/O
fn check_deploy_flags(mapping: &FlavorMapping, deploy: &DeployOptions) -> Result<()> {
    let containers = || {
        flavor::flavors(mapping.package)
            .iter()
            .filter(|m| m.is_container())
            .map(|m| m.flavor)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let disks = || {
        flavor::flavors(mapping.package)
            .iter()
            .filter(|m| m.is_virtual_disk())
            .map(|m| m.flavor)
            .collect::<Vec<_>>()
            .join(", ")
    };

    if deploy.docker.import && !mapping.is_container() {
        anyhow::bail!(
            "--import-docker needs a container flavor ({}), got '{}'",
            containers(),
            mapping.flavor
        );
    }
    if deploy.eve_ng && !mapping.is_virtual_disk() {
        anyhow::bail!(
            "--eve-ng needs a virtual disk flavor ({}), got '{}'",
            disks(),
            mapping.flavor
        );
    }
    if deploy.docker.import && deploy.eve_ng {
        anyhow::bail!("--import-docker and --eve-ng cannot be combined");
    }
    Ok(())
}

/// Resolve download links for `server_paths` and fetch them in parallel
async fn fetch(
    ctx: &Context,
    source: &dyn CatalogSource,
    server_paths: &[&str],
    output_dir: &Path,
    force: bool,
) -> Result<Vec<DownloadOutcome>> {
    let pb = ui::spinner("Requesting download links...");
    let mut jobs = Vec::with_capacity(server_paths.len());
    for server_path in server_paths {
        let url = match source.download_url(server_path).await {
            Ok(url) => url,
            Err(e) => {
                ui::finish_spinner_error(&pb, "Could not get a download link");
                return Err(e);
            }
        };
        jobs.push(DownloadJob::new(url, extract_filename(server_path), output_dir));
    }
    ui::clear_bar(&pb);

    let cancel = CancelFlag::new();
    let _interrupts = cancel.listen_for_ctrl_c();
    download::download_all(jobs, ctx.settings.download.parallel, force, &cancel).await
}

/// Check the image (first outcome) against its checksum file (second)
async fn verify(outcomes: &[DownloadOutcome], kind: ChecksumKind) -> Result<()> {
    let [image, checksum_file] = outcomes else {
        anyhow::bail!("Expected an image and its checksum file");
    };

    let pb = ui::spinner(&format!("Verifying {} checksum...", kind.name()));
    let result = checksum::verify_file_async(
        image.path().to_path_buf(),
        checksum_file.path().to_path_buf(),
        kind,
    )
    .await;
    match result {
        Ok(()) => {
            ui::finish_spinner_success(&pb, &format!("{} checksum verified", kind.name()));
            Ok(())
        }
        Err(e) => {
            ui::finish_spinner_error(&pb, "Checksum verification failed");
            Err(e.context(format!(
                "{} was kept but is unverified",
                image.path().display()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deploy(import: bool, eve_ng: bool) -> DeployOptions {
        DeployOptions {
            docker: DockerOptions {
                import,
                ..Default::default()
            },
            eve_ng,
            skip_download: false,
        }
    }

    #[test]
    fn test_docker_needs_container_flavor() {
        let ceos = flavor::lookup(Package::Eos, "cEOS").unwrap();
        let swi = flavor::lookup(Package::Eos, "64").unwrap();
        check_deploy_flags(ceos, &deploy(true, false)).unwrap();

        let err = check_deploy_flags(swi, &deploy(true, false)).unwrap_err();
        assert!(err.to_string().contains("cEOS, cEOS64, cEOSarm"));
    }

    #[test]
    fn test_eve_ng_needs_vmdk_flavor() {
        let veos = flavor::lookup(Package::Eos, "vEOS-lab").unwrap();
        let ceos = flavor::lookup(Package::Eos, "cEOS").unwrap();
        check_deploy_flags(veos, &deploy(false, true)).unwrap();
        assert!(check_deploy_flags(ceos, &deploy(false, true)).is_err());
    }

    #[tokio::test]
    async fn test_verify_reports_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("cvp-2024.3.0.ova");
        let sum = dir.path().join("cvp-2024.3.0.ova.md5");
        std::fs::write(&image, b"hello world").unwrap();
        std::fs::write(&sum, "ffffffffffffffffffffffffffffffff  cvp-2024.3.0.ova").unwrap();

        let outcomes = vec![
            DownloadOutcome::Downloaded(image),
            DownloadOutcome::Cached(sum),
        ];
        let err = verify(&outcomes, ChecksumKind::Md5).await.unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("unverified"));
        assert!(message.contains("Checksum mismatch"));
    }
}

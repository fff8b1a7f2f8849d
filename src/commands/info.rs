// Info commands: list versions, branches, flavors and published files

use crate::commands::{Context, OutputFormat};
use crate::error::Error;
use crate::software::{Package, Version, VersionFilter, catalog, flavor, selector};
use crate::ui;
use anyhow::Result;
use serde_json::json;

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    ui::raw(&serde_json::to_string_pretty(value)?);
    Ok(())
}

fn release_label(version: &Version) -> String {
    let mut label = match version.release_type() {
        Some(release_type) => release_type.name().to_string(),
        None => String::new(),
    };
    if version.is_internal() {
        label.push_str(" (internal)");
    }
    label
}

/// Every published version matching `filter`, newest first
pub async fn versions(
    ctx: &Context,
    package: Package,
    filter: VersionFilter,
    format: OutputFormat,
) -> Result<()> {
    let tree = ctx.load_tree().await?;
    let mut versions = selector::select(catalog::available_versions(&tree, package), &filter);
    if versions.is_empty() {
        return Err(Error::NoMatchingVersion {
            package,
            filter: filter.to_string(),
        }
        .into());
    }
    versions.reverse();

    match format {
        OutputFormat::Json => print_json(&versions)?,
        OutputFormat::Text => {
            for version in &versions {
                ui::raw(&version.to_string());
            }
        }
        OutputFormat::Fancy => {
            ui::header(&format!("{} versions ({})", package, filter));
            let width = versions.iter().map(|v| v.to_string().len()).max().unwrap_or(0);
            for version in &versions {
                ui::row(
                    &version.to_string(),
                    width,
                    &format!("branch {}  {}", version.branch(), release_label(version)),
                );
            }
            ui::dim(&format!("{} version(s)", versions.len()));
        }
    }
    Ok(())
}

/// Newest published version matching `filter`
pub async fn latest(
    ctx: &Context,
    package: Package,
    filter: VersionFilter,
    format: OutputFormat,
) -> Result<()> {
    let tree = ctx.load_tree().await?;
    let version = selector::latest(catalog::available_versions(&tree, package), package, &filter)?;

    match format {
        OutputFormat::Json => print_json(&json!({
            "package": package,
            "version": version,
            "branch": version.branch(),
            "release_type": version.release_type(),
        }))?,
        OutputFormat::Text => ui::raw(&version.to_string()),
        OutputFormat::Fancy => ui::status(
            &format!("Latest {}", package),
            &format!("{} ({})", version, filter),
        ),
    }
    Ok(())
}

/// Branches with at least one published version, newest first
pub async fn branches(ctx: &Context, package: Package, format: OutputFormat) -> Result<()> {
    let tree = ctx.load_tree().await?;
    let versions = catalog::available_versions(&tree, package);
    let branches = selector::branches(&versions);

    match format {
        OutputFormat::Json => print_json(&branches)?,
        OutputFormat::Text => {
            for branch in &branches {
                ui::raw(branch);
            }
        }
        OutputFormat::Fancy => {
            ui::header(&format!("{} branches", package));
            for branch in &branches {
                let count = versions.iter().filter(|v| &v.branch() == branch).count();
                ui::row(branch, 8, &format!("{} version(s)", count));
            }
        }
    }
    Ok(())
}

/// The flavor table for `package`. Needs no catalog.
pub fn mapping(package: Package, format: OutputFormat) -> Result<()> {
    let rows = flavor::flavors(package);

    match format {
        OutputFormat::Json => print_json(rows)?,
        OutputFormat::Text => {
            for row in rows {
                ui::raw(&format!("{}\t{}", row.flavor, row.filename_template()));
            }
        }
        OutputFormat::Fancy => {
            ui::header(&format!("{} flavors", package));
            let width = rows.iter().map(|r| r.flavor.len()).max().unwrap_or(0);
            for row in rows {
                let marker = if row.flavor == package.default_flavor() {
                    " (default)"
                } else {
                    ""
                };
                ui::row(
                    row.flavor,
                    width,
                    &format!("{}  {}{}", row.filename_template(), row.description, marker),
                );
            }
        }
    }
    Ok(())
}

/// Files published for one version, with the flavor each belongs to
pub async fn files(
    ctx: &Context,
    package: Package,
    raw_version: &str,
    format: OutputFormat,
) -> Result<()> {
    let version = Version::parse(raw_version, package)?;
    let tree = ctx.load_tree().await?;
    let entries = catalog::entries_for_version(&tree, &version)?;

    match format {
        OutputFormat::Json => print_json(&entries)?,
        OutputFormat::Text => {
            for entry in &entries {
                ui::raw(&entry.file_path);
            }
        }
        OutputFormat::Fancy => {
            ui::header(&format!("{} {} files", package, version));
            let width = entries.iter().map(|e| e.flavor.len()).max().unwrap_or(0);
            for entry in &entries {
                ui::row(entry.flavor, width, &entry.file_name);
            }
            if entries.is_empty() {
                ui::dim("No files of a known flavor in this release");
            }
        }
    }
    Ok(())
}

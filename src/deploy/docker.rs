// Docker import of container lab images

use super::{check_tool_available, run_tool};
use anyhow::Result;
use log::info;
use std::path::Path;
use tokio::process::Command;

/// `name:tag` reference the image is imported under
pub fn image_reference(name: &str, tag: &str) -> String {
    format!("{}:{}", name, tag)
}

pub async fn check_docker_available() -> Result<()> {
    check_tool_available("docker", &["version", "--format", "{{.Client.Version}}"]).await
}

/// True when the local daemon already has `reference`
pub async fn image_exists(reference: &str) -> Result<bool> {
    let status = Command::new("docker")
        .args(["image", "inspect", reference])
        .output()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run 'docker': {}", e))?
        .status;
    Ok(status.success())
}

/// `docker import FILE name:tag`
pub async fn import_image(archive: &Path, reference: &str) -> Result<()> {
    let archive = archive.to_string_lossy();
    info!("Importing {} as {}", archive, reference);
    run_tool("docker", &["import", &archive, reference]).await
}

// EVE-NG provisioning of vEOS disk images

use super::{check_tool_available, run_tool};
use crate::constants;
use crate::software::Version;
use anyhow::Result;
use log::info;
use std::path::{Path, PathBuf};

/// Disk image name EVE-NG expects inside a node directory
pub const DISK_NAME: &str = "hda.qcow2";

/// Node directory for `version` under the EVE-NG qemu addons
pub fn image_dir(version: &Version) -> PathBuf {
    Path::new(constants::EVE_QEMU_DIR).join(format!("veos-{}", version))
}

/// Refuse to run anywhere the EVE-NG wrapper and qemu-img are missing
pub async fn check_eve_host() -> Result<()> {
    if !Path::new(constants::EVE_WRAPPER).exists() {
        anyhow::bail!(
            "{} not found. --eve-ng only works on an EVE-NG host.",
            constants::EVE_WRAPPER
        );
    }
    check_tool_available("qemu-img", &["--version"]).await
}

/// Convert `vmdk` into `hda.qcow2` beside it, drop the vmdk, fix permissions
pub async fn provision(vmdk: &Path) -> Result<PathBuf> {
    let dir = vmdk
        .parent()
        .ok_or_else(|| anyhow::anyhow!("{} has no parent directory", vmdk.display()))?;
    let qcow2 = dir.join(DISK_NAME);
    let vmdk_arg = vmdk.to_string_lossy();
    let qcow2_arg = qcow2.to_string_lossy();

    info!("Converting {} to {}", vmdk_arg, qcow2_arg);
    run_tool(
        "qemu-img",
        &["convert", "-f", "vmdk", "-O", "qcow2", &vmdk_arg, &qcow2_arg],
    )
    .await?;
    tokio::fs::remove_file(vmdk)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to remove {}: {}", vmdk.display(), e))?;
    run_tool(constants::EVE_WRAPPER, &["-a", "fixpermissions"]).await?;

    Ok(qcow2)
}

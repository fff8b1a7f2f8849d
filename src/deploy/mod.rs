// Deployment targets for downloaded images: Docker and EVE-NG

use anyhow::Result;
use log::debug;
use tokio::process::Command;

pub mod docker;
pub mod eveng;

/// Check that `tool` runs, with an install hint when it does not
async fn check_tool_available(tool: &str, args: &[&str]) -> Result<()> {
    match Command::new(tool).args(args).output().await {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => anyhow::bail!(
            "'{}' command failed. Please ensure it is properly installed and usable by this user.",
            tool
        ),
        Err(e) => anyhow::bail!(
            "'{}' command not found: {}. Please install it before using this option.",
            tool,
            e
        ),
    }
}

/// Run `tool` to completion, turning a non-zero exit into an error carrying stderr
async fn run_tool(tool: &str, args: &[&str]) -> Result<()> {
    debug!("Running {} {}", tool, args.join(" "));
    let output = Command::new(tool)
        .args(args)
        .output()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run '{}': {}", tool, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!(
            "'{} {}' exited with {}: {}",
            tool,
            args.join(" "),
            output.status,
            stderr.trim()
        );
    }
    Ok(())
}

// Debug command: dump the raw folder tree served by the portal

use crate::commands::Context;
use crate::ui;
use anyhow::Result;
use log::info;
use std::path::Path;

pub async fn xml(ctx: &Context, output: &Path) -> Result<()> {
    let source = ctx.source()?;
    let pb = ui::spinner("Fetching folder tree...");
    let raw = match source.folder_tree_xml().await {
        Ok(raw) => raw,
        Err(e) => {
            ui::finish_spinner_error(&pb, "Could not fetch the folder tree");
            return Err(e);
        }
    };
    ui::finish_spinner_success(&pb, "Folder tree fetched");

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(output, &raw)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", output.display(), e))?;

    info!("Wrote {} bytes of XML", raw.len());
    ui::success(&format!("Folder tree saved to {}", output.display()));
    Ok(())
}

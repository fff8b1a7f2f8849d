// Offline source: folder tree read from an XML file on disk

use crate::sources::source_trait::CatalogSource;
use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;

pub struct LocalCatalog {
    path: PathBuf,
}

impl LocalCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for LocalCatalog {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn folder_tree_xml(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            anyhow::anyhow!(
                "Failed to read catalog file {}: {}",
                self.path.display(),
                e
            )
        })
    }

    async fn download_url(&self, path: &str) -> Result<String> {
        anyhow::bail!(
            "Cannot download '{}': a catalog loaded from {} has no download links. Drop --catalog-file or use --dry-run.",
            path,
            self.path.display()
        )
    }
}

// Trait definition for catalog sources

use crate::software::CatalogNode;
use crate::sources::xml;
use anyhow::Result;

/// Where the portal folder tree and download links come from
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    /// Source name used in logs (e.g., "arista", "file")
    fn name(&self) -> &'static str;

    /// Raw folder tree XML as served by the portal
    async fn folder_tree_xml(&self) -> Result<String>;

    /// Folder tree parsed into catalog nodes
    async fn folder_tree(&self) -> Result<CatalogNode> {
        let raw = self.folder_tree_xml().await?;
        xml::parse_folder_tree(&raw)
    }

    /// Resolve a server path into a URL the downloader can fetch
    ///
    /// # Arguments
    /// * `path` - Server path as found in the folder tree
    async fn download_url(&self, path: &str) -> Result<String>;
}

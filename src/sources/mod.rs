// Sources module for catalog source implementations

use crate::config::Settings;
use log::debug;
use std::path::Path;
use std::sync::Arc;

pub mod arista;
pub mod http;
pub mod local;
pub mod source_trait;
pub mod xml;

pub use arista::AristaServer;
pub use local::LocalCatalog;
pub use source_trait::CatalogSource;

/// Pick the catalog source: an offline XML file when one is given,
/// otherwise the Arista portal authenticated with the configured token.
pub fn build_source(
    settings: &Settings,
    catalog_file: Option<&Path>,
) -> anyhow::Result<Arc<dyn CatalogSource>> {
    let source: Arc<dyn CatalogSource> = match catalog_file {
        Some(path) => Arc::new(LocalCatalog::new(path)),
        None => {
            let token = settings.token_or_error()?;
            Arc::new(AristaServer::new(settings.server.clone(), token))
        }
    };
    debug!("Using catalog source '{}'", source.name());
    Ok(source)
}

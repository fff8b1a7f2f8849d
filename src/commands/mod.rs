// Command implementations and the context they share

use crate::config::Settings;
use crate::software::CatalogNode;
use crate::sources::{self, CatalogSource};
use crate::ui;
use anyhow::Result;
use clap::ValueEnum;
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;

pub mod debug;
pub mod get;
pub mod info;

/// How listings are rendered on stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Styled for a terminal
    #[default]
    Fancy,
    /// One item per line
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Settings and global flags every command runs with
pub struct Context {
    pub settings: Settings,
    pub catalog_file: Option<PathBuf>,
}

impl Context {
    pub fn new(settings: Settings, catalog_file: Option<PathBuf>) -> Self {
        Self {
            settings,
            catalog_file,
        }
    }

    pub fn source(&self) -> Result<Arc<dyn CatalogSource>> {
        sources::build_source(&self.settings, self.catalog_file.as_deref())
    }

    /// Fetch and parse the folder tree behind a spinner
    pub async fn fetch_tree(&self, source: &dyn CatalogSource) -> Result<CatalogNode> {
        let pb = ui::spinner("Fetching software catalog...");
        match source.folder_tree().await {
            Ok(tree) => {
                debug!("Catalog loaded from '{}'", source.name());
                ui::finish_spinner_success(&pb, "Software catalog loaded");
                Ok(tree)
            }
            Err(e) => {
                ui::finish_spinner_error(&pb, "Could not load the software catalog");
                Err(e)
            }
        }
    }

    /// Build the default source and fetch its tree
    pub async fn load_tree(&self) -> Result<CatalogNode> {
        let source = self.source()?;
        self.fetch_tree(source.as_ref()).await
    }
}

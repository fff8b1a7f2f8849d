// Config module: settings file, environment and defaults

use crate::constants;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub fn config_dir() -> String {
    std::env::var(constants::DIR_ENV).unwrap_or_else(|_| ".".to_string())
}

pub fn settings_path() -> String {
    let dir = config_dir();
    if dir == "." {
        constants::SETTINGS_FILE.to_string()
    } else {
        format!("{}/{}", dir, constants::SETTINGS_FILE)
    }
}

/// Portal endpoints handed to the catalog client
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub session_url: String,
    pub folder_tree_url: String,
    pub download_link_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            session_url: constants::SESSION_URL.to_string(),
            folder_tree_url: constants::FOLDER_TREE_URL.to_string(),
            download_link_url: constants::DOWNLOAD_LINK_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub output_dir: PathBuf,
    pub parallel: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(constants::DEFAULT_OUTPUT_DIR),
            parallel: constants::DEFAULT_PARALLEL_DOWNLOADS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    pub name: String,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            name: constants::DEFAULT_DOCKER_NAME.to_string(),
        }
    }
}

/// Effective settings: defaults, then `ardl.toml`, then environment, then flags
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub token: Option<String>,
    pub server: ServerConfig,
    pub download: DownloadConfig,
    pub docker: DockerConfig,
}

impl Settings {
    /// Load `ardl.toml` when present and apply the environment on top
    pub fn load() -> anyhow::Result<Self> {
        let path = settings_path();
        let mut settings = Self::from_file(Path::new(&path))?;
        if let Ok(token) = std::env::var(constants::TOKEN_ENV)
            && !token.trim().is_empty()
        {
            settings.token = Some(token);
        }
        Ok(settings)
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| anyhow::anyhow!("Invalid settings file {}: {}", path.display(), e))
    }

    /// Apply command-line overrides
    pub fn with_token(mut self, token: Option<String>) -> Self {
        if token.is_some() {
            self.token = token;
        }
        self
    }

    pub fn token_or_error(&self) -> anyhow::Result<&str> {
        self.token.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "No Arista API token. Pass --token or set {}.",
                constants::TOKEN_ENV
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let settings = Settings::from_file(Path::new("/nonexistent/ardl.toml")).unwrap();
        assert_eq!(settings.download.parallel, constants::DEFAULT_PARALLEL_DOWNLOADS);
        assert_eq!(settings.docker.name, "arista/ceos");
        assert_eq!(settings.server.session_url, constants::SESSION_URL);
        assert!(settings.token.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "token = \"abc\"\n\n[download]\nparallel = 4\n\n[docker]\nname = \"ceos\""
        )
        .unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.token.as_deref(), Some("abc"));
        assert_eq!(settings.download.parallel, 4);
        assert_eq!(settings.download.output_dir, PathBuf::from("."));
        assert_eq!(settings.docker.name, "ceos");
        assert_eq!(settings.server.folder_tree_url, constants::FOLDER_TREE_URL);
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[download]\nparallel = \"many\"").unwrap();
        let err = Settings::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid settings file"));
    }

    #[test]
    fn test_cli_token_overrides() {
        let settings = Settings::default().with_token(Some("cli".to_string()));
        assert_eq!(settings.token_or_error().unwrap(), "cli");
        let settings = settings.with_token(None);
        assert_eq!(settings.token.as_deref(), Some("cli"));
        assert!(Settings::default().token_or_error().is_err());
    }
}

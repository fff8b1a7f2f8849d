// Arista portal source: session handshake, folder tree and download links

use crate::config::ServerConfig;
use crate::sources::http;
use crate::sources::source_trait::CatalogSource;
use anyhow::Result;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

const STATUS_SUCCESS: &str = "Success";

#[derive(Debug, Deserialize)]
struct ApiStatus {
    message: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    status: ApiStatus,
    data: Option<SessionData>,
}

#[derive(Debug, Deserialize)]
struct SessionData {
    session_code: String,
}

#[derive(Debug, Deserialize)]
struct FolderTreeResponse {
    data: FolderTreeData,
}

#[derive(Debug, Deserialize)]
struct FolderTreeData {
    xml: String,
}

#[derive(Debug, Deserialize)]
struct DownloadLinkResponse {
    data: DownloadLinkData,
}

#[derive(Debug, Deserialize)]
struct DownloadLinkData {
    url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionRequest<'a> {
    access_token: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FolderTreeRequest<'a> {
    session_code: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DownloadLinkRequest<'a> {
    session_code: &'a str,
    file_path: &'a str,
}

/// Authenticated client for the Arista software portal
pub struct AristaServer {
    config: ServerConfig,
    token: String,
    session: OnceCell<String>,
}

impl AristaServer {
    pub fn new(config: ServerConfig, token: impl Into<String>) -> Self {
        Self {
            config,
            token: token.into(),
            session: OnceCell::new(),
        }
    }

    /// Exchange the API token for a session code, once per process
    async fn session_code(&self) -> Result<&str> {
        let code = self
            .session
            .get_or_try_init(|| async move {
                debug!("Requesting session code from {}", self.config.session_url);
                let encoded = STANDARD.encode(self.token.trim());
                let response: SessionResponse = http::post_json(
                    &self.config.session_url,
                    &SessionRequest {
                        access_token: &encoded,
                    },
                )
                .await?;
                session_from_response(response)
            })
            .await?;
        Ok(code.as_str())
    }
}

fn session_from_response(response: SessionResponse) -> Result<String> {
    if response.status.message != STATUS_SUCCESS {
        anyhow::bail!(
            "Arista portal rejected the API token: {}. Generate a new token from your arista.com profile.",
            response.status.message
        );
    }
    response
        .data
        .map(|d| d.session_code)
        .ok_or_else(|| anyhow::anyhow!("Arista portal answered without a session code"))
}

#[async_trait]
impl CatalogSource for AristaServer {
    fn name(&self) -> &'static str {
        "arista"
    }

    async fn folder_tree_xml(&self) -> Result<String> {
        let session_code = self.session_code().await?;
        info!("Fetching software folder tree");
        let response: FolderTreeResponse = http::post_json(
            &self.config.folder_tree_url,
            &FolderTreeRequest { session_code },
        )
        .await?;
        Ok(response.data.xml)
    }

    async fn download_url(&self, path: &str) -> Result<String> {
        let session_code = self.session_code().await?;
        debug!("Requesting download link for {}", path);
        let response: DownloadLinkResponse = http::post_json(
            &self.config.download_link_url,
            &DownloadLinkRequest {
                session_code,
                file_path: path,
            },
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to get a download link for '{}': {}", path, e))?;
        Ok(response.data.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_success() {
        let response: SessionResponse = serde_json::from_str(
            r#"{"status": {"message": "Success"}, "data": {"session_code": "xyz"}}"#,
        )
        .unwrap();
        assert_eq!(session_from_response(response).unwrap(), "xyz");
    }

    #[test]
    fn test_session_expired_token() {
        let response: SessionResponse =
            serde_json::from_str(r#"{"status": {"message": "Access token expired"}}"#).unwrap();
        let err = session_from_response(response).unwrap_err();
        assert!(err.to_string().contains("Access token expired"));
    }

    #[test]
    fn test_request_bodies_use_portal_field_names() {
        let body = serde_json::to_value(DownloadLinkRequest {
            session_code: "abc",
            file_path: "/support/x.swi",
        })
        .unwrap();
        assert_eq!(body["sessionCode"], "abc");
        assert_eq!(body["filePath"], "/support/x.swi");

        let body = serde_json::to_value(SessionRequest { access_token: "dG9r" }).unwrap();
        assert_eq!(body["accessToken"], "dG9r");
    }
}

//! Notice document archival

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};

use super::GatewayError;

/// Persists a rendered document and returns its id
#[async_trait]
pub trait ArchivalGateway: Send + Sync {
    async fn save_document(
        &self,
        html: &str,
        filename: &str,
        folder: &str,
    ) -> Result<String, GatewayError>;
}

#[derive(Serialize)]
struct SaveRequest<'a> {
    filename: &'a str,
    folder: &'a str,
    html: &'a str,
}

#[derive(Deserialize)]
struct SaveResponse {
    #[serde(alias = "document_id")]
    id: String,
}

/// JSON-over-HTTP document store
pub struct HttpArchivalGateway {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HttpArchivalGateway {
    pub fn new(url: impl Into<String>, token: Option<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
            token,
        })
    }
}

#[async_trait]
impl ArchivalGateway for HttpArchivalGateway {
    async fn save_document(
        &self,
        html: &str,
        filename: &str,
        folder: &str,
    ) -> Result<String, GatewayError> {
        let mut request = self.client.post(&self.url).json(&SaveRequest {
            filename,
            folder,
            html,
        });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected(format!("HTTP {status}: {text}")));
        }

        let saved: SaveResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("invalid archive response: {e}")))?;

        tracing::info!(document_id = %saved.id, folder = folder, filename = filename, "Notice archived");
        Ok(saved.id)
    }
}

/// Used when no archive endpoint is configured
pub struct DisabledArchivalGateway;

#[async_trait]
impl ArchivalGateway for DisabledArchivalGateway {
    async fn save_document(
        &self,
        _html: &str,
        _filename: &str,
        _folder: &str,
    ) -> Result<String, GatewayError> {
        Err(GatewayError::Disabled("archival is not configured".into()))
    }
}

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use shared::{
    domain::PhotoFile,
    protocol::{AppendRequest, ImagePayload, SubmissionRecord, UploadRequest, UploadResponse},
};
use tracing::{info, warn};
use url::Url;

use crate::error::{AppendError, UploadError};

/// Status and text of a successful append call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendAck {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait WebhookClient: Send + Sync {
    async fn upload(&self, request: &UploadRequest) -> Result<UploadResponse, UploadError>;
    async fn append(&self, request: &AppendRequest) -> Result<AppendAck, AppendError>;
}

#[derive(Debug, Clone)]
pub struct WebhookEndpoints {
    pub upload_url: Url,
    pub append_url: Url,
}

pub struct HttpWebhookClient {
    http: Client,
    endpoints: WebhookEndpoints,
}

impl HttpWebhookClient {
    pub fn new(endpoints: WebhookEndpoints) -> Self {
        Self {
            http: Client::new(),
            endpoints,
        }
    }

    pub fn with_client(http: Client, endpoints: WebhookEndpoints) -> Self {
        Self { http, endpoints }
    }
}

#[async_trait]
impl WebhookClient for HttpWebhookClient {
    async fn upload(&self, request: &UploadRequest) -> Result<UploadResponse, UploadError> {
        let response = self
            .http
            .post(self.endpoints.upload_url.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        if status != StatusCode::OK {
            warn!(%status, folder_name = %request.folder_name, "upload webhook rejected request");
            return Err(UploadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| UploadError::InvalidResponse(e.to_string()))
    }

    async fn append(&self, request: &AppendRequest) -> Result<AppendAck, AppendError> {
        let response = self
            .http
            .post(self.endpoints.append_url.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| AppendError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppendError::Transport(e.to_string()))?;
        if status != StatusCode::OK {
            warn!(%status, entries = request.entries.len(), "append webhook rejected request");
            return Err(AppendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(AppendAck {
            status: status.as_u16(),
            body,
        })
    }
}

pub fn encode_images(files: &[PhotoFile]) -> Vec<ImagePayload> {
    files
        .iter()
        .map(|file| ImagePayload {
            filename: file.filename.clone(),
            content: STANDARD.encode(&file.bytes),
        })
        .collect()
}

/// Sends every photo in one request and returns the folder URL the storage
/// side reports. A response without `folderUrl` yields an empty string.
pub async fn upload_assets(
    webhooks: &dyn WebhookClient,
    files: &[PhotoFile],
    folder_name: &str,
) -> Result<String, UploadError> {
    let request = UploadRequest {
        folder_name: folder_name.to_string(),
        images: encode_images(files),
    };
    let response = webhooks.upload(&request).await?;
    let folder_url = response.folder_url.unwrap_or_default();
    if folder_url.is_empty() {
        warn!(%folder_name, "upload response carried no folderUrl");
    }
    info!(%folder_name, images = request.images.len(), %folder_url, "photos uploaded");
    Ok(folder_url)
}

pub async fn append_entries(
    webhooks: &dyn WebhookClient,
    records: Vec<SubmissionRecord>,
) -> Result<AppendAck, AppendError> {
    let request = AppendRequest { entries: records };
    let ack = webhooks.append(&request).await?;
    info!(entries = request.entries.len(), status = ack.status, "entries appended");
    Ok(ack)
}

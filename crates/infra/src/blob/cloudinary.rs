//! Cloudinary signed-upload client.
//!
//! Uploads go to `POST {endpoint}/v1_1/{cloud_name}/image/upload` as multipart form data.
//! The request is signed with `sha256(folder=..&timestamp=..<api_secret>)`, hex encoded.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

use super::{BlobUploader, ImageUpload, UploadError};

pub const DEFAULT_ENDPOINT: &str = "https://api.cloudinary.com";
pub const DEFAULT_FOLDER: &str = "colour-magic-products";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
    /// Base URL of the upload API; overridable for local fakes.
    pub endpoint: String,
    pub timeout: Duration,
}

impl CloudinaryConfig {
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            folder: DEFAULT_FOLDER.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn upload_url(&self) -> String {
        format!(
            "{}/v1_1/{}/image/upload",
            self.endpoint.trim_end_matches('/'),
            self.cloud_name
        )
    }
}

/// Signature over the signed parameters, sorted by name, followed by the secret.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Clone)]
pub struct CloudinaryUploader {
    config: CloudinaryConfig,
    client: reqwest::Client,
}

impl CloudinaryUploader {
    pub fn new(config: CloudinaryConfig) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &CloudinaryConfig {
        &self.config
    }

    fn form(&self, upload: ImageUpload, timestamp: i64) -> Result<Form, UploadError> {
        let timestamp = timestamp.to_string();
        let signature = sign_params(
            &[("folder", &self.config.folder), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );

        let file = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)
            .map_err(|e| UploadError::Transport(format!("invalid content type: {e}")))?;

        Ok(Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("folder", self.config.folder.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .part("file", file))
    }
}

#[async_trait]
impl BlobUploader for CloudinaryUploader {
    #[instrument(skip(self, upload), fields(file_name = %upload.file_name, bytes = upload.bytes.len()), err)]
    async fn upload(&self, upload: ImageUpload) -> Result<String, UploadError> {
        let form = self.form(upload, chrono::Utc::now().timestamp())?;

        let response = self
            .client
            .post(self.config.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!(status = status.as_u16(), %message, "image upload rejected");
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: UploadResponse = serde_json::from_str(&body)
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;
        let url = parsed
            .secure_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| UploadError::InvalidResponse("missing secure_url".to_string()))?;

        debug!(%url, "image uploaded");
        Ok(url)
    }
}

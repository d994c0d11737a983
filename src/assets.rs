/*!
 * Image upload boundary.
 *
 * Images inserted in the editor are uploaded to an object storage bucket
 * first; the document only ever stores the resulting public URL.
 */

use async_trait::async_trait;
use bytes::Bytes;
use log::{error, info};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

use crate::app_config::StorageConfig;
use crate::errors::UploadError;

/// A stored asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    /// Object name inside the bucket
    pub name: String,
    /// URL readers load the asset from
    pub public_url: String,
}

/// Uploads binary assets and returns where they can be read from
#[async_trait]
pub trait AssetUploader: Send + Sync {
    async fn upload(&self, data: Bytes, content_type: &str) -> Result<UploadedAsset, UploadError>;
}

/// File extension for an image content type. Anything that is not an image
/// is refused.
pub fn image_extension(content_type: &str) -> Result<&'static str, UploadError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "image/png" => Ok("png"),
        "image/jpeg" | "image/jpg" => Ok("jpg"),
        "image/gif" => Ok("gif"),
        "image/webp" => Ok("webp"),
        "image/avif" => Ok("avif"),
        _ => Err(UploadError::UnsupportedContentType(content_type.to_string())),
    }
}

/// Content type of an image file, judged by its extension
pub fn image_content_type(path: &Path) -> Result<&'static str, UploadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        "avif" => Ok("image/avif"),
        _ => Err(UploadError::UnsupportedContentType(path.display().to_string())),
    }
}

/// Uploader for a storage service exposing
/// `POST {endpoint}/object/{bucket}/{name}` and serving objects from
/// `{endpoint}/object/public/{bucket}/{name}`.
#[derive(Debug, Clone)]
pub struct HttpAssetUploader {
    client: Client,
    endpoint: String,
    bucket: String,
    api_key: String,
}

impl HttpAssetUploader {
    pub fn new(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder().timeout(timeout).build().unwrap_or_default(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            config.endpoint.clone(),
            config.bucket.clone(),
            config.api_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn upload_url(&self, name: &str) -> String {
        format!("{}/object/{}/{}", self.endpoint, self.bucket, name)
    }

    /// Public URL of an object in the bucket
    pub fn public_url(&self, name: &str) -> String {
        format!("{}/object/public/{}/{}", self.endpoint, self.bucket, name)
    }
}

#[async_trait]
impl AssetUploader for HttpAssetUploader {
    async fn upload(&self, data: Bytes, content_type: &str) -> Result<UploadedAsset, UploadError> {
        let extension = image_extension(content_type)?;
        let name = format!("{}.{}", Uuid::new_v4(), extension);
        let size = data.len();

        let response = self
            .client
            .post(self.upload_url(&name))
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .header("Content-Type", content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| UploadError::UploadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Storage upload error ({}): {}", status, error_text);
            return Err(UploadError::UploadFailed(format!("{}: {}", status, error_text)));
        }

        info!("Uploaded image {} ({} bytes)", name, size);
        Ok(UploadedAsset {
            public_url: self.public_url(&name),
            name,
        })
    }
}

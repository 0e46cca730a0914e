use super::error::InfrastructureError;
use super::file_storage::LocalFileStorage;
use crate::domain::background::BackgroundSource;
use crate::domain::image_loader_trait::ImageLoader;
use base64::decode;
use std::future::Future;
use std::time::Duration;

// 背景画像の取得: 同梱アセット / data URL / リモート URL / サーバー上のパス
pub struct DefaultImageLoader {
    storage: LocalFileStorage,
    client: reqwest::Client,
    /// Upper bound for a remote image body.
    max_bytes: usize,
}

impl DefaultImageLoader {
    pub fn new(
        storage: LocalFileStorage,
        fetch_timeout: Duration,
        max_bytes: usize,
    ) -> Result<Self, InfrastructureError> {
        let client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .build()
            .map_err(InfrastructureError::ReqwestError)?;
        Ok(Self { storage, client, max_bytes })
    }

    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, InfrastructureError> {
        let mut response = self.client.get(url).send().await.map_err(InfrastructureError::ReqwestError)?;
        let status = response.status();
        if !status.is_success() {
            return Err(InfrastructureError::ExternalApiError(format!("{} responded with {}", url, status)));
        }

        // 宣言されたサイズで先に弾き、チャンク単位でも上限を確認する
        if let Some(declared) = response.content_length() {
            if declared > self.max_bytes as u64 {
                return Err(InfrastructureError::PayloadTooLarge(self.max_bytes));
            }
        }
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(InfrastructureError::ReqwestError)? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(InfrastructureError::PayloadTooLarge(self.max_bytes));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

pub fn decode_data_url(url: &str) -> Result<Vec<u8>, InfrastructureError> {
    let (header, payload) = url
        .split_once(',')
        .ok_or_else(|| InfrastructureError::DecodingError("Invalid data URL: missing comma".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(InfrastructureError::DecodingError("Invalid data URL: only base64 payloads are supported".to_string()));
    }
    decode(payload.trim()).map_err(InfrastructureError::Base64DecodeError)
}

impl ImageLoader for DefaultImageLoader {
    fn load<'a>(
        &'a self,
        source: &'a BackgroundSource,
    ) -> impl Future<Output = Result<Vec<u8>, InfrastructureError>> + Send + 'a {
        async move {
            let result = match source {
                BackgroundSource::Bundled { src, .. } => self.storage.read_image(src).await,
                BackgroundSource::ServerPath { path } => self.storage.read_image(path).await,
                BackgroundSource::DataUrl { url } => decode_data_url(url),
                BackgroundSource::Remote { url } => self.fetch_remote(url).await,
            };
            match &result {
                Ok(bytes) => tracing::debug!(bytes = bytes.len(), "background image loaded"),
                Err(e) => tracing::warn!(error = %e, "background image could not be loaded"),
            }
            result
        }
    }
}

use thiserror::Error;
use crate::domain::error::DomainError; // ドメインエラーをラップするため
use crate::infrastructure::error::InfrastructureError;

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The background could not be loaded; the export is abandoned.
    #[error("Image could not be loaded: {0}")]
    ImageLoadFailed(InfrastructureError),

    #[error("Domain error occurred: {0}")]
    DomainError(#[from] DomainError),

    #[error("Infrastructure error occurred: {0}")]
    InfrastructureError(#[from] InfrastructureError),

    #[error("Underlying error: {source:?}")]
    AnyhowError {
        #[from]
        source: anyhow::Error,
    },
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

impl ApplicationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApplicationError::ExportFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApplicationError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApplicationError::ImageLoadFailed(infra_err) => match infra_err {
                InfrastructureError::AssetNotFound(_) => StatusCode::NOT_FOUND,
                InfrastructureError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
                InfrastructureError::FileStorageError(_)
                | InfrastructureError::DecodingError(_)
                | InfrastructureError::Base64DecodeError(_) => StatusCode::BAD_REQUEST,
                InfrastructureError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_GATEWAY,
            },
            ApplicationError::DomainError(domain_err) => match domain_err {
                DomainError::SessionNotFound(_) | DomainError::UnknownBackground(_) => StatusCode::NOT_FOUND,
                DomainError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                DomainError::InvalidInput(_) | DomainError::FontSizeOutOfRange(_) => StatusCode::BAD_REQUEST,
            },
            ApplicationError::InfrastructureError(infra_err) => match infra_err {
                InfrastructureError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
                InfrastructureError::DecodingError(_) => StatusCode::BAD_REQUEST,
                InfrastructureError::ImageLibError(_) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApplicationError::AnyhowError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        } else {
            tracing::warn!(%status, error = %self, "request rejected");
        }

        let body = match &self {
            // 利用者向けの通知。ダウンロードは発生しない
            ApplicationError::ImageLoadFailed(_) => json!({
                "error": self.to_string(),
                "notification": "The image could not be loaded. Nothing was downloaded.",
            }),
            // 想定外のエラーは詳細を返さない
            ApplicationError::AnyhowError { .. } => json!({ "error": "An unexpected error occurred." }),
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found = ApplicationError::ImageLoadFailed(InfrastructureError::AssetNotFound("V9".into()));
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let remote = ApplicationError::ImageLoadFailed(InfrastructureError::ExternalApiError("503".into()));
        assert_eq!(remote.status_code(), StatusCode::BAD_GATEWAY);

        let media = ApplicationError::from(DomainError::UnsupportedMediaType("text/plain".into()));
        assert_eq!(media.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let size = ApplicationError::from(DomainError::FontSizeOutOfRange(200));
        assert_eq!(size.status_code(), StatusCode::BAD_REQUEST);

        let missing_session = ApplicationError::from(DomainError::SessionNotFound(7));
        assert_eq!(missing_session.status_code(), StatusCode::NOT_FOUND);

        let font = ApplicationError::from(InfrastructureError::FontError("gone".into()));
        assert_eq!(font.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_anyhow_errors_are_opaque_500s() {
        let err = ApplicationError::from(anyhow::anyhow!("session sweeper panicked at table.rs:12"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "An unexpected error occurred.");
    }

    #[test]
    fn test_payload_too_large_maps_to_413() {
        let err = ApplicationError::ImageLoadFailed(InfrastructureError::PayloadTooLarge(1024));
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_into_response_uses_status() {
        let response = ApplicationError::InvalidRequest("no file".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("Image processing failed: {0}")]
    ImageProcessingError(String),

    #[error("File storage error: {0}")]
    FileStorageError(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("External API call failed: {0}")]
    ExternalApiError(String),

    #[error("Image exceeds the {0} byte limit")]
    PayloadTooLarge(usize),

    #[error("Data decoding failed: {0}")]
    DecodingError(String),

    #[error("Font could not be loaded: {0}")]
    FontError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Underlying image library error: {0}")]
    ImageLibError(#[from] image::ImageError), // image::ImageError をラップ

    #[error("Underlying I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Base64 decode error: {0}")]
    Base64DecodeError(#[from] base64::DecodeError),
}

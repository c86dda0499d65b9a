use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::common::response::ApiError;

pub type ImageResult<T> = Result<T, ImageError>;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("No image uploaded")]
    MissingImage,

    #[error("Image exceeds the {limit} byte upload limit")]
    TooLarge { limit: u64 },

    #[error("Invalid quality: {0}")]
    InvalidQuality(String),

    #[error("Failed to read upload: {0}")]
    Upload(String),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Image worker failed: {0}")]
    Worker(String),
}

impl ImageError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ImageError::MissingImage
            | ImageError::InvalidQuality(_)
            | ImageError::Upload(_)
            | ImageError::UnsupportedFormat
            | ImageError::Decode(_) => StatusCode::BAD_REQUEST,
            ImageError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ImageError::Encode(_) | ImageError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ImageError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Image compression failed");
        } else {
            tracing::warn!(error = %self, "Rejected image upload");
        }
        ApiError(self.to_string(), status).into_response()
    }
}

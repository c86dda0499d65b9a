use axum::{
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::IntoResponse,
};
use bytes::Bytes;
use tracing::debug;

use super::dto::{ImageCompressOptions, ImageCompressResponse};
use super::error::{ImageError, ImageResult};
use super::service::ImageService;
use crate::common::response::{ApiSuccess, SimpleError};
use crate::state::AppState;

fn read_error(e: MultipartError, limit: u64) -> ImageError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ImageError::TooLarge { limit }
    } else {
        ImageError::Upload(e.body_text())
    }
}

/// Compress an uploaded image
#[utoipa::path(
    post,
    path = "/api/image-compress",
    request_body(content = String, description = "Multipart form with an `image` file field and optional `quality` (1-100, default 80)", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Compressed image as a data URL", body = ImageCompressResponse),
        (status = 400, description = "Missing image, bad quality or undecodable input", body = SimpleError),
        (status = 413, description = "Upload too large", body = SimpleError),
        (status = 500, description = "Encoding failed", body = SimpleError)
    ),
    tag = "Image"
)]
pub async fn compress_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ImageResult<impl IntoResponse> {
    let limit = state.config.max_image_bytes;
    let mut image: Option<Bytes> = None;
    let mut quality: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| read_error(e, limit))?
    {
        match field.name() {
            Some("image") => {
                image = Some(field.bytes().await.map_err(|e| read_error(e, limit))?);
            }
            Some("quality") => {
                quality = Some(field.text().await.map_err(|e| read_error(e, limit))?);
            }
            other => debug!("Skipping multipart field {:?}", other),
        }
    }

    let image = image
        .filter(|bytes| !bytes.is_empty())
        .ok_or(ImageError::MissingImage)?;
    if image.len() as u64 > limit {
        return Err(ImageError::TooLarge { limit });
    }
    let options = ImageCompressOptions::from_form(quality.as_deref())?;

    let response = ImageService::compress(image, options).await?;
    Ok(ApiSuccess(response, StatusCode::OK))
}

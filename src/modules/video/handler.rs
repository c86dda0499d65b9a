use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::error::{VideoError, VideoResult};
use super::service::VideoService;
use crate::common::filename;
use crate::common::response::ErrorBody;
use crate::common::upload::read_error;
use crate::state::AppState;

pub const VIDEO_FIELD: &str = "video";

/// Compress an uploaded video to H.264/AAC MP4
#[utoipa::path(
    post,
    path = "/api/compress-video",
    request_body(content = String, description = "Multipart form with a `video` file field", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Compressed MP4", content_type = "video/mp4", body = Vec<u8>),
        (status = 400, description = "Missing file or wrong file type", body = ErrorBody),
        (status = 413, description = "Upload too large", body = ErrorBody),
        (status = 500, description = "Compression failed", body = ErrorBody)
    ),
    tag = "Video"
)]
pub async fn compress_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> VideoResult<Response> {
    let limit = state.config.max_video_bytes;

    let upload = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| read_error(e, limit))?
            .ok_or(VideoError::MissingFile)?;

        if field.name() == Some(VIDEO_FIELD) {
            break VideoService::stage_upload(&state, field).await?;
        }
        debug!("Skipping multipart field {:?}", field.name());
    };

    let compressed = VideoService::compress(state, upload).await?;
    let disposition = filename::content_disposition(&compressed.file_name);

    Ok((
        [
            (header::CONTENT_TYPE, "video/mp4".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        compressed.bytes,
    )
        .into_response())
}

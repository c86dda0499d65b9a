use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;

use crate::state::AppState;

pub mod error;
pub mod handler;
pub mod policy;
pub mod service;

/// Room for multipart boundaries and headers around the file itself.
const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

pub fn router(max_video_bytes: u64) -> Router<AppState> {
    let body_limit = usize::try_from(max_video_bytes.saturating_add(MULTIPART_OVERHEAD))
        .unwrap_or(usize::MAX);

    Router::new()
        .route("/compress-video", post(handler::compress_video))
        .layer(DefaultBodyLimit::max(body_limit))
}

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;

use crate::state::AppState;

pub mod dto;
pub mod error;
pub mod handler;
pub mod service;

const MULTIPART_OVERHEAD: u64 = 64 * 1024;

pub fn router(max_image_bytes: u64) -> Router<AppState> {
    let body_limit = usize::try_from(max_image_bytes.saturating_add(MULTIPART_OVERHEAD))
        .unwrap_or(usize::MAX);

    Router::new()
        .route("/image-compress", post(handler::compress_image))
        .layer(DefaultBodyLimit::max(body_limit))
}

use axum::Router;
use axum::routing::get;

use crate::state::AppState;

pub mod dto;
pub mod handler;
pub mod store;
pub mod stream;

pub fn router() -> Router<AppState> {
    Router::new().route("/progress", get(handler::progress_stream))
}

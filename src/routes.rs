use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::state::AppState;

pub fn configure_routes(state: &AppState) -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes(state))
        .layer(cors)
}

fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(crate::modules::video::router(state.config.max_video_bytes))
        .merge(crate::modules::image::router(state.config.max_image_bytes))
        .nest("/compress", crate::modules::progress::router())
}

use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::{Stream, StreamExt, stream};
use tracing::{info, warn};

use super::dto::{ProgressErrorEvent, ProgressEvent, ProgressQuery};
use super::stream::poll_progress;
use crate::state::AppState;

fn encode_event(event: &ProgressEvent) -> Result<Event, Event> {
    Event::default().json_data(event).map_err(|e| {
        warn!("Failed to encode progress event: {}", e);
        error_event(e.to_string())
    })
}

fn error_event(details: String) -> Event {
    let body = ProgressErrorEvent {
        error: "Failed to encode progress event".to_string(),
        details,
    };
    Event::default()
        .json_data(&body)
        .unwrap_or_else(|_| Event::default().data(r#"{"error":"Failed to encode progress event"}"#))
}

/// Stream compression progress
#[utoipa::path(
    get,
    path = "/api/compress/progress",
    params(ProgressQuery),
    responses(
        (status = 200, description = "Server-sent progress events", body = ProgressEvent, content_type = "text/event-stream"),
        (status = 400, description = "Malformed query")
    ),
    tag = "Video"
)]
pub async fn progress_stream(
    State(state): State<AppState>,
    Query(query): Query<ProgressQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = if query.reset.unwrap_or(false) {
        state.progress.reset();
        info!("Progress reset by client");
        stream::once(async {
            match encode_event(&ProgressEvent::reset()) {
                Ok(event) | Err(event) => event,
            }
        })
        .boxed()
    } else {
        poll_progress(
            state.progress.clone(),
            state.config.progress_interval,
            encode_event,
        )
        .boxed()
    };

    Sse::new(events.map(Ok)).keep_alive(KeepAlive::default())
}

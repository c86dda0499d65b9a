//! Overlapping uploads share one progress slot, so jobs must run one at a time.

mod support;

use std::time::Duration;

use axum::http::StatusCode;
use tower::ServiceExt;

use support::{FAKE_OUTPUT, Part, Step, body_bytes, gated_app, multipart_request, test_config, wait_until};

fn upload(name: &str) -> axum::http::Request<axum::body::Body> {
    multipart_request(
        "/api/compress-video",
        &[Part::file("video", name, "video/mp4", b"source-bytes")],
    )
}

#[tokio::test]
async fn second_job_waits_for_first_to_complete() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state, gate, log) = gated_app(test_config(dir.path()));

    let first = tokio::spawn(app.clone().oneshot(upload("first.mp4")));
    wait_until(|| state.progress.get_progress().percentage == 40.0).await;

    let second = tokio::spawn(app.oneshot(upload("second.mp4")));
    tokio::time::sleep(Duration::from_millis(50)).await;

    // the second job is parked on the slot: no transcode, no reset of the first job's progress
    assert_eq!(log.lock().len(), 1);
    assert_eq!(state.progress.get_progress().percentage, 40.0);

    gate.add_permits(1);
    let first = first.await.unwrap().unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(body_bytes(first).await, FAKE_OUTPUT);

    wait_until(|| log.lock().len() == 3).await;
    gate.add_permits(1);
    let second = second.await.unwrap().unwrap();
    assert_eq!(second.status(), StatusCode::OK);

    let log = log.lock().clone();
    assert_eq!(log.len(), 4);
    assert!(matches!(log[0], Step::Started(s) if s.percentage == 0.0));
    assert_eq!(log[1], Step::Finished);
    // the second transcode starts from a fresh slot, after the first one finished
    assert!(matches!(log[2], Step::Started(s) if s.percentage == 0.0 && !s.completed));
    assert_eq!(log[3], Step::Finished);

    let progress = state.progress.get_progress();
    assert_eq!(progress.percentage, 100.0);
    assert!(progress.completed);
}

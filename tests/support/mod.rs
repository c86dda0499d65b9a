#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use serde_json::Value;

use media_compressor::app::create_app;
use media_compressor::config::settings::AppConfig;
use media_compressor::infrastructure::ffmpeg::{MediaInfo, MediaProcessor, ProgressCallback};
use media_compressor::modules::video::error::{VideoError, VideoResult};
use media_compressor::modules::video::policy::EncodingParams;
use media_compressor::modules::progress::store::{ProgressState, ProgressStore};
use media_compressor::state::AppState;
use media_compressor::workers::transcoder::TranscodeWorker;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

pub const FAKE_OUTPUT: &[u8] = b"fake-h264-aac-mp4";
const BOUNDARY: &str = "media-compressor-test-boundary";

#[derive(Clone, Debug)]
pub enum Behavior {
    Succeed,
    Fail(&'static str),
}

/// Stands in for ffmpeg/ffprobe: reports scripted progress, then writes or fails.
pub struct FakeMedia {
    pub behavior: Behavior,
    pub steps: Vec<f64>,
}

impl FakeMedia {
    pub fn succeeding() -> Self {
        Self {
            behavior: Behavior::Succeed,
            steps: vec![12.5, 48.0, 91.3],
        }
    }

    pub fn failing(diagnostic: &'static str) -> Self {
        Self {
            behavior: Behavior::Fail(diagnostic),
            steps: vec![5.0],
        }
    }
}

#[async_trait]
impl MediaProcessor for FakeMedia {
    async fn probe(&self, _input: &Path) -> VideoResult<MediaInfo> {
        Ok(MediaInfo {
            width: 1920,
            height: 1080,
            duration: 12.0,
            bit_rate: Some(8_000_000),
            fps: 30.0,
        })
    }

    async fn transcode(
        &self,
        _input: &Path,
        output: &Path,
        _params: &EncodingParams,
        _duration: f64,
        mut on_progress: ProgressCallback,
    ) -> VideoResult<()> {
        for step in &self.steps {
            on_progress(*step);
        }
        match self.behavior {
            Behavior::Succeed => {
                tokio::fs::write(output, FAKE_OUTPUT).await.unwrap();
                Ok(())
            }
            Behavior::Fail(diagnostic) => {
                tokio::fs::write(output, b"partial").await.unwrap();
                Err(VideoError::TranscodeFailed(diagnostic.to_string()))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// Store snapshot taken as a transcode begins.
    Started(ProgressState),
    Finished,
}

/// Holds every transcode at 40% until the test hands out a permit.
pub struct GatedMedia {
    pub progress: ProgressStore,
    pub gate: Arc<Semaphore>,
    pub log: Arc<Mutex<Vec<Step>>>,
}

#[async_trait]
impl MediaProcessor for GatedMedia {
    async fn probe(&self, _input: &Path) -> VideoResult<MediaInfo> {
        Ok(MediaInfo {
            width: 640,
            height: 360,
            duration: 5.0,
            bit_rate: Some(1_000_000),
            fps: 25.0,
        })
    }

    async fn transcode(
        &self,
        _input: &Path,
        output: &Path,
        _params: &EncodingParams,
        _duration: f64,
        mut on_progress: ProgressCallback,
    ) -> VideoResult<()> {
        self.log.lock().push(Step::Started(self.progress.get_progress()));
        on_progress(40.0);

        self.gate.acquire().await.unwrap().forget();

        tokio::fs::write(output, FAKE_OUTPUT).await.unwrap();
        self.log.lock().push(Step::Finished);
        Ok(())
    }
}

/// App whose worker runs on a [`GatedMedia`] sharing the state's progress store.
pub fn gated_app(config: AppConfig) -> (Router, AppState, Arc<Semaphore>, Arc<Mutex<Vec<Step>>>) {
    let mut state = AppState::new(config, Arc::new(FakeMedia::succeeding()));
    let gate = Arc::new(Semaphore::new(0));
    let log = Arc::new(Mutex::new(Vec::new()));

    let media = GatedMedia {
        progress: state.progress.clone(),
        gate: gate.clone(),
        log: log.clone(),
    };
    state.worker = TranscodeWorker::new(
        Arc::new(media),
        state.progress.clone(),
        state.config.encoding_policy.clone(),
    );

    (create_app(state.clone()), state, gate, log)
}

pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

pub fn test_config(temp_dir: &Path) -> AppConfig {
    let mut config = AppConfig::with_temp_dir(temp_dir.to_path_buf());
    config.progress_interval = Duration::from_millis(5);
    config
}

pub fn test_app(config: AppConfig, media: FakeMedia) -> (Router, AppState) {
    let state = AppState::new(config, Arc::new(media));
    (create_app(state.clone()), state)
}

pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn file(name: &'a str, file_name: &'a str, content_type: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            file_name: Some(file_name),
            content_type: Some(content_type),
            data,
        }
    }

    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            file_name: None,
            content_type: None,
            data: value.as_bytes(),
        }
    }
}

pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{}\"", file_name));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// `data:` payloads of an SSE body, in order. Keep-alive comments are skipped.
pub fn sse_data(body: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(body)
        .split("\n\n")
        .flat_map(|frame| frame.lines())
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect()
}

pub fn dir_is_empty(dir: &Path) -> bool {
    match std::fs::read_dir(dir) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => true,
    }
}

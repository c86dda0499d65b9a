use std::path::Path;

use async_trait::async_trait;

use crate::modules::video::error::VideoResult;
use crate::modules::video::policy::EncodingParams;

pub mod probe;
pub mod progress;
pub mod service;

pub use service::FfmpegService;

/// Metadata of the first video stream, as reported by the prober.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    pub width: u32,
    pub height: u32,
    /// Seconds. Zero when unknown.
    pub duration: f64,
    /// Bits per second, stream level preferred over container level.
    pub bit_rate: Option<u64>,
    /// Zero when unknown.
    pub fps: f64,
}

impl MediaInfo {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Receives transcode progress as a percentage in `[0, 100]`.
pub type ProgressCallback = Box<dyn FnMut(f64) + Send>;

/// External media tooling: probing and transcoding.
#[async_trait]
pub trait MediaProcessor: Send + Sync {
    async fn probe(&self, input: &Path) -> VideoResult<MediaInfo>;

    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        params: &EncodingParams,
        duration: f64,
        on_progress: ProgressCallback,
    ) -> VideoResult<()>;
}

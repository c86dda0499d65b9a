use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::settings::AppConfig;
use crate::infrastructure::ffmpeg::{FfmpegService, MediaProcessor};
use crate::modules::progress::store::ProgressStore;
use crate::workers::transcoder::TranscodeWorker;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub progress: ProgressStore,
    pub worker: TranscodeWorker,
    /// Held for the whole of a video job; the progress slot serves one job at a time.
    pub transcode_slot: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: AppConfig, media: Arc<dyn MediaProcessor>) -> Self {
        let progress = ProgressStore::new();
        let worker = TranscodeWorker::new(media, progress.clone(), config.encoding_policy.clone());

        Self {
            config,
            progress,
            worker,
            transcode_slot: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_ffmpeg(config: AppConfig) -> Self {
        let media = FfmpegService::new(config.ffmpeg_path.clone(), config.ffprobe_path.clone());
        Self::new(config, Arc::new(media))
    }
}

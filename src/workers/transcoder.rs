use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::infrastructure::ffmpeg::MediaProcessor;
use crate::modules::progress::store::ProgressStore;
use crate::modules::video::error::{VideoError, VideoResult};
use crate::modules::video::policy::{EncodingParams, EncodingPolicy};

/// Highest value reported while the subprocess runs; 100 waits for a verified output.
const IN_FLIGHT_CEILING: f64 = 99.9;

/// Forwards subprocess progress to the store, one decimal place, never backwards.
struct ProgressReporter {
    store: ProgressStore,
    last: f64,
}

impl ProgressReporter {
    fn new(store: ProgressStore) -> Self {
        Self { store, last: 0.0 }
    }

    fn report(&mut self, percent: f64) {
        let value = ((percent * 10.0).round() / 10.0).min(IN_FLIGHT_CEILING);
        if value < self.last {
            debug!("Dropping regressed progress {} (last {})", value, self.last);
            return;
        }
        self.last = value;
        self.store.set_progress(value);
    }
}

/// Runs one probe + transcode for one job.
#[derive(Clone)]
pub struct TranscodeWorker {
    media: Arc<dyn MediaProcessor>,
    progress: ProgressStore,
    policy: EncodingPolicy,
}

impl TranscodeWorker {
    pub fn new(media: Arc<dyn MediaProcessor>, progress: ProgressStore, policy: EncodingPolicy) -> Self {
        Self {
            media,
            progress,
            policy,
        }
    }

    pub async fn run(&self, input: &Path, output: &Path) -> VideoResult<EncodingParams> {
        if !tokio::fs::try_exists(input).await.unwrap_or(false) {
            return Err(VideoError::InputNotFound(input.to_path_buf()));
        }

        let media_info = self.media.probe(input).await?;
        info!(
            width = media_info.width,
            height = media_info.height,
            duration = media_info.duration,
            bit_rate = ?media_info.bit_rate,
            fps = media_info.fps,
            "Probed input"
        );

        let params = self.policy.derive(&media_info);
        info!(
            preset = params.preset.as_str(),
            video_bitrate = params.video_bitrate,
            scale = ?params.scale,
            frame_rate = ?params.frame_rate,
            "Starting transcode"
        );

        let mut reporter = ProgressReporter::new(self.progress.clone());
        self.media
            .transcode(
                input,
                output,
                &params,
                media_info.duration,
                Box::new(move |percent| reporter.report(percent)),
            )
            .await?;

        let size = verify_output(output).await?;
        self.progress.set_progress(100.0);
        info!("Transcode finished, {} bytes written", size);

        Ok(params)
    }
}

async fn verify_output(path: &Path) -> VideoResult<u64> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(meta.len()),
        _ => Err(VideoError::OutputMissing),
    }
}

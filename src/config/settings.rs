use std::path::PathBuf;
use std::time::Duration;

use crate::config::env::{self, EnvKey};
use crate::modules::video::policy::EncodingPolicy;

pub const DEFAULT_MAX_VIDEO_BYTES: u64 = 500 * 1024 * 1024;
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_port: u16,
    pub temp_dir: PathBuf,
    pub max_video_bytes: u64,
    pub max_image_bytes: u64,
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub progress_interval: Duration,
    pub encoding_policy: EncodingPolicy,
}

impl AppConfig {
    pub fn new() -> Self {
        let temp_dir = match env::get(EnvKey::TempDir) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::temp_dir().join("media-compressor"),
        };

        let defaults = EncodingPolicy::default();
        let encoding_policy = EncodingPolicy {
            bitrate_factor: env::get_parsed(EnvKey::PolicyBitrateFactor, defaults.bitrate_factor),
            max_bitrate: env::get_parsed(EnvKey::PolicyMaxBitrate, defaults.max_bitrate),
            fallback_bitrate: env::get_parsed(
                EnvKey::PolicyFallbackBitrate,
                defaults.fallback_bitrate,
            ),
            max_fps: env::get_parsed(EnvKey::PolicyMaxFps, defaults.max_fps),
            slow_duration_secs: env::get_parsed(
                EnvKey::PolicySlowDurationSecs,
                defaults.slow_duration_secs,
            ),
            fast_duration_secs: env::get_parsed(
                EnvKey::PolicyFastDurationSecs,
                defaults.fast_duration_secs,
            ),
            ..defaults
        };

        Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            temp_dir,
            max_video_bytes: env::get_parsed(EnvKey::MaxVideoBytes, DEFAULT_MAX_VIDEO_BYTES),
            max_image_bytes: env::get_parsed(EnvKey::MaxImageBytes, DEFAULT_MAX_IMAGE_BYTES),
            ffmpeg_path: PathBuf::from(env::get_or(EnvKey::FfmpegPath, "ffmpeg")),
            ffprobe_path: PathBuf::from(env::get_or(EnvKey::FfprobePath, "ffprobe")),
            progress_interval: Duration::from_millis(env::get_parsed(
                EnvKey::ProgressIntervalMs,
                100,
            )),
            encoding_policy,
        }
    }

    /// Config rooted at `temp_dir` with every other value at its default.
    pub fn with_temp_dir(temp_dir: PathBuf) -> Self {
        Self {
            server_port: 3000,
            temp_dir,
            max_video_bytes: DEFAULT_MAX_VIDEO_BYTES,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            progress_interval: Duration::from_millis(100),
            encoding_policy: EncodingPolicy::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

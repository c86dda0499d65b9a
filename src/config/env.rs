use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    TempDir,
    MaxVideoBytes,
    MaxImageBytes,
    FfmpegPath,
    FfprobePath,
    ProgressIntervalMs,
    PolicyBitrateFactor,
    PolicyMaxBitrate,
    PolicyFallbackBitrate,
    PolicyMaxFps,
    PolicySlowDurationSecs,
    PolicyFastDurationSecs,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::TempDir => "TEMP_DIR",
            EnvKey::MaxVideoBytes => "MAX_VIDEO_BYTES",
            EnvKey::MaxImageBytes => "MAX_IMAGE_BYTES",
            EnvKey::FfmpegPath => "FFMPEG_PATH",
            EnvKey::FfprobePath => "FFPROBE_PATH",
            EnvKey::ProgressIntervalMs => "PROGRESS_INTERVAL_MS",
            EnvKey::PolicyBitrateFactor => "POLICY_BITRATE_FACTOR",
            EnvKey::PolicyMaxBitrate => "POLICY_MAX_BITRATE",
            EnvKey::PolicyFallbackBitrate => "POLICY_FALLBACK_BITRATE",
            EnvKey::PolicyMaxFps => "POLICY_MAX_FPS",
            EnvKey::PolicySlowDurationSecs => "POLICY_SLOW_DURATION_SECS",
            EnvKey::PolicyFastDurationSecs => "POLICY_FAST_DURATION_SECS",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

use crate::infrastructure::ffmpeg::MediaInfo;

/// Tunable constants for deriving encoder settings from probed metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodingPolicy {
    pub bitrate_factor: f64,
    pub max_bitrate: u64,
    pub fallback_bitrate: u64,
    pub reference_width: u32,
    pub reference_height: u32,
    pub reference_fps: f64,
    pub max_fps: f64,
    pub fast_width: u32,
    pub fast_height: u32,
    pub slow_duration_secs: f64,
    pub fast_duration_secs: f64,
}

impl Default for EncodingPolicy {
    fn default() -> Self {
        Self {
            bitrate_factor: 0.7,
            max_bitrate: 4_000_000,
            fallback_bitrate: 1_000_000,
            reference_width: 1920,
            reference_height: 1080,
            reference_fps: 30.0,
            max_fps: 30.0,
            fast_width: 1280,
            fast_height: 720,
            slow_duration_secs: 600.0,
            fast_duration_secs: 60.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    Faster,
    Medium,
    Slow,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Faster => "faster",
            Preset::Medium => "medium",
            Preset::Slow => "slow",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EncodingParams {
    pub preset: Preset,
    pub video_bitrate: u64,
    /// Output `(width, height)` when the source has to be scaled down.
    pub scale: Option<(u32, u32)>,
    /// Output frame rate when the source exceeds the cap.
    pub frame_rate: Option<f64>,
}

impl EncodingPolicy {
    pub fn derive(&self, info: &MediaInfo) -> EncodingParams {
        // the budget follows the source frame rate even when the output is capped
        EncodingParams {
            preset: self.preset(info),
            video_bitrate: self.target_bitrate(info, info.fps),
            scale: self.scaled_dimensions(info.width, info.height),
            frame_rate: (info.fps > self.max_fps).then_some(self.max_fps),
        }
    }

    fn reference_area(&self) -> u64 {
        self.reference_width as u64 * self.reference_height as u64
    }

    /// Bitrate before the cap is applied. `None` when the source bitrate is unknown.
    pub fn uncapped_bitrate(&self, info: &MediaInfo, fps: f64) -> Option<f64> {
        let source = info.bit_rate.filter(|&b| b > 0)? as f64;
        let area_ratio = info.area() as f64 / self.reference_area() as f64;
        let fps_ratio = if fps > 0.0 { fps / self.reference_fps } else { 1.0 };

        Some(source * self.bitrate_factor * area_ratio * fps_ratio)
    }

    fn target_bitrate(&self, info: &MediaInfo, fps: f64) -> u64 {
        match self.uncapped_bitrate(info, fps) {
            Some(bitrate) if bitrate >= 1.0 => (bitrate.round() as u64).min(self.max_bitrate),
            _ => self.fallback_bitrate,
        }
    }

    fn preset(&self, info: &MediaInfo) -> Preset {
        let area = info.area();
        let fast_area = self.fast_width as u64 * self.fast_height as u64;

        if area > self.reference_area() || info.duration > self.slow_duration_secs {
            Preset::Slow
        } else if area < fast_area && info.duration < self.fast_duration_secs {
            Preset::Faster
        } else {
            Preset::Medium
        }
    }

    /// Fits an oversized frame inside `reference_width` x `reference_height`, keeping its aspect.
    fn scaled_dimensions(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        if width as u64 * height as u64 <= self.reference_area() {
            return None;
        }

        let scale = (self.reference_width as f64 / width as f64)
            .min(self.reference_height as f64 / height as f64);
        if scale >= 1.0 {
            return None;
        }

        Some((
            round_even(width as f64 * scale),
            round_even(height as f64 * scale),
        ))
    }
}

/// Rounds down to an even pixel count, never below 2.
fn round_even(value: f64) -> u32 {
    let even = (value.floor() as u32) & !1;
    even.max(2)
}

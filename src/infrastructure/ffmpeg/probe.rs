//! ffprobe JSON parsing.

use serde::Deserialize;

use super::MediaInfo;
use crate::modules::video::error::{VideoError, VideoResult};

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    format: Option<ProbeFormat>,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    bit_rate: Option<String>,
    duration: Option<String>,
}

fn parse_frame_rate(s: &str) -> Option<f64> {
    let (num, den) = s.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    if den == 0.0 {
        return None;
    }
    Some(num / den)
}

fn parse_positive<T: std::str::FromStr + PartialOrd + Default>(s: Option<&str>) -> Option<T> {
    s.and_then(|v| v.trim().parse::<T>().ok())
        .filter(|v| *v > T::default())
}

pub fn parse_probe_json(json: &str) -> VideoResult<MediaInfo> {
    let output: ProbeOutput = serde_json::from_str(json)
        .map_err(|e| VideoError::ProbeFailed(format!("Unreadable ffprobe output: {}", e)))?;

    let stream = output
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or(VideoError::NoVideoStream)?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err(VideoError::NoVideoStream),
    };

    let format = output.format.as_ref();

    let duration = parse_positive::<f64>(format.and_then(|f| f.duration.as_deref()))
        .or_else(|| parse_positive::<f64>(stream.duration.as_deref()))
        .unwrap_or(0.0);

    let bit_rate = parse_positive::<u64>(stream.bit_rate.as_deref())
        .or_else(|| parse_positive::<u64>(format.and_then(|f| f.bit_rate.as_deref())));

    let fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .filter(|f| *f > 0.0)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_frame_rate))
        .unwrap_or(0.0);

    Ok(MediaInfo {
        width,
        height,
        duration,
        bit_rate,
        fps,
    })
}

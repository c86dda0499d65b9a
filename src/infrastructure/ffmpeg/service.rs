use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, error, info};

use super::probe::parse_probe_json;
use super::progress::ProgressParser;
use super::{MediaInfo, MediaProcessor, ProgressCallback};
use crate::modules::video::error::{VideoError, VideoResult};
use crate::modules::video::policy::EncodingParams;

/// Lines of ffmpeg stderr kept as failure details.
const STDERR_TAIL_LINES: usize = 20;

#[derive(Clone, Debug)]
pub struct FfmpegService {
    ffmpeg_path: PathBuf,
    ffprobe_path: PathBuf,
}

impl FfmpegService {
    pub fn new(ffmpeg_path: PathBuf, ffprobe_path: PathBuf) -> Self {
        info!(
            "Using ffmpeg at {} and ffprobe at {}",
            ffmpeg_path.display(),
            ffprobe_path.display()
        );
        Self {
            ffmpeg_path,
            ffprobe_path,
        }
    }
}

/// H.264/AAC MP4 arguments with machine-readable progress on stdout.
pub fn build_args(input: &Path, output: &Path, params: &EncodingParams) -> Vec<String> {
    let bitrate = params.video_bitrate.to_string();
    let mut args: Vec<String> = vec![
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-y".into(),
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-c:v".into(),
        "libx264".into(),
        "-preset".into(),
        params.preset.as_str().into(),
        "-b:v".into(),
        bitrate.clone(),
        "-maxrate".into(),
        bitrate,
        "-bufsize".into(),
        (params.video_bitrate * 2).to_string(),
    ];

    if let Some((width, height)) = params.scale {
        args.push("-vf".into());
        args.push(format!("scale={}:{}", width, height));
    }

    if let Some(fps) = params.frame_rate {
        args.push("-r".into());
        args.push(fps.to_string());
    }

    args.extend(
        [
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            "aac",
            "-b:a",
            "128k",
            "-movflags",
            "+faststart",
            "-progress",
            "pipe:1",
            "-nostats",
        ]
        .map(String::from),
    );
    args.push(output.to_string_lossy().into_owned());
    args
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[async_trait]
impl MediaProcessor for FfmpegService {
    async fn probe(&self, input: &Path) -> VideoResult<MediaInfo> {
        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(input)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| VideoError::ProbeFailed(format!("Failed to run ffprobe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VideoError::ProbeFailed(stderr_tail(&stderr)));
        }

        let json = String::from_utf8_lossy(&output.stdout);
        parse_probe_json(&json)
    }

    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        params: &EncodingParams,
        duration: f64,
        mut on_progress: ProgressCallback,
    ) -> VideoResult<()> {
        let args = build_args(input, output, params);
        debug!("Running FFmpeg: {} {}", self.ffmpeg_path.display(), args.join(" "));

        let mut child = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| VideoError::TranscodeFailed(format!("Failed to spawn ffmpeg: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| VideoError::TranscodeFailed("ffmpeg stdout not captured".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| VideoError::TranscodeFailed("ffmpeg stderr not captured".into()))?;

        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = BufReader::new(stderr).read_to_string(&mut buf).await;
            buf
        });

        let parser = ProgressParser::new(duration);
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if let Some(percent) = parser.feed(&line) {
                on_progress(percent);
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| VideoError::TranscodeFailed(format!("Failed to wait for ffmpeg: {}", e)))?;
        let stderr = stderr_task.await.unwrap_or_default();

        if status.success() {
            return Ok(());
        }

        let tail = stderr_tail(&stderr);
        error!("FFmpeg exited with {}: {}", status, tail);
        let detail = if tail.is_empty() {
            format!("ffmpeg exited with {}", status)
        } else {
            tail
        };
        Err(VideoError::TranscodeFailed(detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::video::policy::Preset;

    fn params(scale: Option<(u32, u32)>, frame_rate: Option<f64>) -> EncodingParams {
        EncodingParams {
            preset: Preset::Medium,
            video_bitrate: 2_000_000,
            scale,
            frame_rate,
        }
    }

    #[test]
    fn args_carry_policy_settings() {
        let args = build_args(
            Path::new("/tmp/in.mov"),
            Path::new("/tmp/out.mp4"),
            &params(None, None),
        );
        let joined = args.join(" ");
        assert!(joined.contains("-i /tmp/in.mov"));
        assert!(joined.contains("-preset medium"));
        assert!(joined.contains("-b:v 2000000"));
        assert!(joined.contains("-bufsize 4000000"));
        assert!(joined.contains("-progress pipe:1"));
        assert!(!joined.contains("-vf"));
        assert!(!joined.contains(" -r "));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/out.mp4"));
    }

    #[test]
    fn args_include_scale_and_frame_cap() {
        let args = build_args(
            Path::new("in.mkv"),
            Path::new("out.mp4"),
            &params(Some((1920, 1080)), Some(30.0)),
        );
        let joined = args.join(" ");
        assert!(joined.contains("-vf scale=1920:1080"));
        assert!(joined.contains("-r 30"));
    }

    #[test]
    fn stderr_tail_keeps_last_lines() {
        let stderr: String = (0..50).map(|i| format!("line {}\n", i)).collect();
        let tail = stderr_tail(&stderr);
        assert_eq!(tail.lines().count(), STDERR_TAIL_LINES);
        assert!(tail.ends_with("line 49"));
    }

    #[tokio::test]
    async fn missing_binary_is_probe_failure() {
        let service = FfmpegService::new(
            PathBuf::from("/nonexistent/ffmpeg"),
            PathBuf::from("/nonexistent/ffprobe"),
        );
        let err = service.probe(Path::new("/tmp/whatever.mp4")).await.unwrap_err();
        assert!(matches!(err, VideoError::ProbeFailed(_)));
    }
}

use axum::extract::multipart::Field;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use super::error::{VideoError, VideoResult};
use super::policy::EncodingParams;
use crate::common::filename;
use crate::common::temp::TempFile;
use crate::common::upload::{ensure_media_type, stream_to_file};
use crate::config::settings::AppConfig;
use crate::state::AppState;

/// An upload written to a request-owned temp file.
#[derive(Debug)]
pub struct StagedUpload {
    pub input: TempFile,
    pub original_name: String,
    pub size: u64,
}

#[derive(Debug)]
pub struct CompressedVideo {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub params: EncodingParams,
}

pub struct VideoService;

impl VideoService {
    pub async fn prepare_temp_dir(config: &AppConfig) -> VideoResult<()> {
        tokio::fs::create_dir_all(&config.temp_dir)
            .await
            .map_err(VideoError::TempDirUnavailable)
    }

    /// Validates and streams the `video` field to disk.
    pub async fn stage_upload(state: &AppState, field: Field<'_>) -> VideoResult<StagedUpload> {
        ensure_media_type(field.content_type(), mime::VIDEO)?;

        let original_name = field
            .file_name()
            .filter(|n| !n.is_empty())
            .unwrap_or("video.mp4")
            .to_string();
        Self::prepare_temp_dir(&state.config).await?;

        let extension = filename::extension(&original_name).unwrap_or_else(|| "bin".to_string());
        let input = TempFile::reserve(&state.config.temp_dir, "input", &original_name, &extension);
        let size = stream_to_file(field, input.path(), state.config.max_video_bytes).await?;

        if size == 0 {
            return Err(VideoError::MissingFile);
        }

        info!("Staged upload {} ({} bytes)", original_name, size);
        Ok(StagedUpload {
            input,
            original_name,
            size,
        })
    }

    /// Runs the job on its own task so a client disconnect does not abort the transcode.
    pub async fn compress(state: AppState, upload: StagedUpload) -> VideoResult<CompressedVideo> {
        let job_id = Uuid::new_v4();
        let span = info_span!("video_job", %job_id);

        tokio::spawn(Self::run_job(state, upload).instrument(span))
            .await
            .map_err(|e| VideoError::TranscodeFailed(format!("Job task failed: {}", e)))?
    }

    async fn run_job(state: AppState, upload: StagedUpload) -> VideoResult<CompressedVideo> {
        let StagedUpload {
            input,
            original_name,
            size,
        } = upload;
        let output = TempFile::reserve(&state.config.temp_dir, "compressed", &original_name, "mp4");

        let _slot = state.transcode_slot.lock().await;
        state.progress.reset();
        info!("Compressing {} ({} bytes)", original_name, size);

        let result = async {
            let params = state.worker.run(input.path(), output.path()).await?;
            let bytes = tokio::fs::read(output.path())
                .await
                .map_err(|_| VideoError::OutputMissing)?;
            if bytes.is_empty() {
                return Err(VideoError::OutputMissing);
            }
            Ok((params, bytes))
        }
        .await;

        input.remove().await;
        output.remove().await;

        let (params, bytes) = result?;
        info!(
            "Compressed {} from {} to {} bytes",
            original_name,
            size,
            bytes.len()
        );

        Ok(CompressedVideo {
            bytes,
            file_name: filename::output_file_name(&original_name),
            params,
        })
    }
}

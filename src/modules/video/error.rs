use std::path::PathBuf;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::common::response::ErrorBody;

pub type VideoResult<T> = Result<T, VideoError>;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("No video file found in the request")]
    MissingFile,

    #[error("Video exceeds the {limit} byte upload limit")]
    FileTooLarge { limit: u64 },

    #[error("Unsupported file type: {0}")]
    WrongFileType(String),

    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Failed to read video metadata")]
    ProbeFailed(String),

    #[error("No decodable video stream in input")]
    NoVideoStream,

    #[error("Video transcoding failed")]
    TranscodeFailed(String),

    #[error("Transcoder produced no output")]
    OutputMissing,

    #[error("Temporary directory unavailable")]
    TempDirUnavailable(#[source] std::io::Error),

    #[error("Failed to read upload")]
    UploadReadFailed(String),

    #[error("Failed to write upload to disk")]
    UploadWriteFailed(#[source] std::io::Error),
}

impl VideoError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            VideoError::MissingFile => StatusCode::BAD_REQUEST,
            VideoError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            VideoError::WrongFileType(_) => StatusCode::BAD_REQUEST,
            VideoError::InputNotFound(_)
            | VideoError::ProbeFailed(_)
            | VideoError::NoVideoStream
            | VideoError::TranscodeFailed(_)
            | VideoError::OutputMissing
            | VideoError::TempDirUnavailable(_)
            | VideoError::UploadReadFailed(_)
            | VideoError::UploadWriteFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            VideoError::MissingFile => "missing_file",
            VideoError::FileTooLarge { .. } => "file_too_large",
            VideoError::WrongFileType(_) => "wrong_file_type",
            VideoError::InputNotFound(_) => "input_not_found",
            VideoError::ProbeFailed(_) => "probe_failed",
            VideoError::NoVideoStream => "no_video_stream",
            VideoError::TranscodeFailed(_) => "transcode_failed",
            VideoError::OutputMissing => "output_missing",
            VideoError::TempDirUnavailable(_) => "temp_dir_unavailable",
            VideoError::UploadReadFailed(_) => "upload_read_failed",
            VideoError::UploadWriteFailed(_) => "upload_write_failed",
        }
    }

    /// Best-effort diagnostics. Not part of the stable contract.
    pub fn details(&self) -> Option<String> {
        match self {
            VideoError::ProbeFailed(detail)
            | VideoError::TranscodeFailed(detail)
            | VideoError::UploadReadFailed(detail) => Some(detail.clone()),
            VideoError::TempDirUnavailable(e) | VideoError::UploadWriteFailed(e) => {
                Some(e.to_string())
            }
            VideoError::InputNotFound(path) => Some(path.display().to_string()),
            _ => None,
        }
    }
}

impl IntoResponse for VideoError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, details = ?self.details(), "Video compression failed");
        } else {
            tracing::warn!(error = %self, "Rejected video upload");
        }

        let body = ErrorBody {
            message: self.to_string(),
            details: self.details(),
            error: Some(self.code().to_string()),
        };
        (status, Json(body)).into_response()
    }
}

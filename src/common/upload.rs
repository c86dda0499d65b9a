use std::path::Path;

use axum::{
    body::Bytes,
    extract::multipart::{Field, MultipartError},
    http::StatusCode,
};
use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

use crate::modules::video::error::{VideoError, VideoResult};

/// Writes an upload to disk chunk by chunk, enforcing a byte limit.
pub struct FileUploader {
    file: File,
    written: u64,
    limit: u64,
}

impl FileUploader {
    pub async fn new(path: &Path, limit: u64) -> VideoResult<Self> {
        let file = File::create(path)
            .await
            .map_err(VideoError::UploadWriteFailed)?;

        Ok(Self {
            file,
            written: 0,
            limit,
        })
    }

    pub async fn write_chunk(&mut self, chunk: Bytes) -> VideoResult<()> {
        self.written += chunk.len() as u64;
        if self.written > self.limit {
            return Err(VideoError::FileTooLarge { limit: self.limit });
        }

        self.file
            .write_all(&chunk)
            .await
            .map_err(VideoError::UploadWriteFailed)
    }

    pub async fn finish(mut self) -> VideoResult<u64> {
        self.file
            .flush()
            .await
            .map_err(VideoError::UploadWriteFailed)?;
        Ok(self.written)
    }
}

/// Checks the declared part type against a top-level media category such as `video`.
pub fn ensure_media_type(content_type: Option<&str>, category: mime::Name<'_>) -> VideoResult<()> {
    let raw = content_type.unwrap_or("application/octet-stream");
    match raw.parse::<mime::Mime>() {
        Ok(parsed) if parsed.type_() == category => Ok(()),
        _ => Err(VideoError::WrongFileType(raw.to_string())),
    }
}

pub fn read_error(e: MultipartError, limit: u64) -> VideoError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        VideoError::FileTooLarge { limit }
    } else {
        VideoError::UploadReadFailed(e.body_text())
    }
}

/// Streams one multipart field into `path`. Returns the number of bytes written.
/// The caller owns `path` and is responsible for removing it on failure.
pub async fn stream_to_file(mut field: Field<'_>, path: &Path, limit: u64) -> VideoResult<u64> {
    let mut uploader = FileUploader::new(path, limit).await?;

    while let Some(chunk) = field.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                error!("Stream error: {}", e);
                return Err(read_error(e, limit));
            }
        };

        uploader.write_chunk(chunk).await?;
    }

    let written = uploader.finish().await?;
    debug!("Staged {} bytes to {}", written, path.display());
    Ok(written)
}

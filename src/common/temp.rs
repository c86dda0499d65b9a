use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::distr::Alphanumeric;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::common::filename;

/// A temp path owned by one request. The file is removed when the guard is
/// dropped, whichever way the owning scope exits.
#[derive(Debug)]
pub struct TempFile {
    path: PathBuf,
    released: bool,
}

impl TempFile {
    /// Reserves a collision-resistant path inside `dir` without creating it:
    /// `<prefix>-<unix ms>-<random>-<sanitized stem>.<ext>`.
    pub fn reserve(dir: &Path, prefix: &str, original_name: &str, extension: &str) -> Self {
        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect();
        let name = format!(
            "{}-{}-{}-{}.{}",
            prefix,
            millis,
            suffix.to_ascii_lowercase(),
            filename::sanitized_stem(original_name),
            extension
        );

        Self {
            path: dir.join(name),
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the file now. Failures are logged, never returned.
    pub async fn remove(mut self) {
        self.released = true;
        log_removal(&self.path, tokio::fs::remove_file(&self.path).await);
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.released {
            log_removal(&self.path, std::fs::remove_file(&self.path));
        }
    }
}

fn log_removal(path: &Path, result: io::Result<()>) {
    match result {
        Ok(()) => debug!("Removed temp file {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove temp file {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_paths_are_unique() {
        let dir = std::env::temp_dir();
        let a = TempFile::reserve(&dir, "input", "clip.mov", "mov");
        let b = TempFile::reserve(&dir, "input", "clip.mov", "mov");
        assert_ne!(a.path(), b.path());

        let name = a.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("input-"));
        assert!(name.ends_with("-clip.mov"));
    }

    #[test]
    fn drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let temp = TempFile::reserve(dir.path(), "input", "a.mp4", "mp4");
        std::fs::write(temp.path(), b"data").unwrap();
        let path = temp.path().to_path_buf();

        drop(temp);
        assert!(!path.exists());
    }

    #[test]
    fn drop_without_file_is_harmless() {
        let dir = tempfile::tempdir().unwrap();
        let temp = TempFile::reserve(dir.path(), "output", "a.mp4", "mp4");
        drop(temp);
    }

    #[tokio::test]
    async fn explicit_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let temp = TempFile::reserve(dir.path(), "input", "a.mp4", "mp4");
        tokio::fs::write(temp.path(), b"data").await.unwrap();
        let path = temp.path().to_path_buf();

        temp.remove().await;
        assert!(!path.exists());

        // a second guard on the same path sees NotFound and stays quiet
        let again = TempFile {
            path: path.clone(),
            released: false,
        };
        again.remove().await;
        assert!(!path.exists());
    }
}

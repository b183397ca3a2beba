use base64::{engine::general_purpose, Engine as _};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tempfile::NamedTempFile;

#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("reference audio is not valid base64: {0}")]
    Decode(String),
    #[error("reference audio must be a RIFF/WAVE file")]
    NotWav,
    #[error("reference audio is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },
    #[error("audio prompt path '{0}' must be a file name inside the voices directory")]
    InvalidPath(String),
    #[error("reference audio '{0}' not found")]
    NotFound(String),
    #[error("failed to store reference audio: {0}")]
    Io(#[from] std::io::Error),
}

/// Reference clip the voice model is conditioned on.
///
/// Uploaded clips live in a named temp file that is removed when the value
/// is dropped, whether synthesis succeeded or not.
#[derive(Debug)]
pub struct ReferenceAudio {
    path: PathBuf,
    temp_file: Option<NamedTempFile>,
}

impl ReferenceAudio {
    /// Decode an uploaded base64 WAV clip into a temp file
    pub fn from_base64(encoded: &str, max_bytes: usize) -> Result<Self, ReferenceError> {
        let audio_data = general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| ReferenceError::Decode(e.to_string()))?;

        if audio_data.len() > max_bytes {
            return Err(ReferenceError::TooLarge {
                size: audio_data.len(),
                limit: max_bytes,
            });
        }

        if !is_wav(&audio_data) {
            return Err(ReferenceError::NotWav);
        }

        let mut temp_file = tempfile::Builder::new()
            .prefix("reference-")
            .suffix(".wav")
            .tempfile()?;
        temp_file.write_all(&audio_data)?;
        temp_file.flush()?;

        let path = temp_file.path().to_path_buf();
        tracing::info!(
            path = %path.display(),
            size_bytes = audio_data.len(),
            "Using uploaded reference audio"
        );

        Ok(Self {
            path,
            temp_file: Some(temp_file),
        })
    }

    /// Resolve a stored clip by name inside `voices_dir`
    pub fn from_voices_dir(voices_dir: &Path, name: &str) -> Result<Self, ReferenceError> {
        let relative = Path::new(name);
        let is_contained = !name.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !is_contained {
            return Err(ReferenceError::InvalidPath(name.to_string()));
        }

        let path = voices_dir.join(relative);
        if !path.is_file() {
            return Err(ReferenceError::NotFound(name.to_string()));
        }

        Ok(Self {
            path,
            temp_file: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_uploaded(&self) -> bool {
        self.temp_file.is_some()
    }

    /// Last modification time of the clip, when the filesystem reports one
    pub fn modified(&self) -> Option<SystemTime> {
        std::fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }
}

fn is_wav(data: &[u8]) -> bool {
    data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WAVE"
}

impl Drop for ReferenceAudio {
    fn drop(&mut self) {
        if let Some(temp_file) = self.temp_file.take() {
            match temp_file.close() {
                Ok(()) => tracing::debug!(path = %self.path.display(), "Cleaned up temporary file"),
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Error cleaning up temporary file"
                ),
            }
        }
    }
}

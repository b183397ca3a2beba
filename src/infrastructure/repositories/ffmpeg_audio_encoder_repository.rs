use super::audio_encoder_repository::AudioEncoderRepository;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Instant;
use tokio::process::Command;

/// AAC in an MP4 container, the `ipod` muxer
const M4A_CONTENT_TYPE: &str = "audio/mp4";

/// ffmpeg implementation of the audio encoder repository (WAV -> M4A)
pub struct FfmpegAudioEncoderRepository {
    ffmpeg_path: PathBuf,
}

impl FfmpegAudioEncoderRepository {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }
}

#[async_trait]
impl AudioEncoderRepository for FfmpegAudioEncoderRepository {
    async fn encode(&self, wav_data: Vec<u8>) -> Result<Vec<u8>, String> {
        let start_time = Instant::now();
        let input_size = wav_data.len();

        // The MP4 muxer needs a seekable output, so go through files
        let input_file = tempfile::Builder::new()
            .prefix("tts-")
            .suffix(".wav")
            .tempfile()
            .map_err(|e| format!("Failed to create temp input: {}", e))?;
        let output_file = tempfile::Builder::new()
            .prefix("tts-")
            .suffix(".m4a")
            .tempfile()
            .map_err(|e| format!("Failed to create temp output: {}", e))?;

        tokio::fs::write(input_file.path(), wav_data)
            .await
            .map_err(|e| format!("Failed to write temp input: {}", e))?;

        let output = Command::new(&self.ffmpeg_path)
            .args(["-hide_banner", "-loglevel", "error", "-y", "-f", "wav", "-i"])
            .arg(input_file.path())
            .args(["-c:a", "aac", "-f", "ipod"])
            .arg(output_file.path())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    ffmpeg_path = %self.ffmpeg_path.display(),
                    "Failed to run ffmpeg"
                );
                format!("Failed to run ffmpeg: {}", e)
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(
                status = %output.status,
                stderr = %stderr,
                "ffmpeg transcoding failed"
            );
            return Err(format!("ffmpeg transcoding failed: {}", stderr.trim()));
        }

        let encoded = tokio::fs::read(output_file.path())
            .await
            .map_err(|e| format!("Failed to read transcoded audio: {}", e))?;

        tracing::info!(
            encoder = "ffmpeg",
            format = "m4a",
            latency_ms = start_time.elapsed().as_millis(),
            input_size_bytes = input_size,
            output_size_bytes = encoded.len(),
            "Audio transcoded"
        );

        Ok(encoded)
    }

    fn content_type(&self) -> &'static str {
        M4A_CONTENT_TYPE
    }

    async fn health_check(&self) -> Result<(), String> {
        let output = Command::new(&self.ffmpeg_path)
            .arg("-version")
            .output()
            .await
            .map_err(|e| format!("ffmpeg not available: {}", e))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(format!("ffmpeg -version exited with {}", output.status))
        }
    }
}

use super::tts_repository::TtsRepository;
use crate::domain::tts::LanguageId;
use crate::infrastructure::audio::Waveform;
use crate::infrastructure::onnx::ChatterboxModel;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Chatterbox multilingual ONNX implementation of the TTS repository
pub struct ChatterboxTtsRepository {
    model: Arc<Mutex<ChatterboxModel>>,
    sample_rate: u32,
}

impl ChatterboxTtsRepository {
    pub fn new(model: ChatterboxModel) -> Self {
        let sample_rate = model.sample_rate();
        Self {
            model: Arc::new(Mutex::new(model)),
            sample_rate,
        }
    }
}

#[async_trait]
impl TtsRepository for ChatterboxTtsRepository {
    async fn synthesize(
        &self,
        text: &str,
        language: LanguageId,
        reference_audio: &Path,
    ) -> Result<Waveform, String> {
        let start_time = Instant::now();

        tracing::info!(
            language = %language,
            reference_audio = %reference_audio.display(),
            text_length = text.len(),
            text_preview = %text.chars().take(100).collect::<String>(),
            "Starting Chatterbox synthesis"
        );

        let model = self.model.clone();
        let input = text.to_string();
        let reference = reference_audio.to_path_buf();

        let samples = tokio::task::spawn_blocking(move || {
            model.lock().generate(&input, language, &reference)
        })
        .await
        .map_err(|e| format!("Synthesis task failed: {}", e))?
        .map_err(|e| {
            tracing::error!(
                error = %e,
                language = %language,
                text_length = text.len(),
                "Chatterbox synthesis failed"
            );
            format!("Chatterbox error: {}", e)
        })?;

        let waveform = Waveform::new(samples, self.sample_rate);
        let duration = start_time.elapsed();
        let audio_seconds = waveform.duration_seconds();

        tracing::info!(
            provider = "chatterbox",
            language = %language,
            latency_ms = duration.as_millis(),
            audio_seconds = format!("{:.2}", audio_seconds),
            real_time_factor = format!("{:.2}", duration.as_secs_f32() / audio_seconds.max(f32::EPSILON)),
            "TTS synthesis completed"
        );

        Ok(waveform)
    }
}

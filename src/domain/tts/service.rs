use super::dto::TtsRequest;
use super::error::TtsServiceError;
use super::language::LanguageId;
use super::reference::{ReferenceAudio, ReferenceError};
use super::text::strip_non_standard_diacritics;
use crate::infrastructure::audio::encode_wav;
use crate::infrastructure::repositories::{
    AudioEncoderRepository, DiacriticsRepository, TtsRepository,
};
use async_trait::async_trait;
use moka::future::Cache;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

#[derive(Debug, Clone)]
pub struct TtsSynthesisResult {
    pub audio_data: Vec<u8>,
    pub processed_text: String,
    pub language: LanguageId,
    pub sample_rate: u32,
    pub duration_seconds: f32,
}

/// Request limits and reference clip location
#[derive(Debug, Clone)]
pub struct TtsSettings {
    pub voices_dir: PathBuf,
    pub default_audio_prompt: String,
    pub max_text_length: usize,
    pub max_reference_audio_bytes: usize,
    pub cache_enabled: bool,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct CacheKey {
    text: String,
    language: LanguageId,
    reference: PathBuf,
    reference_modified: Option<SystemTime>,
    add_diacritics: bool,
}

pub struct TtsService {
    diacritics_repo: Arc<dyn DiacriticsRepository>,
    tts_repo: Arc<dyn TtsRepository>,
    encoder_repo: Arc<dyn AudioEncoderRepository>,
    settings: TtsSettings,
    cache: Option<Cache<CacheKey, TtsSynthesisResult>>,
}

impl TtsService {
    pub fn new(
        diacritics_repo: Arc<dyn DiacriticsRepository>,
        tts_repo: Arc<dyn TtsRepository>,
        encoder_repo: Arc<dyn AudioEncoderRepository>,
        settings: TtsSettings,
    ) -> Self {
        let cache = if settings.cache_enabled {
            Some(
                Cache::builder()
                    .max_capacity(100)
                    .time_to_idle(Duration::from_secs(30 * 60)) // 30 minutes, refreshes on access
                    .build(),
            )
        } else {
            None
        };

        Self {
            diacritics_repo,
            tts_repo,
            encoder_repo,
            settings,
            cache,
        }
    }
}

#[async_trait]
pub trait TtsServiceApi: Send + Sync {
    /// Synthesize speech for a request
    ///
    /// This operation:
    /// - Validates text length and language
    /// - Resolves the reference clip (uploaded or stored)
    /// - Adds Hebrew diacritics when requested
    /// - Runs voice-cloning synthesis and transcodes the result to M4A
    ///
    /// Returns the encoded audio along with the text that was actually spoken
    async fn synthesize(&self, request: TtsRequest) -> Result<TtsSynthesisResult, TtsServiceError>;

    /// Verify the audio encoder can run
    async fn check_encoder(&self) -> Result<(), TtsServiceError>;
}

#[async_trait]
impl TtsServiceApi for TtsService {
    async fn synthesize(&self, request: TtsRequest) -> Result<TtsSynthesisResult, TtsServiceError> {
        let start_time = Instant::now();

        tracing::info!(
            text_length = request.text.chars().count(),
            language_id = %request.language_id,
            audio_prompt_path = ?request.audio_prompt_path,
            has_reference_upload = request
                .reference_audio_base64
                .as_deref()
                .is_some_and(|encoded| !encoded.trim().is_empty()),
            add_diacritics = request.add_diacritics,
            "TTS synthesis request"
        );

        // 1. Validate input
        let text = self.validate_text(&request.text)?;
        let language: LanguageId = request
            .language_id
            .parse()
            .map_err(TtsServiceError::Invalid)?;

        // 2. Resolve the reference clip, an uploaded one is removed when this scope ends
        let reference = self.resolve_reference(&request)?;

        // 3. Check cache, uploaded clips are never cached
        let cache_key = CacheKey {
            text: text.clone(),
            language,
            reference: reference.path().to_path_buf(),
            reference_modified: reference.modified(),
            add_diacritics: request.add_diacritics,
        };
        if let Some(cache) = self.cache.as_ref().filter(|_| !reference.is_uploaded()) {
            if let Some(cached_result) = cache.get(&cache_key).await {
                tracing::info!(
                    language = %language,
                    cached_audio_size = cached_result.audio_data.len(),
                    "TTS cache hit - returning cached audio"
                );
                return Ok(cached_result);
            }
        }

        // 4. Diacritize
        let processed_text = if request.add_diacritics {
            let diacritized = self
                .diacritics_repo
                .add_diacritics(&text)
                .await
                .map_err(TtsServiceError::Dependency)?;
            strip_non_standard_diacritics(&diacritized)
        } else {
            text
        };

        tracing::info!(
            processed_length = processed_text.chars().count(),
            add_diacritics = request.add_diacritics,
            "Text prepared for synthesis"
        );

        // 5. Synthesize
        let waveform = self
            .tts_repo
            .synthesize(&processed_text, language, reference.path())
            .await
            .map_err(TtsServiceError::Dependency)?;

        // 6. Encode
        let wav_data = encode_wav(&waveform)
            .map_err(|e| TtsServiceError::Other(anyhow::anyhow!("WAV encoding failed: {}", e)))?;
        let audio_data = self
            .encoder_repo
            .encode(wav_data)
            .await
            .map_err(TtsServiceError::Dependency)?;

        let result = TtsSynthesisResult {
            audio_data,
            processed_text,
            language,
            sample_rate: waveform.sample_rate,
            duration_seconds: waveform.duration_seconds(),
        };

        tracing::info!(
            language = %language,
            content_type = self.encoder_repo.content_type(),
            audio_size = result.audio_data.len(),
            duration_seconds = format!("{:.2}", result.duration_seconds),
            latency_ms = start_time.elapsed().as_millis(),
            "TTS synthesis completed"
        );

        // 7. Cache the result if caching is enabled
        if let Some(cache) = self.cache.as_ref().filter(|_| !reference.is_uploaded()) {
            cache.insert(cache_key, result.clone()).await;
            tracing::info!(audio_size = result.audio_data.len(), "TTS result cached");
        }

        Ok(result)
    }

    async fn check_encoder(&self) -> Result<(), TtsServiceError> {
        self.encoder_repo
            .health_check()
            .await
            .map_err(TtsServiceError::Dependency)
    }
}

impl TtsService {
    fn validate_text(&self, text: &str) -> Result<String, TtsServiceError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(TtsServiceError::Invalid("Text must not be empty".to_string()));
        }

        let length = trimmed.chars().count();
        if length > self.settings.max_text_length {
            return Err(TtsServiceError::TooLarge(format!(
                "Text is {} characters, limit is {}",
                length, self.settings.max_text_length
            )));
        }

        Ok(trimmed.to_string())
    }

    fn resolve_reference(&self, request: &TtsRequest) -> Result<ReferenceAudio, TtsServiceError> {
        let upload = request
            .reference_audio_base64
            .as_deref()
            .filter(|encoded| !encoded.trim().is_empty());

        if let Some(encoded) = upload {
            match ReferenceAudio::from_base64(encoded, self.settings.max_reference_audio_bytes) {
                Ok(reference) => return Ok(reference),
                Err(ReferenceError::Decode(e)) => {
                    tracing::warn!(
                        error = %e,
                        "Could not decode uploaded reference audio, using audio_prompt_path"
                    );
                }
                Err(e) => return Err(map_reference_error(e)),
            }
        }

        let name = request
            .audio_prompt_path
            .as_deref()
            .unwrap_or(&self.settings.default_audio_prompt);

        ReferenceAudio::from_voices_dir(&self.settings.voices_dir, name).map_err(map_reference_error)
    }
}

fn map_reference_error(err: ReferenceError) -> TtsServiceError {
    match err {
        ReferenceError::TooLarge { .. } => TtsServiceError::TooLarge(err.to_string()),
        ReferenceError::Decode(_)
        | ReferenceError::NotWav
        | ReferenceError::InvalidPath(_)
        | ReferenceError::NotFound(_) => TtsServiceError::Invalid(err.to_string()),
        ReferenceError::Io(e) => TtsServiceError::Other(e.into()),
    }
}

use crate::domain::tts::LanguageId;
use crate::infrastructure::audio::Waveform;
use async_trait::async_trait;
use std::path::Path;

/// Repository for voice-cloning speech synthesis.
/// Abstracts the underlying TTS model.
///
/// Implementations are responsible for:
/// - Loading and conditioning on the reference clip
/// - Model-specific text preparation (punctuation, language tags)
/// - Returning mono audio at the model's native sample rate
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize text to speech in the voice of the reference clip
    ///
    /// # Arguments
    /// * `text` - The text to speak, already diacritized if requested
    /// * `language` - The target language for synthesis
    /// * `reference_audio` - WAV clip of the voice to clone
    ///
    /// # Errors
    /// Returns error if synthesis fails or the reference clip cannot be read
    async fn synthesize(
        &self,
        text: &str,
        language: LanguageId,
        reference_audio: &Path,
    ) -> Result<Waveform, String>;
}

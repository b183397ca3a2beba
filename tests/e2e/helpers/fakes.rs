use async_trait::async_trait;
use hebrew_tts_backend::domain::tts::LanguageId;
use hebrew_tts_backend::infrastructure::audio::Waveform;
use hebrew_tts_backend::infrastructure::repositories::{
    AudioEncoderRepository, DiacriticsRepository, TtsRepository,
};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub const FAKE_SAMPLE_RATE: u32 = 24000;

/// Prefix the fake encoder puts in front of the WAV header
pub const FAKE_M4A_MAGIC: &[u8] = b"ftypM4A ";

/// Adds a qamats and a stress mark after every Hebrew letter
#[derive(Default)]
pub struct FakeDiacritics {
    pub calls: AtomicUsize,
}

#[async_trait]
impl DiacriticsRepository for FakeDiacritics {
    async fn add_diacritics(&self, text: &str) -> Result<String, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut output = String::new();
        for c in text.chars() {
            output.push(c);
            if ('\u{05D0}'..='\u{05EA}').contains(&c) {
                output.push('\u{05B8}');
                output.push('\u{05AB}');
            }
        }
        Ok(output)
    }
}

/// Records every call and returns a quarter second of silence
#[derive(Default)]
pub struct FakeTts {
    pub calls: Mutex<Vec<SynthesisCall>>,
}

#[derive(Debug, Clone)]
pub struct SynthesisCall {
    pub text: String,
    pub language: LanguageId,
    pub reference: PathBuf,
    pub reference_existed: bool,
}

#[async_trait]
impl TtsRepository for FakeTts {
    async fn synthesize(
        &self,
        text: &str,
        language: LanguageId,
        reference_audio: &Path,
    ) -> Result<Waveform, String> {
        self.calls.lock().push(SynthesisCall {
            text: text.to_string(),
            language,
            reference: reference_audio.to_path_buf(),
            reference_existed: reference_audio.is_file(),
        });
        Ok(Waveform::new(
            vec![0.0; FAKE_SAMPLE_RATE as usize / 4],
            FAKE_SAMPLE_RATE,
        ))
    }
}

pub struct FakeEncoder {
    pub healthy: AtomicBool,
}

impl Default for FakeEncoder {
    fn default() -> Self {
        Self {
            healthy: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl AudioEncoderRepository for FakeEncoder {
    async fn encode(&self, wav_data: Vec<u8>) -> Result<Vec<u8>, String> {
        let mut encoded = FAKE_M4A_MAGIC.to_vec();
        encoded.extend_from_slice(&wav_data[..12.min(wav_data.len())]);
        Ok(encoded)
    }

    fn content_type(&self) -> &'static str {
        "audio/mp4"
    }

    async fn health_check(&self) -> Result<(), String> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err("ffmpeg not available".to_string())
        }
    }
}

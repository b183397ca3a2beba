use crate::domain::tts::TtsSettings;
use crate::infrastructure::onnx::GenerationSettings;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    /// Bearer token required on POST /tts when set
    pub api_key: Option<String>,
    // Models
    pub phonikud_model_path: PathBuf,
    pub phonikud_tokenizer_path: PathBuf,
    pub chatterbox_model_dir: PathBuf,
    pub onnx_threads: Option<usize>,
    pub max_new_tokens: usize,
    pub exaggeration: f32,
    pub repetition_penalty: f32,
    // Audio
    pub voices_dir: PathBuf,
    pub default_audio_prompt: String,
    pub ffmpeg_path: PathBuf,
    // HTTP
    pub web_dir: PathBuf,
    pub max_text_length: usize,
    pub max_reference_audio_bytes: usize,
    pub max_request_bytes: usize,
    // TTS Cache
    pub tts_cache_enabled: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()?,
            environment: match env::var("ENVIRONMENT").as_deref() {
                Ok("production") => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            api_key: env::var("API_KEY").ok().filter(|key| !key.is_empty()),
            phonikud_model_path: env::var("PHONIKUD_MODEL_PATH")
                .unwrap_or_else(|_| "phonikud-1.0.int8.onnx".to_string())
                .into(),
            phonikud_tokenizer_path: env::var("PHONIKUD_TOKENIZER_PATH")
                .unwrap_or_else(|_| "dictabert-large-char-menaked/tokenizer.json".to_string())
                .into(),
            chatterbox_model_dir: env::var("CHATTERBOX_MODEL_DIR")
                .unwrap_or_else(|_| "chatterbox-multilingual-onnx".to_string())
                .into(),
            onnx_threads: env::var("ONNX_THREADS")
                .ok()
                .map(|threads| threads.parse())
                .transpose()?,
            max_new_tokens: env::var("MAX_NEW_TOKENS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()?,
            exaggeration: env::var("EXAGGERATION")
                .unwrap_or_else(|_| "0.5".to_string())
                .parse()?,
            repetition_penalty: env::var("REPETITION_PENALTY")
                .unwrap_or_else(|_| "1.2".to_string())
                .parse()?,
            voices_dir: env::var("VOICES_DIR")
                .unwrap_or_else(|_| ".".to_string())
                .into(),
            default_audio_prompt: env::var("DEFAULT_AUDIO_PROMPT")
                .unwrap_or_else(|_| "ref3.wav".to_string()),
            ffmpeg_path: env::var("FFMPEG_PATH")
                .unwrap_or_else(|_| "ffmpeg".to_string())
                .into(),
            web_dir: env::var("WEB_DIR").unwrap_or_else(|_| "web".to_string()).into(),
            max_text_length: env::var("MAX_TEXT_LENGTH")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()?,
            max_reference_audio_bytes: env::var("MAX_REFERENCE_AUDIO_BYTES")
                .unwrap_or_else(|_| "10485760".to_string())
                .parse()?,
            max_request_bytes: env::var("MAX_REQUEST_BYTES")
                .unwrap_or_else(|_| "20971520".to_string())
                .parse()?,
            tts_cache_enabled: env::var("TTS_CACHE_ENABLED")
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(false),
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Log filter used when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> &'static str {
        if self.is_development() {
            "hebrew_tts_backend=debug,tower_http=debug"
        } else {
            "hebrew_tts_backend=info,tower_http=info"
        }
    }

    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            max_new_tokens: self.max_new_tokens,
            exaggeration: self.exaggeration,
            repetition_penalty: self.repetition_penalty,
        }
    }

    pub fn tts_settings(&self) -> TtsSettings {
        TtsSettings {
            voices_dir: self.voices_dir.clone(),
            default_audio_prompt: self.default_audio_prompt.clone(),
            max_text_length: self.max_text_length,
            max_reference_audio_bytes: self.max_reference_audio_bytes,
            cache_enabled: self.tts_cache_enabled,
        }
    }
}

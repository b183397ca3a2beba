use serde::{Deserialize, Serialize};

fn default_text() -> String {
    "שלום עולם".to_string()
}

fn default_language_id() -> String {
    "he".to_string()
}

fn default_add_diacritics() -> bool {
    true
}

/// Request for POST /tts and for serverless job input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsRequest {
    #[serde(default = "default_text")]
    pub text: String,
    #[serde(default = "default_language_id")]
    pub language_id: String,
    /// Reference clip inside the voices directory, defaults to the configured prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_prompt_path: Option<String>,
    #[serde(default = "default_add_diacritics")]
    pub add_diacritics: bool,
    /// Uploaded WAV clip, takes precedence over `audio_prompt_path`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_audio_base64: Option<String>,
}

impl Default for TtsRequest {
    fn default() -> Self {
        Self {
            text: default_text(),
            language_id: default_language_id(),
            audio_prompt_path: None,
            add_diacritics: default_add_diacritics(),
            reference_audio_base64: None,
        }
    }
}

/// Response for POST /tts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsResponse {
    pub audio_base64: String,
    pub processed_text: String,
}

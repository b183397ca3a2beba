use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;

use super::fakes::FAKE_M4A_MAGIC;

/// Check a POST /tts body and return the decoded audio
pub fn assert_tts_response(body: &Value) -> Vec<u8> {
    let audio_base64 = body
        .get("audio_base64")
        .and_then(|v| v.as_str())
        .expect("Missing audio_base64");
    assert!(
        body.get("processed_text").and_then(|v| v.as_str()).is_some(),
        "Missing processed_text"
    );

    let audio = general_purpose::STANDARD
        .decode(audio_base64)
        .expect("audio_base64 is not valid base64");
    assert!(audio.starts_with(FAKE_M4A_MAGIC), "Audio was not transcoded");
    assert_eq!(&audio[FAKE_M4A_MAGIC.len()..][..4], b"RIFF");
    assert_eq!(&audio[FAKE_M4A_MAGIC.len() + 8..][..4], b"WAVE");

    audio
}

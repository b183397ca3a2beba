pub mod audio_encoder_repository;
pub mod chatterbox_tts_repository;
pub mod diacritics_repository;
pub mod ffmpeg_audio_encoder_repository;
pub mod phonikud_diacritics_repository;
pub mod tts_repository;

pub use audio_encoder_repository::AudioEncoderRepository;
pub use chatterbox_tts_repository::ChatterboxTtsRepository;
pub use diacritics_repository::DiacriticsRepository;
pub use ffmpeg_audio_encoder_repository::FfmpegAudioEncoderRepository;
pub use phonikud_diacritics_repository::PhonikudDiacriticsRepository;
pub use tts_repository::TtsRepository;

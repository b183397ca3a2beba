pub mod dto;
pub mod error;
pub mod language;
pub mod reference;
pub mod service;
pub mod text;

pub use dto::{TtsRequest, TtsResponse};
pub use error::TtsServiceError;
pub use language::LanguageId;
pub use reference::ReferenceAudio;
pub use service::{TtsService, TtsServiceApi, TtsSettings, TtsSynthesisResult};

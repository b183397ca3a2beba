use async_trait::async_trait;

/// Repository for adding Hebrew diacritics (niqqud) to text.
/// Abstracts the underlying diacritization model.
#[async_trait]
pub trait DiacriticsRepository: Send + Sync {
    /// Return `text` with niqqud and the model's phonetic marks added.
    ///
    /// The output may contain non-standard marks (stress, vocal shva,
    /// prefix); callers strip them before synthesis.
    async fn add_diacritics(&self, text: &str) -> Result<String, String>;
}

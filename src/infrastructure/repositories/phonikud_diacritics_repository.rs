use super::diacritics_repository::DiacriticsRepository;
use crate::infrastructure::onnx::PhonikudModel;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Phonikud ONNX implementation of the diacritics repository
pub struct PhonikudDiacriticsRepository {
    model: Arc<Mutex<PhonikudModel>>,
}

impl PhonikudDiacriticsRepository {
    pub fn new(model: PhonikudModel) -> Self {
        Self {
            model: Arc::new(Mutex::new(model)),
        }
    }
}

#[async_trait]
impl DiacriticsRepository for PhonikudDiacriticsRepository {
    async fn add_diacritics(&self, text: &str) -> Result<String, String> {
        let start_time = Instant::now();
        let model = self.model.clone();
        let input = text.to_string();

        // Inference is CPU-bound, keep it off the async workers
        let diacritized = tokio::task::spawn_blocking(move || model.lock().add_diacritics(&input))
            .await
            .map_err(|e| format!("Diacritization task failed: {}", e))?
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    text_length = text.len(),
                    "Phonikud diacritization failed"
                );
                format!("Phonikud error: {}", e)
            })?;

        tracing::info!(
            provider = "phonikud",
            latency_ms = start_time.elapsed().as_millis(),
            characters_count = text.chars().count(),
            output_length = diacritized.chars().count(),
            "Diacritization completed"
        );

        Ok(diacritized)
    }
}

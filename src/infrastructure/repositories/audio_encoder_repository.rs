use async_trait::async_trait;

/// Repository for transcoding synthesized WAV audio into the delivery format.
#[async_trait]
pub trait AudioEncoderRepository: Send + Sync {
    /// Transcode a complete WAV file into the delivery container
    async fn encode(&self, wav_data: Vec<u8>) -> Result<Vec<u8>, String>;

    /// MIME type of the encoded audio
    fn content_type(&self) -> &'static str;

    /// Verify the encoder can run (used by readiness checks)
    async fn health_check(&self) -> Result<(), String>;
}

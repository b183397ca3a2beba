use hebrew_tts_backend::domain::tts::TtsService;
use hebrew_tts_backend::infrastructure::config::{Config, Environment, LogFormat};
use hebrew_tts_backend::infrastructure::http::create_router;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;

pub mod api_client;
pub mod assertions;
pub mod fakes;

use api_client::TestClient;
use fakes::{FakeDiacritics, FakeEncoder, FakeTts};

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_MAX_TEXT_LENGTH: usize = 200;
pub const TEST_MAX_REFERENCE_AUDIO_BYTES: usize = 4096;
pub const TEST_MAX_REQUEST_BYTES: usize = 64 * 1024;
pub const INDEX_HTML: &str = "<!doctype html><title>Hebrew TTS</title>";

#[derive(Debug, Clone, Default)]
pub struct TestOptions {
    pub api_key: Option<String>,
    pub cache_enabled: bool,
}

pub struct TestContext {
    pub client: TestClient,
    #[allow(dead_code)]
    pub config: Arc<Config>,
    pub diacritics: Arc<FakeDiacritics>,
    pub tts: Arc<FakeTts>,
    pub encoder: Arc<FakeEncoder>,
    pub voices_dir: PathBuf,
    _voices: TempDir,
    _web: TempDir,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        TestContext::start(TestOptions::default())
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // Temp dirs are removed via Drop
        }
    }
}

impl TestContext {
    pub async fn start(options: TestOptions) -> Self {
        // Reference clips and demo page
        let voices = tempfile::tempdir().expect("Failed to create voices dir");
        std::fs::write(voices.path().join("ref3.wav"), b"RIFF-ref3").expect("Failed to write ref3.wav");
        std::fs::write(voices.path().join("alt.wav"), b"RIFF-alt").expect("Failed to write alt.wav");

        let web = tempfile::tempdir().expect("Failed to create web dir");
        std::fs::write(web.path().join("index.html"), INDEX_HTML).expect("Failed to write index.html");
        std::fs::write(web.path().join("app.js"), "console.log('tts');").expect("Failed to write app.js");

        // Create test configuration
        let config = Arc::new(Config {
            host: "127.0.0.1".to_string(),
            port: 0, // Will be assigned by the OS
            environment: Environment::Development,
            log_format: LogFormat::Pretty,
            api_key: options.api_key,
            phonikud_model_path: PathBuf::from("unused.onnx"),
            phonikud_tokenizer_path: PathBuf::from("unused.json"),
            chatterbox_model_dir: PathBuf::from("unused"),
            onnx_threads: None,
            max_new_tokens: 1000,
            exaggeration: 0.5,
            repetition_penalty: 1.2,
            voices_dir: voices.path().to_path_buf(),
            default_audio_prompt: "ref3.wav".to_string(),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            web_dir: web.path().to_path_buf(),
            max_text_length: TEST_MAX_TEXT_LENGTH,
            max_reference_audio_bytes: TEST_MAX_REFERENCE_AUDIO_BYTES,
            max_request_bytes: TEST_MAX_REQUEST_BYTES,
            tts_cache_enabled: options.cache_enabled,
        });

        // Fake model and codec repositories
        let diacritics = Arc::new(FakeDiacritics::default());
        let tts = Arc::new(FakeTts::default());
        let encoder = Arc::new(FakeEncoder::default());
        let tts_service = Arc::new(TtsService::new(
            diacritics.clone(),
            tts.clone(),
            encoder.clone(),
            config.tts_settings(),
        ));

        let app = create_router(config.clone(), tts_service);

        // Start server
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            client: TestClient::new(&base_url),
            config,
            diacritics,
            tts,
            encoder,
            voices_dir: voices.path().to_path_buf(),
            _voices: voices,
            _web: web,
        }
    }

    pub async fn with_api_key() -> Self {
        Self::start(TestOptions {
            api_key: Some(TEST_API_KEY.to_string()),
            ..Default::default()
        })
        .await
    }
}

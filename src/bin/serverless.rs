use anyhow::Context;
use clap::Parser;
use hebrew_tts_backend::infrastructure::bootstrap::{build_tts_service, init_logging};
use hebrew_tts_backend::infrastructure::config::Config;
use hebrew_tts_backend::infrastructure::serverless::{handle_job, RunpodConfig, RunpodWorker};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_TEST_INPUT_FILE: &str = "test_input.json";

#[derive(Parser)]
#[command(name = "serverless")]
#[command(about = "Hebrew TTS serverless worker", long_about = None)]
#[command(version)]
struct Cli {
    /// Run a single job with this JSON input and print the output
    #[arg(long, conflicts_with = "test_input_file")]
    test_input: Option<String>,

    /// Run a single job read from a JSON file ({"input": {...}}) and print the output
    #[arg(long)]
    test_input_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    init_logging(&config);

    let local_input = local_job_input(&cli)?;

    let tts_service = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || build_tts_service(&config)).await??
    };
    let tts_service = Arc::new(tts_service);

    if let Some(input) = local_input {
        tracing::info!("Running local test job");
        let output = handle_job(tts_service.as_ref(), input).await;
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let runpod_config = RunpodConfig::from_env()?;
    RunpodWorker::new(runpod_config, tts_service).run().await
}

/// Job input for local mode, `None` starts the queue worker
fn local_job_input(cli: &Cli) -> anyhow::Result<Option<Value>> {
    if let Some(raw) = &cli.test_input {
        let value: Value = serde_json::from_str(raw).context("--test-input is not valid JSON")?;
        return Ok(Some(unwrap_input(value)));
    }

    let path = match &cli.test_input_file {
        Some(path) => path.clone(),
        None if std::env::var("RUNPOD_WEBHOOK_GET_JOB").is_err()
            && Path::new(DEFAULT_TEST_INPUT_FILE).is_file() =>
        {
            PathBuf::from(DEFAULT_TEST_INPUT_FILE)
        }
        None => return Ok(None),
    };

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    Ok(Some(unwrap_input(value)))
}

/// Accept both `{"input": {...}}` and a bare input object
fn unwrap_input(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("input") => {
            map.remove("input").unwrap_or(Value::Null)
        }
        other => other,
    }
}

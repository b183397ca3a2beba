use anyhow::{anyhow, Context};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::env;
use std::sync::Arc;
use std::time::Duration;

use super::handle_job;
use crate::domain::tts::TtsServiceApi;

/// Placeholder the job queue URLs carry for the worker or job id
const ID_PLACEHOLDER: &str = "$ID";

/// Wait before polling again after a transport error
const ERROR_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct RunpodConfig {
    pub get_job_url: String,
    pub post_output_url: String,
    pub api_key: String,
    pub worker_id: String,
    pub poll_interval: Duration,
}

impl RunpodConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            get_job_url: env::var("RUNPOD_WEBHOOK_GET_JOB")
                .context("RUNPOD_WEBHOOK_GET_JOB is not set")?,
            post_output_url: env::var("RUNPOD_WEBHOOK_POST_OUTPUT")
                .context("RUNPOD_WEBHOOK_POST_OUTPUT is not set")?,
            api_key: env::var("RUNPOD_AI_API_KEY").context("RUNPOD_AI_API_KEY is not set")?,
            worker_id: env::var("RUNPOD_POD_ID").unwrap_or_else(|_| "local-worker".to_string()),
            poll_interval: Duration::from_millis(
                env::var("RUNPOD_POLL_INTERVAL_MS")
                    .unwrap_or_else(|_| "1000".to_string())
                    .parse()
                    .context("RUNPOD_POLL_INTERVAL_MS must be a number")?,
            ),
        })
    }
}

/// Job taken from the queue
#[derive(Debug, Deserialize)]
struct Job {
    id: String,
    #[serde(default)]
    input: Value,
}

/// Pulls jobs from the RunPod queue and posts their results back
pub struct RunpodWorker {
    config: RunpodConfig,
    service: Arc<dyn TtsServiceApi>,
    http_client: reqwest::Client,
}

impl RunpodWorker {
    pub fn new(config: RunpodConfig, service: Arc<dyn TtsServiceApi>) -> Self {
        Self {
            config,
            service,
            http_client: reqwest::Client::new(),
        }
    }

    /// Poll for jobs until ctrl-c
    pub async fn run(&self) -> anyhow::Result<()> {
        tracing::info!(worker_id = %self.config.worker_id, "Serverless worker started");

        loop {
            let delay = match self.poll_once().await {
                Ok(true) => Duration::ZERO,
                Ok(false) => self.config.poll_interval,
                Err(e) => {
                    tracing::error!(error = %e, "Job queue request failed, backing off");
                    ERROR_BACKOFF
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping worker");
                    return Ok(());
                }
            }
        }
    }

    /// Take and process at most one job, returns whether a job was processed
    pub async fn poll_once(&self) -> anyhow::Result<bool> {
        let Some(job) = self.fetch_job().await? else {
            return Ok(false);
        };

        tracing::info!(job_id = %job.id, "Job received");
        let output = handle_job(self.service.as_ref(), job.input).await;
        self.post_output(&job.id, output).await?;

        Ok(true)
    }

    async fn fetch_job(&self) -> anyhow::Result<Option<Job>> {
        let url = job_url(&self.config.get_job_url, &self.config.worker_id);

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", &self.config.api_key)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to fetch job: {}", e))?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("Job fetch failed with {}: {}", status, error_text));
        }

        let body = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read job: {}", e))?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| anyhow!("Failed to parse job: {}", e))
    }

    async fn post_output(&self, job_id: &str, output: Value) -> anyhow::Result<()> {
        let url = job_url(&self.config.post_output_url, job_id);

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", &self.config.api_key)
            .json(&job_result(output))
            .send()
            .await
            .map_err(|e| anyhow!("Failed to post job output: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("Job output rejected with {}: {}", status, error_text));
        }

        tracing::info!(job_id = %job_id, "Job output posted");
        Ok(())
    }
}

/// Substitute the worker or job id into a queue URL
fn job_url(template: &str, id: &str) -> String {
    template.replace(ID_PLACEHOLDER, id)
}

/// Wrap a handler output the way the queue expects it
fn job_result(output: Value) -> Value {
    match output.get("error") {
        Some(error) => json!({ "error": error }),
        None => json!({ "output": output }),
    }
}

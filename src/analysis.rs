use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::{Client, Url};
use tracing::{debug, info};

use crate::model::AnalysisPayload;

/// HTTP client for the remote analysis webhook.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    client: Client,
    endpoint: Url,
}

impl AnalysisClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Self::with_client(client, endpoint)
    }

    pub fn with_client(client: Client, endpoint: &str) -> Result<Self> {
        let trimmed = endpoint.trim();
        if trimmed.is_empty() {
            bail!("analysis webhook URL is empty");
        }

        let endpoint = Url::parse(trimmed)
            .with_context(|| format!("invalid analysis webhook URL: {trimmed}"))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            bail!(
                "analysis webhook URL must use http or https, got '{}'",
                endpoint.scheme()
            );
        }

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Posts both cleaned texts and returns the Markdown report body.
    pub async fn analyze(&self, payload: &AnalysisPayload) -> Result<String> {
        info!(
            endpoint = %self.endpoint,
            entrada_chars = payload.entrada.chars().count(),
            saida_chars = payload.saida.chars().count(),
            "sending texts for analysis"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await
            .with_context(|| format!("failed to reach analysis service at {}", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), body = %body, "analysis service error body");
            bail!(
                "analysis service returned {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown status")
            );
        }

        response
            .text()
            .await
            .context("failed to read analysis report body")
    }
}

//! HTTP transport for the inspection endpoint
//!
//! Posts a batch as a JSON array to `<base_url>/inspector/v1/track`. Batches
//! are sampled before the request: a uniform draw above the batch's sampling
//! rate drops it. There is no retry; a failed batch is lost.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{BatchResponse, Transport};
use crate::config::{InspectorConfig, DEFAULT_ENDPOINT};
use crate::envelope::MessageEnvelope;
use crate::error::{InspectorError, Result};

/// Path of the batch tracking route
pub const TRACK_PATH: &str = "/inspector/v1/track";

/// Configuration for the HTTP transport
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Base URL of the inspection endpoint
    pub base_url: String,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,

    /// Apply the envelope sampling rate before sending
    pub sample: bool,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ENDPOINT.to_string(),
            timeout_ms: 5000,
            sample: true,
        }
    }
}

impl From<&InspectorConfig> for HttpTransportConfig {
    fn from(config: &InspectorConfig) -> Self {
        Self {
            base_url: config.endpoint.clone(),
            timeout_ms: config.timeout_ms,
            ..Default::default()
        }
    }
}

/// reqwest based [`Transport`]
pub struct HttpTransport {
    client: Client,
    config: HttpTransportConfig,
}

impl HttpTransport {
    /// Create a transport for the given base URL
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Result<Self> {
        Self::with_config(HttpTransportConfig {
            base_url: base_url.into(),
            timeout_ms,
            ..Default::default()
        })
    }

    pub fn with_config(config: HttpTransportConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                InspectorError::invalid_config(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    pub fn track_url(&self) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), TRACK_PATH)
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn timeout_ms(&self) -> u64 {
        self.config.timeout_ms
    }
}

/// Whether a batch survives the sampling draw
fn passes_sampling(batch: &[MessageEnvelope], draw: f64) -> bool {
    let rate = batch.first().map(|e| e.sampling_rate).unwrap_or(1.0);
    draw < rate
}

/// Read the optional rate instruction; empty or non-JSON bodies carry none
fn parse_response_body(body: &str) -> BatchResponse {
    if body.trim().is_empty() {
        return BatchResponse::delivered();
    }
    serde_json::from_str(body).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Ignoring unparseable inspector response body");
        BatchResponse::delivered()
    })
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send_batch(&self, batch: &[MessageEnvelope]) -> Result<BatchResponse> {
        if self.config.sample && !passes_sampling(batch, rand::random::<f64>()) {
            return Ok(BatchResponse::dropped());
        }

        let response = self
            .client
            .post(self.track_url())
            .json(batch)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InspectorError::UnexpectedStatus(status.as_u16()));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read inspector response body");
                String::new()
            }
        };
        Ok(parse_response_body(&body))
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Builder for HttpTransport
pub struct HttpTransportBuilder {
    config: HttpTransportConfig,
}

impl HttpTransportBuilder {
    pub fn new() -> Self {
        Self {
            config: HttpTransportConfig::default(),
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn timeout_ms(mut self, timeout: u64) -> Self {
        self.config.timeout_ms = timeout;
        self
    }

    /// Disable sampling, every batch is sent
    pub fn without_sampling(mut self) -> Self {
        self.config.sample = false;
        self
    }

    pub fn build(self) -> Result<HttpTransport> {
        HttpTransport::with_config(self.config)
    }
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::MessageAssembler;
    use crate::session::SessionContext;

    fn batch_with_rate(rate: f64) -> Vec<MessageEnvelope> {
        let config = InspectorConfig::builder()
            .api_key("k")
            .app_version("1")
            .build();
        let session = SessionContext::new("", rate);
        vec![MessageAssembler::new(&config).build_session_started(&session)]
    }

    #[test]
    fn test_transport_builder() {
        let transport = HttpTransportBuilder::new()
            .base_url("http://localhost:9000/")
            .timeout_ms(250)
            .without_sampling()
            .build()
            .unwrap();

        assert_eq!(transport.base_url(), "http://localhost:9000/");
        assert_eq!(transport.timeout_ms(), 250);
        assert_eq!(
            transport.track_url(),
            "http://localhost:9000/inspector/v1/track"
        );
        assert!(!transport.config.sample);
    }

    #[test]
    fn test_config_from_inspector_config() {
        let config = InspectorConfig::builder()
            .endpoint("http://inspector.local")
            .timeout_ms(42)
            .build();
        let transport_config = HttpTransportConfig::from(&config);
        assert_eq!(transport_config.base_url, "http://inspector.local");
        assert_eq!(transport_config.timeout_ms, 42);
        assert!(transport_config.sample);
    }

    #[test]
    fn test_sampling_draw() {
        let full = batch_with_rate(1.0);
        assert!(passes_sampling(&full, 0.0));
        assert!(passes_sampling(&full, 0.999));

        let none = batch_with_rate(0.0);
        assert!(!passes_sampling(&none, 0.001));

        let tenth = batch_with_rate(0.1);
        assert!(passes_sampling(&tenth, 0.05));
        assert!(!passes_sampling(&tenth, 0.5));
    }

    #[test]
    fn test_parse_response_body() {
        assert_eq!(
            parse_response_body(r#"{"samplingRate":0.2}"#).sampling_rate,
            Some(0.2)
        );
        assert_eq!(parse_response_body(""), BatchResponse::delivered());
        assert_eq!(parse_response_body("ok"), BatchResponse::delivered());
    }
}

//! Delivery of envelope batches
//!
//! The dispatcher only talks to a [`Transport`]. [`HttpTransport`] posts to the
//! inspection endpoint; tests plug in their own implementations.

pub mod http;

pub use http::{HttpTransport, HttpTransportBuilder, HttpTransportConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::envelope::MessageEnvelope;
use crate::error::Result;

/// What the transport learned from one delivery attempt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    /// Sampling rate the endpoint wants future envelopes to carry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling_rate: Option<f64>,

    /// The batch lost the sampling draw and was never sent
    #[serde(skip)]
    pub dropped: bool,
}

impl BatchResponse {
    pub fn delivered() -> Self {
        Self::default()
    }

    pub fn with_sampling_rate(rate: f64) -> Self {
        Self {
            sampling_rate: Some(rate),
            dropped: false,
        }
    }

    pub fn dropped() -> Self {
        Self {
            sampling_rate: None,
            dropped: true,
        }
    }
}

/// Sends one batch of envelopes in a single delivery call
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_batch(&self, batch: &[MessageEnvelope]) -> Result<BatchResponse>;

    /// Name used in logs
    fn name(&self) -> &str {
        "transport"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_response_parsing() {
        let response: BatchResponse = serde_json::from_str(r#"{"samplingRate":0.1}"#).unwrap();
        assert_eq!(response.sampling_rate, Some(0.1));
        assert!(!response.dropped);

        let response: BatchResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response, BatchResponse::delivered());
    }

    #[test]
    fn test_batch_response_constructors() {
        assert!(BatchResponse::dropped().dropped);
        assert_eq!(
            BatchResponse::with_sampling_rate(0.5).sampling_rate,
            Some(0.5)
        );
    }
}

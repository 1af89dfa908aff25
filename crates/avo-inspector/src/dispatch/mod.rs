//! Batch dispatch
//!
//! Sends one batch per call through the [`Transport`] and absorbs every
//! failure. The [`DispatchOutcome`] only feeds logging, metrics and tests;
//! nothing in the tracking API turns it back into an error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::client::Transport;
use crate::envelope::MessageEnvelope;
use crate::metrics::InspectorMetrics;
use crate::session::SessionContext;

/// Prefix of every user facing log line
pub const LOG_PREFIX: &str = "Avo Inspector:";

/// Result of one dispatch call
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Transport accepted the batch
    Delivered {
        /// Rate instruction that was applied to the session, if any
        sampling_rate: Option<f64>,
    },
    /// Batch lost the sampling draw and was not sent
    Dropped,
    /// Transport failed; the batch is lost
    Failed { error: String },
    /// Nothing to send
    Empty,
}

impl DispatchOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, DispatchOutcome::Failed { .. })
    }

    /// Diagnostic line for a failed dispatch
    pub fn failure_line(&self) -> Option<String> {
        match self {
            DispatchOutcome::Failed { error } => {
                Some(format!("{} schema sending failed: {}.", LOG_PREFIX, error))
            }
            _ => None,
        }
    }
}

/// Sends batches and applies server sampling instructions
pub struct BatchDispatcher {
    transport: Arc<dyn Transport>,
    session: Arc<SessionContext>,
    metrics: Arc<InspectorMetrics>,
    verbose: Arc<AtomicBool>,
}

impl BatchDispatcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<SessionContext>,
        metrics: Arc<InspectorMetrics>,
        verbose: Arc<AtomicBool>,
    ) -> Self {
        Self {
            transport,
            session,
            metrics,
            verbose,
        }
    }

    fn should_log(&self) -> bool {
        self.verbose.load(Ordering::Relaxed)
    }

    /// Send `batch` in exactly one transport call. Never fails.
    pub async fn dispatch(&self, batch: Vec<MessageEnvelope>) -> DispatchOutcome {
        if batch.is_empty() {
            return DispatchOutcome::Empty;
        }

        let batch_size = batch.len();
        let outcome = match self.transport.send_batch(&batch).await {
            Ok(response) if response.dropped => {
                self.metrics.record_batch_dropped();
                DispatchOutcome::Dropped
            }
            Ok(response) => {
                self.metrics.record_batch_sent();
                let applied = match response.sampling_rate {
                    Some(rate) if self.apply_sampling_rate(rate) => Some(rate),
                    _ => None,
                };
                DispatchOutcome::Delivered {
                    sampling_rate: applied,
                }
            }
            Err(e) => {
                self.metrics.record_batch_failed();
                DispatchOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        self.report(&outcome, &batch, batch_size);
        outcome
    }

    fn apply_sampling_rate(&self, rate: f64) -> bool {
        match self.session.update_sampling_rate(rate) {
            Ok(()) => {
                self.metrics.set_sampling_rate(rate);
                true
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %self.session.session_id(),
                    error = %e,
                    "Ignoring sampling rate from inspector endpoint"
                );
                if self.should_log() {
                    tracing::warn!("{} rejected sampling rate {}.", LOG_PREFIX, rate);
                }
                false
            }
        }
    }

    fn report(&self, outcome: &DispatchOutcome, batch: &[MessageEnvelope], batch_size: usize) {
        let first_message = batch.first().map(|e| e.message_id);
        match outcome {
            DispatchOutcome::Delivered { sampling_rate } => {
                tracing::debug!(
                    transport = self.transport.name(),
                    batch_size,
                    message_id = ?first_message,
                    sampling_rate = ?sampling_rate,
                    "Delivered envelope batch"
                );
            }
            DispatchOutcome::Dropped => {
                tracing::debug!(batch_size, "Envelope batch dropped by sampling");
                if self.should_log() {
                    tracing::info!(
                        "{} batch dropped due to sampling rate {}.",
                        LOG_PREFIX,
                        self.session.sampling_rate()
                    );
                }
            }
            DispatchOutcome::Failed { error } => {
                tracing::debug!(
                    transport = self.transport.name(),
                    batch_size,
                    error = %error,
                    "Envelope batch delivery failed"
                );
                if self.should_log() {
                    if let Some(line) = outcome.failure_line() {
                        tracing::error!("{}", line);
                    }
                }
            }
            DispatchOutcome::Empty => {}
        }
    }
}

//! Prometheus metrics for the inspector agent
//!
//! - `avo_inspector_schemas_tracked_total` (counter) - tracking calls, by outcome
//! - `avo_inspector_batches_total` (counter) - dispatched batches, by outcome
//! - `avo_inspector_sampling_rate` (gauge) - sampling rate currently in effect
//!
//! Every agent instance owns its own registry.

use prometheus::{CounterVec, Gauge, Opts, Registry};
use std::sync::Arc;

use crate::error::{InspectorError, Result};

/// Counters and gauges for one agent instance
pub struct InspectorMetrics {
    registry: Arc<Registry>,

    /// Tracking calls by outcome (new, duplicate)
    schemas_tracked_total: CounterVec,

    /// Batches by outcome (sent, failed, dropped)
    batches_total: CounterVec,

    /// Current sampling rate
    sampling_rate: Gauge,
}

impl InspectorMetrics {
    /// Create metrics in a fresh registry
    pub fn new() -> Result<Self> {
        Self::with_registry(Arc::new(Registry::new()))
    }

    /// Register metrics with an existing Prometheus registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let schemas_tracked_total = CounterVec::new(
            Opts::new(
                "schemas_tracked_total",
                "Total number of event schema tracking calls",
            )
            .namespace("avo_inspector"),
            &["outcome"],
        )?;

        let batches_total = CounterVec::new(
            Opts::new("batches_total", "Total number of envelope batches dispatched")
                .namespace("avo_inspector"),
            &["outcome"],
        )?;

        let sampling_rate = Gauge::with_opts(
            Opts::new("sampling_rate", "Sampling rate currently in effect")
                .namespace("avo_inspector"),
        )?;
        sampling_rate.set(1.0);

        registry.register(Box::new(schemas_tracked_total.clone()))?;
        registry.register(Box::new(batches_total.clone()))?;
        registry.register(Box::new(sampling_rate.clone()))?;

        Ok(Self {
            registry,
            schemas_tracked_total,
            batches_total,
            sampling_rate,
        })
    }

    pub fn record_new_shape(&self) {
        self.schemas_tracked_total.with_label_values(&["new"]).inc();
    }

    pub fn record_duplicate_shape(&self) {
        self.schemas_tracked_total
            .with_label_values(&["duplicate"])
            .inc();
    }

    pub fn record_batch_sent(&self) {
        self.batches_total.with_label_values(&["sent"]).inc();
    }

    pub fn record_batch_failed(&self) {
        self.batches_total.with_label_values(&["failed"]).inc();
    }

    pub fn record_batch_dropped(&self) {
        self.batches_total.with_label_values(&["dropped"]).inc();
    }

    pub fn set_sampling_rate(&self, rate: f64) {
        self.sampling_rate.set(rate);
    }

    pub fn schemas_tracked(&self, outcome: &str) -> u64 {
        self.schemas_tracked_total
            .with_label_values(&[outcome])
            .get() as u64
    }

    pub fn batches(&self, outcome: &str) -> u64 {
        self.batches_total.with_label_values(&[outcome]).get() as u64
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate.get()
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    /// Encode metrics as text for scraping
    pub fn encode_text(&self) -> Result<String> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| InspectorError::Metrics(prometheus::Error::Msg(e.to_string())))
    }
}

impl std::fmt::Debug for InspectorMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InspectorMetrics")
            .field("new_shapes", &self.schemas_tracked("new"))
            .field("batches_sent", &self.batches("sent"))
            .field("sampling_rate", &self.sampling_rate())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = InspectorMetrics::new().unwrap();

        metrics.record_new_shape();
        metrics.record_duplicate_shape();
        metrics.record_duplicate_shape();
        metrics.record_batch_sent();
        metrics.record_batch_failed();
        metrics.record_batch_dropped();

        assert_eq!(metrics.schemas_tracked("new"), 1);
        assert_eq!(metrics.schemas_tracked("duplicate"), 2);
        assert_eq!(metrics.batches("sent"), 1);
        assert_eq!(metrics.batches("failed"), 1);
        assert_eq!(metrics.batches("dropped"), 1);
    }

    #[test]
    fn test_sampling_gauge() {
        let metrics = InspectorMetrics::new().unwrap();
        assert_eq!(metrics.sampling_rate(), 1.0);
        metrics.set_sampling_rate(0.25);
        assert_eq!(metrics.sampling_rate(), 0.25);
    }

    #[test]
    fn test_encode_text() {
        let metrics = InspectorMetrics::new().unwrap();
        metrics.record_batch_sent();

        let text = metrics.encode_text().unwrap();
        assert!(text.contains("avo_inspector_batches_total"));
        assert!(text.contains("avo_inspector_sampling_rate"));
    }

    #[test]
    fn test_instances_do_not_share_registries() {
        let a = InspectorMetrics::new().unwrap();
        let b = InspectorMetrics::new().unwrap();
        a.record_new_shape();
        assert_eq!(a.schemas_tracked("new"), 1);
        assert_eq!(b.schemas_tracked("new"), 0);
    }
}

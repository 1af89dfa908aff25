//! The tracking agent
//!
//! [`AvoInspector`] owns one session, one deduplication set and one
//! dispatcher. Tracking calls never fail: they return the extracted schema
//! whatever happens on the network.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

use crate::client::{HttpTransport, HttpTransportConfig, Transport};
use crate::config::InspectorConfig;
use crate::dedup::Deduplicator;
use crate::dispatch::{BatchDispatcher, DispatchOutcome, LOG_PREFIX};
use crate::envelope::MessageAssembler;
use crate::error::Result;
use crate::metrics::InspectorMetrics;
use crate::schema::{EventProperty, JsonShapeExtractor, ShapeExtractor, ShapeSignature};
use crate::session::SessionContext;

/// Event schema tracking agent
pub struct AvoInspector {
    config: InspectorConfig,
    session: Arc<SessionContext>,
    dedup: Deduplicator,
    assembler: MessageAssembler,
    dispatcher: BatchDispatcher,
    extractor: Arc<dyn ShapeExtractor>,
    metrics: Arc<InspectorMetrics>,
    verbose: Arc<AtomicBool>,
    // Held across the sessionStarted dispatch
    session_start: AsyncMutex<()>,
}

impl AvoInspector {
    /// Create an agent that reports over HTTP to `config.endpoint`
    pub fn new(config: InspectorConfig) -> Result<Self> {
        let transport = HttpTransport::with_config(HttpTransportConfig::from(&config))?;
        Self::with_components(config, Arc::new(transport), Arc::new(JsonShapeExtractor::new()))
    }

    /// Create an agent with a custom transport and shape extractor
    pub fn with_components(
        config: InspectorConfig,
        transport: Arc<dyn Transport>,
        extractor: Arc<dyn ShapeExtractor>,
    ) -> Result<Self> {
        config.validate()?;

        let session = Arc::new(SessionContext::new(
            config.tracking_id.clone(),
            config.initial_sampling_rate,
        ));
        let metrics = Arc::new(InspectorMetrics::new()?);
        metrics.set_sampling_rate(session.sampling_rate());
        let verbose = Arc::new(AtomicBool::new(config.verbose_logging()));
        let dispatcher = BatchDispatcher::new(
            transport,
            Arc::clone(&session),
            Arc::clone(&metrics),
            Arc::clone(&verbose),
        );

        tracing::debug!(
            session_id = %session.session_id(),
            env = %config.env,
            app_name = %config.app_name,
            "Avo inspector initialized"
        );

        Ok(Self {
            assembler: MessageAssembler::new(&config),
            config,
            session,
            dedup: Deduplicator::new(),
            dispatcher,
            extractor,
            metrics,
            verbose,
            session_start: AsyncMutex::new(()),
        })
    }

    /// Track an event by name and properties; returns its schema
    pub async fn track_schema_from_event(
        &self,
        event_name: &str,
        properties: &serde_json::Value,
    ) -> Vec<EventProperty> {
        let shape = self.extractor.extract(event_name, properties);
        if self.admit(event_name, &shape.signature) {
            self.send_shape(event_name, &shape.signature, shape.schema.clone(), false)
                .await;
        }
        shape.schema
    }

    /// Track an event whose id and hash are already known to the caller,
    /// as generated tracking code does
    pub async fn track_schema_with_ids(
        &self,
        event_name: &str,
        properties: &serde_json::Value,
        event_id: &str,
        event_hash: &str,
    ) -> Vec<EventProperty> {
        let schema = self.extractor.extract_schema(properties);
        let signature = ShapeSignature::new(event_id, event_hash);
        if self.admit(event_name, &signature) {
            self.send_shape(event_name, &signature, schema.clone(), true)
                .await;
        }
        schema
    }

    /// Track a schema that was extracted elsewhere
    pub async fn track_schema(&self, event_name: &str, schema: Vec<EventProperty>) {
        let signature = self.extractor.signature(event_name, &schema);
        if self.admit(event_name, &signature) {
            self.send_shape(event_name, &signature, schema, false).await;
        }
    }

    /// Like [`track_schema_from_event`](Self::track_schema_from_event) without
    /// awaiting delivery.
    ///
    /// The novelty check runs before this returns; only the network work is
    /// spawned. Returns `None` when the shape was already reported.
    pub fn spawn_track_schema_from_event(
        self: &Arc<Self>,
        event_name: &str,
        properties: &serde_json::Value,
    ) -> Option<JoinHandle<()>> {
        let shape = self.extractor.extract(event_name, properties);
        if !self.admit(event_name, &shape.signature) {
            return None;
        }

        let this = Arc::clone(self);
        let event_name = event_name.to_string();
        Some(tokio::spawn(async move {
            this.send_shape(&event_name, &shape.signature, shape.schema, false)
                .await;
        }))
    }

    /// Schema of a property set, without tracking it
    pub fn extract_schema(&self, properties: &serde_json::Value) -> Vec<EventProperty> {
        self.extractor.extract_schema(properties)
    }

    /// Turn verbose `Avo Inspector:` log lines on or off
    pub fn enable_logging(&self, enabled: bool) {
        self.verbose.store(enabled, Ordering::Relaxed);
    }

    pub fn should_log(&self) -> bool {
        self.verbose.load(Ordering::Relaxed)
    }

    /// Set the sampling rate for envelopes built from now on.
    ///
    /// Out-of-range values are logged and ignored; returns whether the rate
    /// was applied.
    pub fn set_sampling_rate(&self, rate: f64) -> bool {
        match self.session.update_sampling_rate(rate) {
            Ok(()) => {
                self.metrics.set_sampling_rate(rate);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Rejected sampling rate");
                if self.should_log() {
                    tracing::warn!("{} rejected sampling rate {}.", LOG_PREFIX, rate);
                }
                false
            }
        }
    }

    /// Forget every reported shape so each can be reported again. The next
    /// new shape is preceded by a fresh sessionStarted envelope.
    pub fn reset_seen_shapes(&self) {
        self.dedup.reset();
        self.session.rearm_session_start();
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn metrics(&self) -> &InspectorMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    /// Record the signature and decide whether it needs reporting
    fn admit(&self, event_name: &str, signature: &ShapeSignature) -> bool {
        if !self.dedup.is_new_shape(signature) {
            self.metrics.record_duplicate_shape();
            if self.should_log() {
                tracing::debug!(
                    "{} event schema \"{}\" already reported, skipping.",
                    LOG_PREFIX,
                    event_name
                );
            }
            return false;
        }

        self.metrics.record_new_shape();
        if self.should_log() {
            tracing::info!(
                "{} saw new event schema \"{}\", sending.",
                LOG_PREFIX,
                event_name
            );
        }
        true
    }

    /// Session start if still pending, then the event envelope
    async fn send_shape(
        &self,
        event_name: &str,
        signature: &ShapeSignature,
        schema: Vec<EventProperty>,
        avo_function: bool,
    ) {
        self.ensure_session_started().await;

        // Built after the session start so it carries any rate it returned
        let event = self.assembler.build_event(
            &self.session,
            event_name,
            signature,
            schema,
            avo_function,
        );
        let outcome = self.dispatcher.dispatch(vec![event]).await;

        tracing::trace!(
            session_id = %self.session.session_id(),
            event_id = %signature.event_id,
            outcome = ?outcome,
            "Event schema handled"
        );
    }

    /// Callers queue here until the sessionStarted dispatch completes. A
    /// failed dispatch leaves the start pending for the next new shape.
    async fn ensure_session_started(&self) {
        if self.session.session_start_sent() {
            return;
        }

        let _guard = self.session_start.lock().await;
        if self.session.session_start_sent() {
            return;
        }

        let started = self.assembler.build_session_started(&self.session);
        match self.dispatcher.dispatch(vec![started]).await {
            DispatchOutcome::Failed { .. } => {
                tracing::debug!(
                    session_id = %self.session.session_id(),
                    "Session start not delivered, retrying with the next new shape"
                );
            }
            _ => self.session.mark_session_started(),
        }
    }
}

impl std::fmt::Debug for AvoInspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvoInspector")
            .field("session_id", &self.session.session_id())
            .field("env", &self.config.env)
            .field("seen_shapes", &self.dedup.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InspectorEnv;
    use crate::error::InspectorError;

    #[test]
    fn test_new_rejects_missing_api_key() {
        let config = InspectorConfig::builder().app_version("1.0.0").build();
        assert!(matches!(
            AvoInspector::new(config),
            Err(InspectorError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_logging_defaults_follow_env() {
        let dev = AvoInspector::new(
            InspectorConfig::builder()
                .api_key("k")
                .app_version("1")
                .env(InspectorEnv::Dev)
                .build(),
        )
        .unwrap();
        assert!(dev.should_log());

        let prod = AvoInspector::new(
            InspectorConfig::builder()
                .api_key("k")
                .app_version("1")
                .env(InspectorEnv::Prod)
                .build(),
        )
        .unwrap();
        assert!(!prod.should_log());
        prod.enable_logging(true);
        assert!(prod.should_log());
    }

    #[test]
    fn test_set_sampling_rate() {
        let inspector = AvoInspector::new(
            InspectorConfig::builder().api_key("k").app_version("1").build(),
        )
        .unwrap();

        assert!(inspector.set_sampling_rate(0.5));
        assert_eq!(inspector.session().sampling_rate(), 0.5);
        assert!(!inspector.set_sampling_rate(2.0));
        assert_eq!(inspector.session().sampling_rate(), 0.5);
        assert_eq!(inspector.metrics().sampling_rate(), 0.5);
    }

    #[test]
    fn test_extract_schema_does_not_track() {
        let inspector = AvoInspector::new(
            InspectorConfig::builder().api_key("k").app_version("1").build(),
        )
        .unwrap();

        let schema = inspector.extract_schema(&serde_json::json!({"a": 1}));
        assert_eq!(schema, vec![EventProperty::new("a", "int")]);
        assert_eq!(inspector.metrics().schemas_tracked("new"), 0);
    }
}

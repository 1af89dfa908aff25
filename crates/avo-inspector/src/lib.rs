//! Avo Inspector Agent
//!
//! Client side event schema tracking. The agent looks at the *shape* of the
//! events an application sends (property names and inferred types, never the
//! values), reports each new shape once per session and ships it to the Avo
//! Inspector endpoint with session metadata and a sampling rate.
//!
//! ## Architecture
//!
//! 1. **Schema** (`schema/`): shape extraction and signatures.
//! 2. **Dedup** (`dedup`): at-most-once reporting per signature.
//! 3. **Session** (`session`): session identity and sampling rate.
//! 4. **Envelope** (`envelope`): wire messages (`sessionStarted`, `event`).
//! 5. **Dispatch** (`dispatch/`): one transport call per batch, failures
//!    logged and absorbed.
//! 6. **Client** (`client/`): the transport seam and the HTTP transport.
//! 7. **Metrics** (`metrics`): Prometheus counters per instance.
//!
//! ## Example
//!
//! ```rust,no_run
//! use avo_inspector::{AvoInspector, InspectorConfig, InspectorEnv};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = InspectorConfig::builder()
//!         .api_key("my-api-key")
//!         .env(InspectorEnv::Dev)
//!         .app_name("web-shop")
//!         .app_version("1.4.0")
//!         .build();
//!     let inspector = AvoInspector::new(config).unwrap();
//!
//!     let schema = inspector
//!         .track_schema_from_event(
//!             "Checkout Completed",
//!             &serde_json::json!({"total": 12.5, "items": 3}),
//!         )
//!         .await;
//!     println!("{} properties", schema.len());
//! }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod dedup;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod inspector;
pub mod metrics;
pub mod schema;
pub mod session;

pub use client::{BatchResponse, HttpTransport, HttpTransportBuilder, Transport};
pub use config::{InspectorConfig, InspectorConfigBuilder, InspectorEnv};
pub use dedup::Deduplicator;
pub use dispatch::{BatchDispatcher, DispatchOutcome};
pub use envelope::{EnvelopeType, EventPayload, MessageAssembler, MessageEnvelope};
pub use error::{InspectorError, Result};
pub use inspector::AvoInspector;
pub use metrics::InspectorMetrics;
pub use schema::{
    EventProperty, ExtractedShape, JsonShapeExtractor, ShapeExtractor, ShapeSignature,
};
pub use session::{SessionContext, SessionSnapshot};

/// Library version (from Cargo.toml)
pub const LIB_VERSION: &str = envelope::LIB_VERSION;

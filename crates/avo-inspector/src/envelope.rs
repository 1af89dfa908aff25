//! Message envelopes sent to the inspection endpoint
//!
//! An envelope is built once and never modified. Its `createdAt`, `messageId`
//! and `samplingRate` are fixed at construction, not at dispatch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{InspectorConfig, InspectorEnv};
use crate::schema::{EventProperty, ShapeSignature};
use crate::session::SessionContext;

/// Library version reported in every envelope
pub const LIB_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runtime family reported in every envelope
pub const LIB_PLATFORM: &str = "rust";

/// Kind of envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnvelopeType {
    SessionStarted,
    Event,
}

/// Event specific fields of an "event" envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub event_name: String,
    pub event_properties: Vec<EventProperty>,
    /// Reported by generated tracking code rather than a manual call
    pub avo_function: bool,
    pub event_id: String,
    pub event_hash: String,
}

/// One message for the inspection endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEnvelope {
    #[serde(rename = "type")]
    pub kind: EnvelopeType,
    pub api_key: String,
    pub app_name: String,
    pub app_version: String,
    pub lib_version: String,
    pub env: InspectorEnv,
    pub lib_platform: String,
    pub message_id: Uuid,
    pub tracking_id: String,
    pub created_at: DateTime<Utc>,
    pub session_id: Uuid,
    pub sampling_rate: f64,
    #[serde(flatten)]
    pub event: Option<EventPayload>,
}

impl MessageEnvelope {
    pub fn is_session_started(&self) -> bool {
        self.kind == EnvelopeType::SessionStarted
    }

    pub fn event_name(&self) -> Option<&str> {
        self.event.as_ref().map(|e| e.event_name.as_str())
    }
}

/// Builds envelopes with the instance's fixed metadata
#[derive(Debug, Clone)]
pub struct MessageAssembler {
    api_key: String,
    app_name: String,
    app_version: String,
    env: InspectorEnv,
}

impl MessageAssembler {
    pub fn new(config: &InspectorConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            app_name: config.app_name.clone(),
            app_version: config.app_version.clone(),
            env: config.env,
        }
    }

    /// Session start envelope, carrying the sampling rate current right now
    pub fn build_session_started(&self, session: &SessionContext) -> MessageEnvelope {
        self.envelope(EnvelopeType::SessionStarted, session, None)
    }

    /// Event envelope for a newly seen shape
    pub fn build_event(
        &self,
        session: &SessionContext,
        event_name: &str,
        signature: &ShapeSignature,
        schema: Vec<EventProperty>,
        avo_function: bool,
    ) -> MessageEnvelope {
        let payload = EventPayload {
            event_name: event_name.to_string(),
            event_properties: schema,
            avo_function,
            event_id: signature.event_id.clone(),
            event_hash: signature.event_hash.clone(),
        };
        self.envelope(EnvelopeType::Event, session, Some(payload))
    }

    fn envelope(
        &self,
        kind: EnvelopeType,
        session: &SessionContext,
        event: Option<EventPayload>,
    ) -> MessageEnvelope {
        let snapshot = session.snapshot();
        MessageEnvelope {
            kind,
            api_key: self.api_key.clone(),
            app_name: self.app_name.clone(),
            app_version: self.app_version.clone(),
            lib_version: LIB_VERSION.to_string(),
            env: self.env,
            lib_platform: LIB_PLATFORM.to_string(),
            message_id: Uuid::new_v4(),
            tracking_id: snapshot.tracking_id,
            created_at: Utc::now(),
            session_id: snapshot.session_id,
            sampling_rate: snapshot.sampling_rate,
            event,
        }
    }
}

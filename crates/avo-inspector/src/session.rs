//! Session and sampling context
//!
//! One context per agent instance. Identity fields are captured at
//! construction; only the sampling rate changes afterwards.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use uuid::Uuid;

use crate::config::is_valid_sampling_rate;
use crate::error::{InspectorError, Result};

/// Session identity plus the mutable sampling rate
#[derive(Debug)]
pub struct SessionContext {
    session_id: Uuid,
    created_at: DateTime<Utc>,
    tracking_id: String,
    sampling_rate: RwLock<f64>,
    started_sent: AtomicBool,
}

/// Values read from the context when an envelope is built
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub tracking_id: String,
    pub sampling_rate: f64,
}

impl SessionContext {
    /// Start a new session. Out-of-range initial rates fall back to 1.0.
    pub fn new(tracking_id: impl Into<String>, initial_sampling_rate: f64) -> Self {
        let rate = if is_valid_sampling_rate(initial_sampling_rate) {
            initial_sampling_rate
        } else {
            1.0
        };

        Self {
            session_id: Uuid::new_v4(),
            created_at: Utc::now(),
            tracking_id: tracking_id.into(),
            sampling_rate: RwLock::new(rate),
            started_sent: AtomicBool::new(false),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn tracking_id(&self) -> &str {
        &self.tracking_id
    }

    pub fn sampling_rate(&self) -> f64 {
        *self.sampling_rate.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the sampling rate; rejects values outside [0, 1] and leaves
    /// the current rate untouched
    pub fn update_sampling_rate(&self, rate: f64) -> Result<()> {
        if !is_valid_sampling_rate(rate) {
            return Err(InspectorError::InvalidSamplingRate(rate));
        }
        *self.sampling_rate.write().unwrap_or_else(|e| e.into_inner()) = rate;
        Ok(())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            created_at: self.created_at,
            tracking_id: self.tracking_id.clone(),
            sampling_rate: self.sampling_rate(),
        }
    }

    /// Whether a sessionStarted envelope has been delivered or dropped by
    /// sampling since the last re-arm
    pub fn session_start_sent(&self) -> bool {
        self.started_sent.load(Ordering::Acquire)
    }

    pub fn mark_session_started(&self) {
        self.started_sent.store(true, Ordering::Release);
    }

    /// Require a new sessionStarted before the next event envelope
    pub fn rearm_session_start(&self) {
        self.started_sent.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_defaults() {
        let session = SessionContext::new("", 1.0);
        assert_eq!(session.tracking_id(), "");
        assert_eq!(session.sampling_rate(), 1.0);
        assert!(!session.session_start_sent());
        assert!(session.created_at() <= Utc::now());
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        let a = SessionContext::new("", 1.0);
        let b = SessionContext::new("", 1.0);
        assert_ne!(a.session_id(), b.session_id());
    }

    #[test]
    fn test_invalid_initial_rate_falls_back() {
        let session = SessionContext::new("t", 7.0);
        assert_eq!(session.sampling_rate(), 1.0);
    }

    #[test]
    fn test_update_sampling_rate() {
        let session = SessionContext::new("", 1.0);
        session.update_sampling_rate(0.25).unwrap();
        assert_eq!(session.sampling_rate(), 0.25);

        assert!(matches!(
            session.update_sampling_rate(1.5),
            Err(InspectorError::InvalidSamplingRate(_))
        ));
        assert!(session.update_sampling_rate(-0.1).is_err());
        assert!(session.update_sampling_rate(f64::NAN).is_err());
        assert_eq!(session.sampling_rate(), 0.25);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let session = SessionContext::new("tracker", 1.0);
        let snapshot = session.snapshot();
        session.update_sampling_rate(0.1).unwrap();

        assert_eq!(snapshot.sampling_rate, 1.0);
        assert_eq!(snapshot.tracking_id, "tracker");
        assert_eq!(snapshot.session_id, session.session_id());
        assert_eq!(session.snapshot().sampling_rate, 0.1);
    }

    #[test]
    fn test_session_start_mark_and_rearm() {
        let session = SessionContext::new("", 1.0);
        session.mark_session_started();
        assert!(session.session_start_sent());

        session.rearm_session_start();
        assert!(!session.session_start_sent());
        assert_eq!(session.snapshot().session_id, session.session_id());
    }
}

//! Inspector configuration
//!
//! Everything here is fixed for the lifetime of an agent instance, except the
//! sampling rate, which only seeds the session context.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{InspectorError, Result};

/// Default inspection endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.avo.app";

/// Deployment environment reported with every envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectorEnv {
    #[default]
    Dev,
    Staging,
    Prod,
}

impl InspectorEnv {
    pub fn as_str(&self) -> &'static str {
        match self {
            InspectorEnv::Dev => "dev",
            InspectorEnv::Staging => "staging",
            InspectorEnv::Prod => "prod",
        }
    }

    /// Parse leniently: unknown values fall back to `dev`
    pub fn parse_or_dev(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!(
                env = value,
                "Unsupported inspector environment, falling back to dev"
            );
            InspectorEnv::Dev
        })
    }
}

impl fmt::Display for InspectorEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InspectorEnv {
    type Err = InspectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(InspectorEnv::Dev),
            "staging" | "stage" => Ok(InspectorEnv::Staging),
            "prod" | "production" => Ok(InspectorEnv::Prod),
            other => Err(InspectorError::invalid_config(format!(
                "unknown environment '{}'",
                other
            ))),
        }
    }
}

/// Configuration for an inspector instance
#[derive(Debug, Clone)]
pub struct InspectorConfig {
    /// Inspector API key
    pub api_key: String,

    /// Deployment environment
    pub env: InspectorEnv,

    /// Name of the instrumented application
    pub app_name: String,

    /// Version of the instrumented application
    pub app_version: String,

    /// Optional external tracking identifier
    pub tracking_id: String,

    /// Sampling rate the session starts with
    pub initial_sampling_rate: f64,

    /// Verbose logging; `None` means "on in dev, off elsewhere"
    pub verbose: Option<bool>,

    /// Base URL of the inspection endpoint
    pub endpoint: String,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            env: InspectorEnv::Dev,
            app_name: String::new(),
            app_version: String::new(),
            tracking_id: String::new(),
            initial_sampling_rate: 1.0,
            verbose: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_ms: 5000,
        }
    }
}

impl InspectorConfig {
    /// Create a new config builder
    pub fn builder() -> InspectorConfigBuilder {
        InspectorConfigBuilder::new()
    }

    /// Create config from `AVO_INSPECTOR_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("AVO_INSPECTOR_API_KEY").unwrap_or_default(),
            env: std::env::var("AVO_INSPECTOR_ENV")
                .map(|v| InspectorEnv::parse_or_dev(&v))
                .unwrap_or_default(),
            app_name: std::env::var("AVO_INSPECTOR_APP_NAME").unwrap_or_default(),
            app_version: std::env::var("AVO_INSPECTOR_APP_VERSION").unwrap_or_default(),
            tracking_id: std::env::var("AVO_INSPECTOR_TRACKING_ID").unwrap_or_default(),
            initial_sampling_rate: std::env::var("AVO_INSPECTOR_SAMPLING_RATE")
                .map(|v| v.parse().unwrap_or(defaults.initial_sampling_rate))
                .unwrap_or(defaults.initial_sampling_rate),
            verbose: std::env::var("AVO_INSPECTOR_VERBOSE")
                .ok()
                .and_then(|v| v.parse().ok()),
            endpoint: std::env::var("AVO_INSPECTOR_ENDPOINT").unwrap_or(defaults.endpoint),
            timeout_ms: std::env::var("AVO_INSPECTOR_TIMEOUT_MS")
                .map(|v| v.parse().unwrap_or(defaults.timeout_ms))
                .unwrap_or(defaults.timeout_ms),
        }
    }

    /// Check the fields an instance cannot run without
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(InspectorError::invalid_config("no API key provided"));
        }
        if self.app_version.trim().is_empty() {
            return Err(InspectorError::invalid_config("no app version provided"));
        }
        if !is_valid_sampling_rate(self.initial_sampling_rate) {
            return Err(InspectorError::InvalidSamplingRate(
                self.initial_sampling_rate,
            ));
        }
        if self.endpoint.trim().is_empty() {
            return Err(InspectorError::invalid_config("empty endpoint"));
        }
        Ok(())
    }

    /// Effective verbose flag
    pub fn verbose_logging(&self) -> bool {
        self.verbose.unwrap_or(self.env == InspectorEnv::Dev)
    }
}

/// A sampling rate must be a number in [0, 1]
pub fn is_valid_sampling_rate(rate: f64) -> bool {
    (0.0..=1.0).contains(&rate)
}

/// Builder for InspectorConfig
pub struct InspectorConfigBuilder {
    config: InspectorConfig,
}

impl InspectorConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        Self {
            config: InspectorConfig::default(),
        }
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = api_key.into();
        self
    }

    pub fn env(mut self, env: InspectorEnv) -> Self {
        self.config.env = env;
        self
    }

    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.config.app_name = app_name.into();
        self
    }

    pub fn app_version(mut self, app_version: impl Into<String>) -> Self {
        self.config.app_version = app_version.into();
        self
    }

    pub fn tracking_id(mut self, tracking_id: impl Into<String>) -> Self {
        self.config.tracking_id = tracking_id.into();
        self
    }

    /// Set the sampling rate the session starts with
    pub fn sampling_rate(mut self, rate: f64) -> Self {
        self.config.initial_sampling_rate = rate;
        self
    }

    /// Force verbose logging on or off regardless of environment
    pub fn verbose(mut self, enabled: bool) -> Self {
        self.config.verbose = Some(enabled);
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn timeout_ms(mut self, timeout: u64) -> Self {
        self.config.timeout_ms = timeout;
        self
    }

    /// Build the configuration
    pub fn build(self) -> InspectorConfig {
        self.config
    }
}

impl Default for InspectorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

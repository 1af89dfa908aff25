//! CLI command definitions for the inspector agent

use clap::{Parser, Subcommand};

use crate::config::{InspectorConfig, InspectorEnv};
use crate::error::{InspectorError, Result};

/// Avo Inspector CLI
///
/// Inspect event schemas locally or report them to the inspection endpoint.
#[derive(Parser, Debug)]
#[command(name = "avo-inspector")]
#[command(about = "Avo Inspector - extract and report event schemas", long_about = None)]
#[command(version)]
pub struct InspectorCli {
    /// Output verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: InspectorCommands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum InspectorCommands {
    /// Print the schema extracted from a JSON property object
    Schema {
        /// Event properties as a JSON object
        #[arg(short, long)]
        properties: String,
    },

    /// Report one event schema and wait for delivery
    Track {
        /// Event name
        #[arg(short, long)]
        event: String,

        /// Event properties as a JSON object
        #[arg(short, long, default_value = "{}")]
        properties: String,

        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

/// Connection settings; unset flags fall back to `AVO_INSPECTOR_*` variables
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Inspector API key
    #[arg(long, env = "AVO_INSPECTOR_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Environment (dev, staging, prod)
    #[arg(long)]
    pub env: Option<String>,

    /// Application name
    #[arg(long)]
    pub app_name: Option<String>,

    /// Application version
    #[arg(long)]
    pub app_version: Option<String>,

    /// Inspection endpoint base URL
    #[arg(long)]
    pub endpoint: Option<String>,
}

impl ConnectionArgs {
    /// Overlay the flags on a base configuration
    pub fn apply(&self, mut config: InspectorConfig) -> InspectorConfig {
        if let Some(ref key) = self.api_key {
            config.api_key = key.clone();
        }
        if let Some(ref env) = self.env {
            config.env = InspectorEnv::parse_or_dev(env);
        }
        if let Some(ref name) = self.app_name {
            config.app_name = name.clone();
        }
        if let Some(ref version) = self.app_version {
            config.app_version = version.clone();
        }
        if let Some(ref endpoint) = self.endpoint {
            config.endpoint = endpoint.clone();
        }
        config
    }
}

/// Parse a `--properties` argument
pub fn parse_properties(raw: &str) -> Result<serde_json::Value> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        return Err(InspectorError::invalid_config(
            "event properties must be a JSON object",
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_schema_command() {
        let cli = InspectorCli::parse_from(["avo-inspector", "schema", "-p", "{\"a\":1}"]);
        assert!(matches!(cli.command, InspectorCommands::Schema { .. }));
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_track_command() {
        let cli = InspectorCli::parse_from([
            "avo-inspector",
            "-v",
            "track",
            "--event",
            "Signup",
            "--api-key",
            "key",
            "--env",
            "prod",
            "--app-version",
            "2.0.0",
        ]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            InspectorCommands::Track {
                event,
                properties,
                connection,
            } => {
                assert_eq!(event, "Signup");
                assert_eq!(properties, "{}");
                let config = connection.apply(InspectorConfig::default());
                assert_eq!(config.api_key, "key");
                assert_eq!(config.env, InspectorEnv::Prod);
                assert_eq!(config.app_version, "2.0.0");
            }
            _ => panic!("expected track command"),
        }
    }

    #[test]
    fn test_parse_properties() {
        assert!(parse_properties("{\"a\":true}").is_ok());
        assert!(matches!(
            parse_properties("[1]"),
            Err(InspectorError::InvalidConfig(_))
        ));
        assert!(matches!(
            parse_properties("{"),
            Err(InspectorError::Serialization(_))
        ));
    }
}

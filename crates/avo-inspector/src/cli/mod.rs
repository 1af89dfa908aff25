//! CLI module for the inspector agent

pub mod commands;

pub use commands::{ConnectionArgs, InspectorCli, InspectorCommands};

use crate::config::InspectorConfig;
use crate::error::InspectorError;
use crate::inspector::AvoInspector;
use crate::schema::{JsonShapeExtractor, ShapeExtractor};

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command completed
    Success = 0,
    /// Invalid input or configuration
    InvalidInput = 3,
    /// Internal error
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    pub fn from_error(err: &InspectorError) -> Self {
        match err {
            InspectorError::InvalidConfig(_)
            | InspectorError::InvalidSamplingRate(_)
            | InspectorError::Serialization(_) => ExitCode::InvalidInput,
            _ => ExitCode::InternalError,
        }
    }
}

/// Run the CLI. Delivery failures are logged, never reflected in the result.
pub async fn run(cli: InspectorCli) -> Result<ExitCode, InspectorError> {
    match cli.command {
        InspectorCommands::Schema { properties } => {
            let properties = commands::parse_properties(&properties)?;
            let schema = JsonShapeExtractor::new().extract_schema(&properties);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(ExitCode::Success)
        }
        InspectorCommands::Track {
            event,
            properties,
            connection,
        } => {
            let properties = commands::parse_properties(&properties)?;
            let config = connection.apply(InspectorConfig::from_env());
            let inspector = AvoInspector::new(config)?;
            if cli.verbose > 0 {
                inspector.enable_logging(true);
            }

            let schema = inspector.track_schema_from_event(&event, &properties).await;
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(ExitCode::Success)
        }
    }
}

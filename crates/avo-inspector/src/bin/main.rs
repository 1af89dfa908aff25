//! Avo Inspector CLI
//!
//! # Usage
//!
//! ```bash
//! # Print the schema of a property object
//! avo-inspector schema --properties '{"total": 12.5, "items": 3}'
//!
//! # Report one event schema
//! AVO_INSPECTOR_API_KEY=... avo-inspector -v track --event "Checkout" \
//!     --properties '{"total": 12.5}' --app-version 1.0.0
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success (also when delivery failed; failures are only logged)
//! - 3: Invalid input or configuration
//! - 10: Internal error

use anyhow::Context;
use avo_inspector::cli::{self, ExitCode, InspectorCli};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = InspectorCli::parse();

    let level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_target(false)
        .init();

    let exit_code = match cli::run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from_error(&e)
        }
    };

    std::io::Write::flush(&mut std::io::stdout()).context("failed to flush stdout")?;
    std::process::exit(exit_code.into());
}

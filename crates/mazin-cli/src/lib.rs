//! Command-line front ends for the mazin analyzer: `mazin` analyzes text,
//! `mazin-dict` builds and inspects dictionary files.

use std::io;
use std::sync::Once;

use mazin_core::analyzer::AnalyzeError;
use mazin_core::dict::DictError;
use mazin_core::settings::SettingsError;

/// Unwrap a result or print the error and exit with status 1.
#[macro_export]
macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            std::process::exit(1);
        })
    };
}

pub mod commands;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Analyze(#[from] AnalyzeError),

    #[error(transparent)]
    Dict(#[from] DictError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unrecognized file format: {0}")]
    UnknownFormat(String),
}

static INIT: Once = Once::new();

/// Install the stderr subscriber. The filter comes from `MAZIN_LOG`, then
/// `RUST_LOG`, and defaults to warnings from the analyzer.
pub fn init_tracing(json: bool) {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_env("MAZIN_LOG")
            .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mazin_core=warn"));

        let builder = tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_target(true)
            .with_env_filter(filter);
        if json {
            builder
                .json()
                .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
                .init();
        } else {
            builder.init();
        }
    });
}

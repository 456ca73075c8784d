//! Error types for the reporting pipeline.
//!
//! Most failure modes in the pipeline are recovered locally (missing
//! source files, sanitiser failures, unrecognised crash shapes) and
//! never surface here; this enum covers the few that do propagate.

use thiserror::Error;

/// Errors that can occur while building or serialising a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Configuration could not be loaded or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// The finished payload could not be serialised.
    #[error("serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}

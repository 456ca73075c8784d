//! Warning side-channel for the pipeline.
//!
//! The pipeline never aborts a report over a recoverable failure; it
//! reports such failures through this capability instead. Injecting it
//! keeps the core testable without a real logging backend.

/// Sink for warning-level diagnostics emitted by the pipeline.
pub trait ReportLogger: Send + Sync {
    /// Record a warning.
    fn warn(&self, message: &str);
}

/// Default logger, forwarding to the `tracing` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ReportLogger for TracingLogger {
    fn warn(&self, message: &str) {
        tracing::warn!(target: "bolide", "{message}");
    }
}

//! Exception normalisation and message sanitisation.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::logger::ReportLogger;

/// Message substituted when a configured sanitiser fails.
pub const CENSORED_MESSAGE: &str = "[CENSORED DUE TO SANITIZER EXCEPTION]";

/// Strips sensitive data from messages before they leave the process.
///
/// Applied to error messages and method names. A sanitiser that fails
/// never aborts reporting: the pipeline substitutes
/// [`CENSORED_MESSAGE`] and logs a warning instead.
pub trait MessageSanitizer: Send + Sync {
    /// Sanitise one message.
    fn sanitise(
        &self,
        message: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;
}

/// The canonical `{error_class, message}` pair every error
/// representation collapses into before reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalException {
    /// Exception class.
    pub error_class: String,
    /// Human-readable message, not yet sanitised.
    pub message: String,
}

impl CanonicalException {
    /// Build from an already-canonical class and message.
    #[must_use]
    pub fn new(error_class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_class: error_class.into(),
            message: message.into(),
        }
    }

    /// Normalise an arbitrary error value.
    ///
    /// The class is the caller-supplied override when present, else the
    /// error's own type identifier; the message is its `Display`
    /// rendering.
    #[must_use]
    pub fn from_error<E: std::error::Error>(error: &E, class_override: Option<&str>) -> Self {
        let error_class = class_override
            .map(str::to_owned)
            .unwrap_or_else(|| std::any::type_name::<E>().to_owned());
        Self {
            error_class,
            message: error.to_string(),
        }
    }
}

/// Apply the configured sanitiser to `message`.
///
/// Both an `Err` return and a panic are contained here; either way the
/// caller receives [`CENSORED_MESSAGE`] and a warning is logged. With
/// no sanitiser configured the message passes through unchanged.
pub(crate) fn apply_sanitizer(
    sanitizer: Option<&dyn MessageSanitizer>,
    logger: &dyn ReportLogger,
    message: &str,
) -> String {
    let Some(sanitizer) = sanitizer else {
        return message.to_owned();
    };

    match catch_unwind(AssertUnwindSafe(|| sanitizer.sanitise(message))) {
        Ok(Ok(clean)) => clean,
        Ok(Err(err)) => {
            logger.warn(&format!("message sanitiser failed: {err}"));
            CENSORED_MESSAGE.to_owned()
        }
        Err(_) => {
            logger.warn("message sanitiser panicked");
            CENSORED_MESSAGE.to_owned()
        }
    }
}

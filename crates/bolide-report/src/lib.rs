//! Error-to-payload transformation pipeline for the Bolide
//! error-reporting client.
//!
//! Given a raised error (or a supervisor crash record), a captured
//! stack and a set of reporting options, this crate builds the
//! structured payload an external transport delivers to the crash
//! aggregation service. Transport, retries and delivery guarantees are
//! out of scope; the pipeline ends at the serialised document.
//!
//! # Pipeline
//!
//! ```text
//! error + raw stack + options
//!   ├── exception normalisation (class, sanitised message)
//!   ├── stacktrace formatting (frame resolution, source snippets)
//!   ├── grouping fingerprint (SHA-1 over class + raw stack)
//!   └── event assembly → payload → JSON document
//! ```
//!
//! # Example
//!
//! ```
//! use bolide_report::{ClientConfig, RawFrame, RawLocation, Reporter, ReportOptions};
//!
//! let reporter = Reporter::new(ClientConfig::default());
//! let stack = vec![RawFrame::Mfa {
//!     module: "Checkout".into(),
//!     function: "confirm".into(),
//!     arity: 2,
//!     location: RawLocation::Source { file: "lib/checkout.ex".into(), line: 12 },
//! }];
//! let payload = reporter.report_message(
//!     "ChargeError",
//!     "card declined",
//!     &stack,
//!     ReportOptions::new().with_api_key("key-123"),
//! );
//! let document = payload.to_json().unwrap();
//! assert!(document.contains("\"errorClass\":\"ChargeError\""));
//! ```
//!
//! The pipeline is synchronous and allocates per call; the only shared
//! inputs are the read-only configuration and the filesystem reads for
//! source snippets, so concurrent reports need no locking.

pub mod config;
pub mod crashlog;
mod error;
pub mod exception;
pub mod fingerprint;
pub mod frames;
mod logger;
mod options;
pub mod project;
mod report;
mod stacktrace;

pub use config::{ClientConfig, DEFAULT_HOSTNAME, DEFAULT_RELEASE_STAGE};
pub use crashlog::{classify, parse_stacktrace, CrashRecord, CrashReport};
pub use error::ReportError;
pub use exception::{CanonicalException, MessageSanitizer, CENSORED_MESSAGE};
pub use fingerprint::grouping_hash;
pub use frames::{RawFrame, RawLocation, SNIPPET_LINES, UNKNOWN_FILE};
pub use logger::{ReportLogger, TracingLogger};
pub use options::ReportOptions;
pub use project::{FrameCallback, FrameCallbackWith, ProjectMatcher};
pub use report::{to_document, Reporter};

// Re-export the wire types so callers need only this crate.
pub use bolide_payload::{
    AppInfo, DeviceInfo, Event, ExceptionRecord, Notifier, Payload, Severity, StackFrame,
    PAYLOAD_VERSION,
};

//! Wire document types for the Bolide error-reporting client.
//!
//! This crate defines the JSON document shape accepted by the crash
//! aggregation service. Field names on the wire are camelCase and must
//! match the service exactly; every struct here carries the serde
//! renames needed to guarantee that, so the pipeline crate never has to
//! think about wire naming.
//!
//! # Document shape
//!
//! ```text
//! Payload
//! ├── apiKey
//! ├── notifier { name, version, url }
//! └── events []
//!     ├── payloadVersion ("2")
//!     ├── exceptions [] { errorClass, message, stacktrace [] }
//!     ├── groupingHash?
//!     ├── severity ("error" | "warning" | "info")
//!     ├── context? / user? / device? / metaData?
//!     ├── app { releaseStage, type?, version? }
//!     └── notifyReleaseStages []
//! ```

mod event;
mod payload;

pub use event::{AppInfo, DeviceInfo, Event, ExceptionRecord, Severity, StackFrame};
pub use payload::{Notifier, Payload, NOTIFIER_NAME, NOTIFIER_URL};

/// Protocol version of the event records produced by this client.
pub const PAYLOAD_VERSION: &str = "2";

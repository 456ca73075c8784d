//! Event records and their nested wire types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::PAYLOAD_VERSION;

/// Severity of a reported event.
///
/// The service accepts exactly three values; anything else a caller
/// hands us is coerced to [`Severity::Error`] via [`Severity::coerce`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// An unhandled or otherwise serious failure.
    #[default]
    Error,
    /// A handled failure worth recording.
    Warning,
    /// Informational report.
    Info,
}

impl Severity {
    /// Coerce a loosely-typed severity value into a valid one.
    ///
    /// `"error"`, `"warning"` and `"info"` map through unchanged; any
    /// other input (including `None`) becomes [`Severity::Error`].
    #[must_use]
    pub fn coerce(value: Option<&str>) -> Self {
        match value {
            Some("error") => Self::Error,
            Some("warning") => Self::Warning,
            Some("info") => Self::Info,
            _ => Self::Error,
        }
    }

    /// The wire representation of this severity.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalised stack frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    /// Source file path, or `"unknown"` when the frame has no location.
    pub file: String,

    /// 1-based line number, or 0 when unknown.
    #[serde(rename = "lineNumber")]
    pub line_number: u32,

    /// Whether the frame belongs to the application rather than a
    /// dependency or the runtime.
    #[serde(rename = "inProject")]
    pub in_project: bool,

    /// Qualified method name, e.g. `"Checkout.confirm/2"`.
    pub method: String,

    /// Surrounding source lines keyed by 1-based line number, present
    /// only when the source file could be read from disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<BTreeMap<String, String>>,
}

/// A canonical exception together with its formatted stacktrace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionRecord {
    /// Exception class, e.g. `"std::io::Error"`.
    #[serde(rename = "errorClass")]
    pub error_class: String,

    /// Sanitised, human-readable message.
    pub message: String,

    /// Normalised frames, innermost call first.
    pub stacktrace: Vec<StackFrame>,
}

/// Device details attached to an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Operating system version string.
    #[serde(rename = "osVersion", default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,

    /// Reporting host name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

impl DeviceInfo {
    /// True when no field is set, in which case the `device` key is
    /// omitted from the event entirely.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.os_version.is_none() && self.hostname.is_none()
    }
}

/// Application details attached to an event.
///
/// Release stage, type and version are written independently during
/// assembly but always merge into this one nested record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    /// Deployment environment label.
    #[serde(rename = "releaseStage")]
    pub release_stage: String,

    /// Application type, e.g. `"worker"`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub app_type: Option<String>,

    /// Application version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Default for AppInfo {
    fn default() -> Self {
        Self {
            release_stage: "production".to_owned(),
            app_type: None,
            version: None,
        }
    }
}

/// One reportable event: the exception, its grouping fingerprint and
/// all contextual fields.
///
/// Events are built fresh per report and never mutated after assembly.
/// Optional fields omit their wire keys when unset; severity, the app
/// record and the notify list are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Protocol version, always `"2"`.
    #[serde(rename = "payloadVersion")]
    pub payload_version: String,

    /// Exceptions carried by this event.
    pub exceptions: Vec<ExceptionRecord>,

    /// Fingerprint used by the service to cluster duplicate errors.
    #[serde(
        rename = "groupingHash",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub grouping_hash: Option<String>,

    /// Event severity.
    pub severity: Severity,

    /// What the application was doing, e.g. a request path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Details of the affected user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Map<String, Value>>,

    /// Device details; omitted when entirely empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceInfo>,

    /// Arbitrary diagnostic data.
    #[serde(rename = "metaData", default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,

    /// Application details.
    pub app: AppInfo,

    /// Release stages for which the caller wants delivery.
    #[serde(rename = "notifyReleaseStages")]
    pub notify_release_stages: Vec<String>,
}

impl Event {
    /// Create an event with the given exceptions and default values
    /// for everything else.
    #[must_use]
    pub fn new(exceptions: Vec<ExceptionRecord>) -> Self {
        Self {
            payload_version: PAYLOAD_VERSION.to_owned(),
            exceptions,
            grouping_hash: None,
            severity: Severity::default(),
            context: None,
            user: None,
            device: None,
            metadata: None,
            app: AppInfo::default(),
            notify_release_stages: vec!["production".to_owned()],
        }
    }
}

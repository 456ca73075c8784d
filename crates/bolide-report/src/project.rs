//! The in-project matcher.
//!
//! Callers supply one rule distinguishing application frames from
//! dependency and runtime frames. The rule is a closed union resolved
//! by exhaustive dispatch; unresolvable forms evaluate to `false`
//! rather than failing the report.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::frames::RawFrame;

/// Predicate over a raw frame and its resolved file path.
pub type FrameCallback = Arc<dyn Fn(&RawFrame, &str) -> bool + Send + Sync>;

/// Predicate invoked with the frame prepended to caller-supplied
/// extra arguments.
pub type FrameCallbackWith = Arc<dyn Fn(&RawFrame, &[String]) -> bool + Send + Sync>;

/// Rule deciding whether a frame belongs to the application.
#[derive(Clone, Default)]
pub enum ProjectMatcher {
    /// A callable taking the frame and its file path.
    Callback(FrameCallback),
    /// A callable invoked with the frame prepended to extra arguments.
    CallbackWith {
        /// The callable.
        callback: FrameCallbackWith,
        /// Extra arguments passed after the frame.
        args: Vec<String>,
    },
    /// A regular expression matched against the file path.
    Pattern(Regex),
    /// A substring tested against the file path.
    Substring(String),
    /// No rule configured; every frame is out of project.
    #[default]
    Unset,
}

impl ProjectMatcher {
    /// Build a callback matcher.
    pub fn callback(f: impl Fn(&RawFrame, &str) -> bool + Send + Sync + 'static) -> Self {
        Self::Callback(Arc::new(f))
    }

    /// Build a callback matcher carrying extra arguments.
    pub fn callback_with(
        f: impl Fn(&RawFrame, &[String]) -> bool + Send + Sync + 'static,
        args: Vec<String>,
    ) -> Self {
        Self::CallbackWith {
            callback: Arc::new(f),
            args,
        }
    }

    /// Build a regex matcher from a pattern string.
    ///
    /// An invalid pattern yields [`ProjectMatcher::Unset`], degrading
    /// to "out of project" instead of failing the report.
    #[must_use]
    pub fn pattern(pattern: &str) -> Self {
        Regex::new(pattern).map_or(Self::Unset, Self::Pattern)
    }

    /// Build a substring matcher.
    #[must_use]
    pub fn substring(needle: impl Into<String>) -> Self {
        Self::Substring(needle.into())
    }

    /// Evaluate this rule for one frame.
    #[must_use]
    pub fn matches(&self, frame: &RawFrame, file: &str) -> bool {
        match self {
            Self::Callback(callback) => callback(frame, file),
            Self::CallbackWith { callback, args } => callback(frame, args),
            Self::Pattern(pattern) => pattern.is_match(file),
            Self::Substring(needle) => file.contains(needle.as_str()),
            Self::Unset => false,
        }
    }
}

impl fmt::Debug for ProjectMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("ProjectMatcher::Callback"),
            Self::CallbackWith { args, .. } => f
                .debug_struct("ProjectMatcher::CallbackWith")
                .field("args", args)
                .finish_non_exhaustive(),
            Self::Pattern(pattern) => f
                .debug_tuple("ProjectMatcher::Pattern")
                .field(&pattern.as_str())
                .finish(),
            Self::Substring(needle) => f
                .debug_tuple("ProjectMatcher::Substring")
                .field(needle)
                .finish(),
            Self::Unset => f.write_str("ProjectMatcher::Unset"),
        }
    }
}

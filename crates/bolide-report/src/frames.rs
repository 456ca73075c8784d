//! Raw stack entries and their resolution into normalised frames.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use bolide_payload::StackFrame;

use crate::exception::{apply_sanitizer, MessageSanitizer};
use crate::logger::ReportLogger;
use crate::project::ProjectMatcher;

/// Maximum number of source lines attached to a frame.
pub const SNIPPET_LINES: usize = 7;

/// File name used for frames without a source location.
pub const UNKNOWN_FILE: &str = "unknown";

/// Source location attached to a raw stack entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RawLocation {
    /// The capture facility recorded no location.
    #[default]
    Unknown,
    /// An error-info annotation carrying no usable file or line. Emitted
    /// for certain synthetic dispatch errors.
    Annotated,
    /// A concrete file and 1-based line number.
    Source {
        /// Source file path.
        file: String,
        /// 1-based line number.
        line: u32,
    },
}

impl RawLocation {
    /// The concrete (file, line) pair, if this location has one.
    #[must_use]
    pub fn source(&self) -> Option<(&str, u32)> {
        match self {
            Self::Source { file, line } => Some((file.as_str(), *line)),
            Self::Unknown | Self::Annotated => None,
        }
    }
}

/// One raw stack entry as produced by a runtime's capture facility.
///
/// The four shapes carry their positional fields directly and are
/// handled by exhaustive pattern dispatch throughout the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawFrame {
    /// Module, function and arity.
    Mfa {
        /// Module name.
        module: String,
        /// Function name.
        function: String,
        /// Number of arguments.
        arity: u32,
        /// Source location.
        location: RawLocation,
    },
    /// Module, function and the rendered call arguments.
    MfArgs {
        /// Module name.
        module: String,
        /// Function name.
        function: String,
        /// Rendered argument values.
        args: Vec<String>,
        /// Source location.
        location: RawLocation,
    },
    /// A bare function with arity (anonymous or local functions).
    FnArity {
        /// Function name.
        function: String,
        /// Number of arguments.
        arity: u32,
        /// Source location.
        location: RawLocation,
    },
    /// A bare function with rendered call arguments.
    FnArgs {
        /// Function name.
        function: String,
        /// Rendered argument values.
        args: Vec<String>,
        /// Source location.
        location: RawLocation,
    },
}

impl RawFrame {
    /// The entry's source location.
    #[must_use]
    pub fn location(&self) -> &RawLocation {
        match self {
            Self::Mfa { location, .. }
            | Self::MfArgs { location, .. }
            | Self::FnArity { location, .. }
            | Self::FnArgs { location, .. } => location,
        }
    }

    /// Format the `"module.function/arity"` qualified name of this
    /// entry. Argument lists are rendered to their length first.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match self {
            Self::Mfa {
                module,
                function,
                arity,
                ..
            } => format!("{module}.{function}/{arity}"),
            Self::MfArgs {
                module,
                function,
                args,
                ..
            } => format!("{module}.{function}/{}", args.len()),
            Self::FnArity {
                function, arity, ..
            } => format!("{function}/{arity}"),
            Self::FnArgs { function, args, .. } => format!("{function}/{}", args.len()),
        }
    }
}

/// Shared inputs for resolving one report's frames.
pub(crate) struct FrameContext<'a> {
    /// Distinguishes application frames from dependency frames.
    pub matcher: &'a ProjectMatcher,
    /// Directory source paths are resolved against.
    pub root: &'a Path,
    /// Optional message sanitiser, also applied to method names.
    pub sanitizer: Option<&'a dyn MessageSanitizer>,
    /// Warning sink.
    pub logger: &'a dyn ReportLogger,
}

impl FrameContext<'_> {
    pub(crate) fn sanitise(&self, message: &str) -> String {
        apply_sanitizer(self.sanitizer, self.logger, message)
    }
}

/// Resolve one raw entry into a normalised frame.
///
/// A missing location yields `file = "unknown"`, line 0 and no snippet;
/// it is never an error.
pub(crate) fn resolve_frame(raw: &RawFrame, ctx: &FrameContext<'_>) -> StackFrame {
    match raw.location().source() {
        Some((file, line)) => StackFrame {
            file: file.to_owned(),
            line_number: line,
            in_project: ctx.matcher.matches(raw, file),
            method: ctx.sanitise(&raw.qualified_name()),
            code: source_snippet(ctx.root, file, line),
        },
        None => StackFrame {
            file: UNKNOWN_FILE.to_owned(),
            line_number: 0,
            in_project: ctx.matcher.matches(raw, UNKNOWN_FILE),
            method: ctx.sanitise(&raw.qualified_name()),
            code: None,
        },
    }
}

/// Read the source lines surrounding `line` from `file`, resolved
/// against `root`.
///
/// Returns up to [`SNIPPET_LINES`] consecutive 1-indexed lines starting
/// at `max(line - 4, 1)`, so the target sits a few lines into the
/// window except near the start of the file. A file that cannot be
/// read yields `None`, silently.
fn source_snippet(root: &Path, file: &str, line: u32) -> Option<BTreeMap<String, String>> {
    let contents = fs::read_to_string(root.join(file)).ok()?;
    let start = (line as usize).saturating_sub(4).max(1);

    let mut code = BTreeMap::new();
    for (idx, text) in contents.lines().enumerate() {
        let number = idx + 1;
        if number < start {
            continue;
        }
        if number >= start + SNIPPET_LINES {
            break;
        }
        code.insert(number.to_string(), text.to_owned());
    }
    Some(code)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::test_support::NullLogger;

    fn ctx<'a>(matcher: &'a ProjectMatcher, root: &'a Path) -> FrameContext<'a> {
        FrameContext {
            matcher,
            root,
            sanitizer: None,
            logger: &NullLogger,
        }
    }

    fn write_numbered_file(dir: &Path, name: &str, lines: usize) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        for n in 1..=lines {
            writeln!(file, "line {n}").unwrap();
        }
    }

    #[test]
    fn qualified_names() {
        let location = RawLocation::Unknown;
        let mfa = RawFrame::Mfa {
            module: "Checkout".into(),
            function: "confirm".into(),
            arity: 2,
            location: location.clone(),
        };
        assert_eq!(mfa.qualified_name(), "Checkout.confirm/2");

        let mf_args = RawFrame::MfArgs {
            module: "Checkout".into(),
            function: "confirm".into(),
            args: vec!["cart".into(), "user".into(), "opts".into()],
            location: location.clone(),
        };
        assert_eq!(mf_args.qualified_name(), "Checkout.confirm/3");

        let fn_arity = RawFrame::FnArity {
            function: "-confirm/2-fun-0-".into(),
            arity: 1,
            location: location.clone(),
        };
        assert_eq!(fn_arity.qualified_name(), "-confirm/2-fun-0-/1");

        let fn_args = RawFrame::FnArgs {
            function: "handler".into(),
            args: vec![],
            location,
        };
        assert_eq!(fn_args.qualified_name(), "handler/0");
    }

    #[test]
    fn snippet_window_centred_before_target() {
        let dir = tempfile::tempdir().unwrap();
        write_numbered_file(dir.path(), "app.rs", 20);

        let matcher = ProjectMatcher::Unset;
        let frame = RawFrame::Mfa {
            module: "App".into(),
            function: "run".into(),
            arity: 0,
            location: RawLocation::Source {
                file: "app.rs".into(),
                line: 10,
            },
        };
        let resolved = resolve_frame(&frame, &ctx(&matcher, dir.path()));
        let code = resolved.code.unwrap();

        let keys: Vec<&str> = code.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["10", "11", "12", "6", "7", "8", "9"]);
        assert_eq!(code["6"], "line 6");
        assert_eq!(code["12"], "line 12");
        assert!(!code.contains_key("5"));
        assert!(!code.contains_key("13"));
    }

    #[test]
    fn snippet_window_clamped_at_file_start() {
        let dir = tempfile::tempdir().unwrap();
        write_numbered_file(dir.path(), "app.rs", 20);

        let matcher = ProjectMatcher::Unset;
        let frame = RawFrame::Mfa {
            module: "App".into(),
            function: "run".into(),
            arity: 0,
            location: RawLocation::Source {
                file: "app.rs".into(),
                line: 2,
            },
        };
        let resolved = resolve_frame(&frame, &ctx(&matcher, dir.path()));
        let code = resolved.code.unwrap();

        assert_eq!(code.len(), 7);
        assert!(code.contains_key("1"));
        assert!(code.contains_key("7"));
        assert!(!code.contains_key("8"));
    }

    #[test]
    fn missing_source_file_omits_code() {
        let dir = tempfile::tempdir().unwrap();
        let matcher = ProjectMatcher::Unset;
        let frame = RawFrame::Mfa {
            module: "App".into(),
            function: "run".into(),
            arity: 0,
            location: RawLocation::Source {
                file: "nope.rs".into(),
                line: 3,
            },
        };
        let resolved = resolve_frame(&frame, &ctx(&matcher, dir.path()));
        assert_eq!(resolved.file, "nope.rs");
        assert_eq!(resolved.line_number, 3);
        assert!(resolved.code.is_none());
    }

    #[test]
    fn missing_location_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let matcher = ProjectMatcher::Unset;
        let frame = RawFrame::FnArity {
            function: "handler".into(),
            arity: 1,
            location: RawLocation::Unknown,
        };
        let resolved = resolve_frame(&frame, &ctx(&matcher, dir.path()));
        assert_eq!(resolved.file, UNKNOWN_FILE);
        assert_eq!(resolved.line_number, 0);
        assert!(!resolved.in_project);
        assert!(resolved.code.is_none());
    }

    #[test]
    fn in_project_flag_from_matcher() {
        let dir = tempfile::tempdir().unwrap();
        let matcher = ProjectMatcher::substring("app/");
        let frame = RawFrame::Mfa {
            module: "App".into(),
            function: "run".into(),
            arity: 0,
            location: RawLocation::Source {
                file: "app/run.rs".into(),
                line: 1,
            },
        };
        let resolved = resolve_frame(&frame, &ctx(&matcher, dir.path()));
        assert!(resolved.in_project);
    }
}

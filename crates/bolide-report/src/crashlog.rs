//! Classification of supervisor and worker crash records.
//!
//! This module feeds the reporting pipeline from process-supervisor
//! crash logs. A small closed set of record shapes is recognised; each
//! carries its companion fields and the crash reason as
//! loosely-structured JSON terms. The reason is classified as either a
//! real exception with a valid stack trace or a plain exit reason with
//! no usable trace, using an explicit structural validator rather than
//! raise/catch control flow. Unrecognised records yield no report.

use serde_json::{Map, Value};

use crate::exception::CanonicalException;
use crate::frames::{RawFrame, RawLocation};

/// One crash record as captured from the process log pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum CrashRecord {
    /// A generic server terminated.
    GenServer {
        /// Registered name or pid.
        name: Value,
        /// Last message the server received.
        last_message: Value,
        /// Server state at termination.
        state: Value,
        /// Termination reason.
        reason: Value,
    },
    /// An event handler terminated.
    EventHandler {
        /// Handler identifier.
        handler: Value,
        /// Manager the handler was installed in.
        manager: Value,
        /// Last event the handler received.
        last_message: Value,
        /// Handler state at termination.
        state: Value,
        /// Termination reason.
        reason: Value,
    },
    /// A task terminated.
    Task {
        /// Task name or pid.
        name: Value,
        /// Process that started the task.
        starter: Value,
        /// Function the task was running.
        function: Value,
        /// Arguments the task was started with.
        args: Value,
        /// Termination reason.
        reason: Value,
    },
    /// A state machine terminated.
    StateMachine {
        /// Registered name or pid.
        name: Value,
        /// Machine state at termination.
        state: Value,
        /// Termination reason.
        reason: Value,
    },
    /// A state machine report that merely declares its callback mode.
    /// Recognised so it can be ignored deliberately.
    StateMachineCallbackMode {
        /// Registered name or pid.
        name: Value,
        /// The declared callback mode.
        callback_mode: Value,
    },
    /// An uncaught error in a plain process.
    Process {
        /// The crashed process.
        pid: Value,
        /// Termination reason.
        reason: Value,
    },
    /// Anything else; yields no report.
    Other {
        /// The unrecognised format string.
        format: String,
    },
}

/// The classified output fed to the event assembler.
#[derive(Debug, Clone, PartialEq)]
pub struct CrashReport {
    /// Canonical exception derived from the crash reason.
    pub exception: CanonicalException,
    /// Parsed stack, empty when the reason carried no valid trace.
    pub stacktrace: Vec<RawFrame>,
    /// Inspected companion fields of the record.
    pub metadata: Map<String, Value>,
}

/// Classify one crash record.
///
/// Returns `None` for unrecognised shapes and for state-machine
/// callback-mode declarations; neither is an error.
#[must_use]
pub fn classify(record: &CrashRecord) -> Option<CrashReport> {
    match record {
        CrashRecord::GenServer {
            name,
            last_message,
            state,
            reason,
        } => {
            let mut metadata = Map::new();
            insert_inspected(&mut metadata, "name", name);
            insert_inspected(&mut metadata, "last_message", last_message);
            insert_inspected(&mut metadata, "state", state);
            Some(build_report("GenServer terminating", reason, metadata))
        }
        CrashRecord::EventHandler {
            handler,
            manager,
            last_message,
            state,
            reason,
        } => {
            let mut metadata = Map::new();
            insert_inspected(&mut metadata, "handler", handler);
            insert_inspected(&mut metadata, "manager", manager);
            insert_inspected(&mut metadata, "last_message", last_message);
            insert_inspected(&mut metadata, "state", state);
            Some(build_report(
                "gen_event handler terminating",
                reason,
                metadata,
            ))
        }
        CrashRecord::Task {
            name,
            starter,
            function,
            args,
            reason,
        } => {
            let mut metadata = Map::new();
            insert_inspected(&mut metadata, "name", name);
            insert_inspected(&mut metadata, "starter", starter);
            insert_inspected(&mut metadata, "function", function);
            insert_inspected(&mut metadata, "args", args);
            Some(build_report("Task terminating", reason, metadata))
        }
        CrashRecord::StateMachine {
            name,
            state,
            reason,
        } => {
            let mut metadata = Map::new();
            insert_inspected(&mut metadata, "name", name);
            insert_inspected(&mut metadata, "state", state);
            Some(build_report("State machine terminating", reason, metadata))
        }
        CrashRecord::StateMachineCallbackMode { .. } | CrashRecord::Other { .. } => None,
        CrashRecord::Process { pid, reason } => {
            let mut metadata = Map::new();
            insert_inspected(&mut metadata, "pid", pid);
            Some(build_report("Error in process", reason, metadata))
        }
    }
}

/// Validate and parse a candidate stack trace term.
///
/// A well-formed trace is an array of entries, each a 3- or 4-element
/// array: `[module, function, arity_or_args, location]` or
/// `[function, arity_or_args, location]`. Any malformed entry makes
/// the whole term invalid.
#[must_use]
pub fn parse_stacktrace(value: &Value) -> Option<Vec<RawFrame>> {
    value.as_array()?.iter().map(parse_frame).collect()
}

fn build_report(context: &str, reason: &Value, metadata: Map<String, Value>) -> CrashReport {
    match split_exception(reason) {
        Some((error, stacktrace)) => {
            let (error_class, message) = match typed_exception(error) {
                Some((class, message)) => (format!("{context} ({class})"), message),
                // A wrapped raw term keeps the plain context label.
                None => (context.to_owned(), inspect(error)),
            };
            CrashReport {
                exception: CanonicalException::new(error_class, message),
                stacktrace,
                metadata,
            }
        }
        None => CrashReport {
            exception: CanonicalException::new(
                context,
                format!("exited with: {}", inspect(reason)),
            ),
            stacktrace: Vec::new(),
            metadata,
        },
    }
}

/// Split a reason into its error term and validated trace, when it has
/// the `[error, trace]` shape.
fn split_exception(reason: &Value) -> Option<(&Value, Vec<RawFrame>)> {
    match reason.as_array()?.as_slice() {
        [error, trace] => Some((error, parse_stacktrace(trace)?)),
        _ => None,
    }
}

/// Extract `{class, message}` from a typed exception term.
fn typed_exception(error: &Value) -> Option<(String, String)> {
    let map = error.as_object()?;
    let class = map.get("class")?.as_str()?.to_owned();
    let message = map.get("message").map(inspect).unwrap_or_default();
    Some((class, message))
}

fn parse_frame(value: &Value) -> Option<RawFrame> {
    match value.as_array()?.as_slice() {
        [module, function, arity_or_args, location] => {
            let module = module.as_str()?.to_owned();
            let function = function.as_str()?.to_owned();
            let location = parse_location(location)?;
            match arity_or_args {
                Value::Number(arity) => Some(RawFrame::Mfa {
                    module,
                    function,
                    arity: u32::try_from(arity.as_u64()?).ok()?,
                    location,
                }),
                Value::Array(args) => Some(RawFrame::MfArgs {
                    module,
                    function,
                    args: args.iter().map(inspect).collect(),
                    location,
                }),
                _ => None,
            }
        }
        [function, arity_or_args, location] => {
            let function = function.as_str()?.to_owned();
            let location = parse_location(location)?;
            match arity_or_args {
                Value::Number(arity) => Some(RawFrame::FnArity {
                    function,
                    arity: u32::try_from(arity.as_u64()?).ok()?,
                    location,
                }),
                Value::Array(args) => Some(RawFrame::FnArgs {
                    function,
                    args: args.iter().map(inspect).collect(),
                    location,
                }),
                _ => None,
            }
        }
        _ => None,
    }
}

fn parse_location(value: &Value) -> Option<RawLocation> {
    match value {
        Value::Array(items) if items.is_empty() => Some(RawLocation::Unknown),
        Value::Object(map) => {
            let file = map.get("file").and_then(Value::as_str);
            let line = map.get("line").and_then(Value::as_u64);
            match (file, line) {
                (Some(file), Some(line)) => Some(RawLocation::Source {
                    file: file.to_owned(),
                    line: u32::try_from(line).ok()?,
                }),
                _ if map.contains_key("error_info") => Some(RawLocation::Annotated),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Render a term for human consumption: bare strings as-is, everything
/// else as compact JSON.
pub(crate) fn inspect(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn insert_inspected(metadata: &mut Map<String, Value>, key: &str, value: &Value) {
    metadata.insert(key.to_owned(), Value::String(inspect(value)));
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn exception_reason() -> Value {
        json!([
            {"class": "ArgumentError", "message": "argument error"},
            [
                ["Checkout", "confirm", 2, {"file": "lib/checkout.ex", "line": 12}],
                ["Checkout", "handle_call", 3, []]
            ]
        ])
    }

    #[test]
    fn gen_server_with_exception_reason() {
        let record = CrashRecord::GenServer {
            name: json!("Checkout.Server"),
            last_message: json!({"confirm": "cart-9"}),
            state: json!({"items": 3}),
            reason: exception_reason(),
        };
        let report = classify(&record).unwrap();

        assert_eq!(
            report.exception.error_class,
            "GenServer terminating (ArgumentError)"
        );
        assert_eq!(report.exception.message, "argument error");
        assert_eq!(report.stacktrace.len(), 2);
        assert_eq!(
            report.stacktrace[0],
            RawFrame::Mfa {
                module: "Checkout".into(),
                function: "confirm".into(),
                arity: 2,
                location: RawLocation::Source {
                    file: "lib/checkout.ex".into(),
                    line: 12,
                },
            }
        );
        assert_eq!(report.metadata["name"], "Checkout.Server");
        assert_eq!(report.metadata["state"], "{\"items\":3}");
        assert!(report.metadata.contains_key("last_message"));
    }

    #[test]
    fn gen_server_with_exit_reason() {
        let record = CrashRecord::GenServer {
            name: json!("Checkout.Server"),
            last_message: json!("stop"),
            state: json!(null),
            reason: json!("shutdown"),
        };
        let report = classify(&record).unwrap();

        assert_eq!(report.exception.error_class, "GenServer terminating");
        assert_eq!(report.exception.message, "exited with: shutdown");
        assert!(report.stacktrace.is_empty());
    }

    #[test]
    fn malformed_trace_falls_back_to_exit_path() {
        let record = CrashRecord::GenServer {
            name: json!("Checkout.Server"),
            last_message: json!("stop"),
            state: json!(null),
            reason: json!([{"class": "ArgumentError"}, "not a trace"]),
        };
        let report = classify(&record).unwrap();

        assert_eq!(report.exception.error_class, "GenServer terminating");
        assert!(report.stacktrace.is_empty());
        assert!(report.exception.message.starts_with("exited with: "));
    }

    #[test]
    fn wrapped_raw_term_keeps_plain_label() {
        let record = CrashRecord::Task {
            name: json!("importer"),
            starter: json!("<0.81.0>"),
            function: json!("&Importer.run/1"),
            args: json!(["batch-7"]),
            reason: json!(["badarith", [["erlang", "/", 2, []]]]),
        };
        let report = classify(&record).unwrap();

        assert_eq!(report.exception.error_class, "Task terminating");
        assert_eq!(report.exception.message, "badarith");
        assert_eq!(report.stacktrace.len(), 1);
        assert_eq!(report.metadata["starter"], "<0.81.0>");
        assert_eq!(report.metadata["args"], "[\"batch-7\"]");
    }

    #[test]
    fn callback_mode_declaration_is_ignored() {
        let record = CrashRecord::StateMachineCallbackMode {
            name: json!("Door"),
            callback_mode: json!("state_functions"),
        };
        assert!(classify(&record).is_none());
    }

    #[test]
    fn unrecognised_format_yields_no_report() {
        let record = CrashRecord::Other {
            format: "some exotic report".to_owned(),
        };
        assert!(classify(&record).is_none());
    }

    #[test]
    fn state_machine_report() {
        let record = CrashRecord::StateMachine {
            name: json!("Door"),
            state: json!("locked"),
            reason: exception_reason(),
        };
        let report = classify(&record).unwrap();
        assert_eq!(
            report.exception.error_class,
            "State machine terminating (ArgumentError)"
        );
        assert_eq!(report.metadata["state"], "locked");
    }

    #[test]
    fn process_error_report() {
        let record = CrashRecord::Process {
            pid: json!("<0.250.0>"),
            reason: exception_reason(),
        };
        let report = classify(&record).unwrap();
        assert_eq!(
            report.exception.error_class,
            "Error in process (ArgumentError)"
        );
        assert_eq!(report.metadata["pid"], "<0.250.0>");
    }

    #[test]
    fn validator_accepts_all_frame_shapes() {
        let trace = json!([
            ["Checkout", "confirm", 2, {"file": "lib/checkout.ex", "line": 12}],
            ["Checkout", "apply", ["cart", "user"], []],
            ["-anonymous-", 1, {"file": "lib/anon.ex", "line": 4}],
            ["-anonymous-", ["event"], []]
        ]);
        let frames = parse_stacktrace(&trace).unwrap();
        assert_eq!(frames.len(), 4);
        assert!(matches!(frames[1], RawFrame::MfArgs { .. }));
        assert!(matches!(frames[2], RawFrame::FnArity { .. }));
        assert!(matches!(frames[3], RawFrame::FnArgs { .. }));
    }

    #[test]
    fn validator_rejects_malformed_entries() {
        assert!(parse_stacktrace(&json!("not an array")).is_none());
        assert!(parse_stacktrace(&json!([["only", "two"]])).is_none());
        assert!(parse_stacktrace(&json!([[1, 2, 3, 4]])).is_none());
        assert!(parse_stacktrace(&json!([["M", "f", "neither", []]])).is_none());
        assert!(parse_stacktrace(&json!([["M", "f", 1, "bad location"]])).is_none());
    }

    #[test]
    fn error_info_location_is_annotated() {
        let trace = json!([["M", "f", 1, {"error_info": {"module": "error_handler"}}]]);
        let frames = parse_stacktrace(&trace).unwrap();
        assert_eq!(*frames[0].location(), RawLocation::Annotated);
    }
}

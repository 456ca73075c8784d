//! The reporting entry point and event assembly.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use bolide_payload::{DeviceInfo, Event, ExceptionRecord, Payload};

use crate::config::ClientConfig;
use crate::crashlog::{classify, CrashRecord};
use crate::exception::{CanonicalException, MessageSanitizer};
use crate::fingerprint::grouping_hash;
use crate::frames::{FrameContext, RawFrame};
use crate::logger::{ReportLogger, TracingLogger};
use crate::options::{resolve, ReportOptions, ResolvedOptions};
use crate::stacktrace::format_stacktrace;

/// Builds payloads from errors, stacks and crash records.
///
/// A reporter owns the read-only process-wide configuration and is set
/// up once at startup. Every call allocates its own payload graph, so
/// concurrent reports are safe by construction.
pub struct Reporter {
    config: ClientConfig,
    sanitizer: Option<Arc<dyn MessageSanitizer>>,
    logger: Arc<dyn ReportLogger>,
}

impl Reporter {
    /// Create a reporter with the given configuration, no sanitiser
    /// and the default `tracing`-backed logger.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            sanitizer: None,
            logger: Arc::new(TracingLogger),
        }
    }

    /// Install a message sanitiser.
    #[must_use]
    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn MessageSanitizer>) -> Self {
        self.sanitizer = Some(sanitizer);
        self
    }

    /// Replace the warning sink.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn ReportLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// The process-wide configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a payload from an arbitrary runtime error.
    ///
    /// The error class is the `error_class` option when set, else the
    /// error's type identifier; the message is its `Display`
    /// rendering, sanitised.
    #[must_use]
    pub fn report_error<E: std::error::Error>(
        &self,
        error: &E,
        stack: &[RawFrame],
        options: ReportOptions,
    ) -> Payload {
        let opts = resolve(&self.config, options);
        let exception = CanonicalException::from_error(error, opts.error_class.as_deref());
        self.build(exception, stack, &opts)
    }

    /// Build a payload from an already-canonical class and message.
    #[must_use]
    pub fn report_message(
        &self,
        error_class: &str,
        message: &str,
        stack: &[RawFrame],
        options: ReportOptions,
    ) -> Payload {
        let opts = resolve(&self.config, options);
        self.build(CanonicalException::new(error_class, message), stack, &opts)
    }

    /// Classify a crash record and build its payload.
    ///
    /// Unrecognised records yield `None`, silently. Any panic while
    /// processing the record is caught here, logged as a warning and
    /// the report dropped; this path sits inside the process's log
    /// pipeline and must never crash it.
    #[must_use]
    pub fn process_crash_record(
        &self,
        record: &CrashRecord,
        options: ReportOptions,
    ) -> Option<Payload> {
        match catch_unwind(AssertUnwindSafe(|| self.crash_payload(record, options))) {
            Ok(payload) => payload,
            Err(_) => {
                self.logger
                    .warn("crash record processing panicked, report dropped");
                None
            }
        }
    }

    /// Whether the resolved release stage is one the caller wants
    /// delivered. Transports consult this before sending.
    #[must_use]
    pub fn should_notify(&self, options: &ReportOptions) -> bool {
        let stage = options
            .release_stage
            .as_deref()
            .unwrap_or(&self.config.release_stage);
        options
            .notify_release_stages
            .as_deref()
            .unwrap_or(&self.config.notify_release_stages)
            .iter()
            .any(|s| s == stage)
    }

    fn crash_payload(&self, record: &CrashRecord, mut options: ReportOptions) -> Option<Payload> {
        let report = classify(record)?;

        // Companion fields land in the event metadata; explicit option
        // keys keep precedence.
        let mut metadata = options.metadata.take().unwrap_or_default();
        for (key, value) in report.metadata {
            metadata.entry(key).or_insert(value);
        }
        options.metadata = Some(metadata);

        let opts = resolve(&self.config, options);
        Some(self.build(report.exception, &report.stacktrace, &opts))
    }

    fn build(
        &self,
        exception: CanonicalException,
        stack: &[RawFrame],
        opts: &ResolvedOptions,
    ) -> Payload {
        if opts.api_key.is_empty() {
            self.logger.warn("no API key configured for report");
        }

        let ctx = FrameContext {
            matcher: &opts.matcher,
            root: &opts.root,
            sanitizer: self.sanitizer.as_deref(),
            logger: self.logger.as_ref(),
        };

        let record = ExceptionRecord {
            error_class: exception.error_class.clone(),
            message: ctx.sanitise(&exception.message),
            stacktrace: format_stacktrace(stack, &ctx),
        };
        let event = assemble_event(record, &exception.error_class, stack, opts);
        Payload::new(opts.api_key.clone(), event)
    }
}

/// Fold the exception and every contextual field into one event.
///
/// Fields are applied in a fixed order; optional ones omit their keys
/// when unset. The grouping hash is set-if-absent so a caller-supplied
/// hash is never clobbered by the computed one. The three app writers
/// (release stage, type, version) merge into the one nested record.
fn assemble_event(
    record: ExceptionRecord,
    error_class: &str,
    raw_stack: &[RawFrame],
    opts: &ResolvedOptions,
) -> Event {
    let mut event = Event::new(vec![record]);

    event.grouping_hash = opts.grouping_hash.clone();
    if event.grouping_hash.is_none() {
        event.grouping_hash = grouping_hash(error_class, raw_stack);
    }

    event.severity = opts.severity;
    event.context = opts.context.clone();
    event.user = opts.user.clone();

    let device = DeviceInfo {
        os_version: opts.os_version.clone(),
        hostname: opts.hostname.clone(),
    };
    if !device.is_empty() {
        event.device = Some(device);
    }

    event.metadata = opts.metadata.clone();
    event.app.release_stage = opts.release_stage.clone();
    event.notify_release_stages = opts.notify_release_stages.clone();
    event.app.app_type = opts.app_type.clone();
    event.app.version = opts.app_version.clone();
    event
}

/// Serialise a payload, wrapping the error for callers that work in
/// terms of [`ReportError`](crate::ReportError).
pub fn to_document(payload: &Payload) -> Result<String, crate::ReportError> {
    Ok(payload.to_json()?)
}

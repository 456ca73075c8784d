//! Per-call reporting options.

use std::path::PathBuf;

use bolide_payload::Severity;
use serde_json::{Map, Value};

use crate::config::ClientConfig;
use crate::project::ProjectMatcher;

/// Options for a single report call.
///
/// Unset fields fall back to the process-wide [`ClientConfig`];
/// explicit keys always win. Built with chained `with_*` calls.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// API key override.
    pub api_key: Option<String>,
    /// Event severity.
    pub severity: Option<Severity>,
    /// What the application was doing.
    pub context: Option<String>,
    /// Details of the affected user.
    pub user: Option<Map<String, Value>>,
    /// Operating system version override.
    pub os_version: Option<String>,
    /// Hostname override.
    pub hostname: Option<String>,
    /// Arbitrary diagnostic data.
    pub metadata: Option<Map<String, Value>>,
    /// Release stage override.
    pub release_stage: Option<String>,
    /// Notify-release-stages override.
    pub notify_release_stages: Option<Vec<String>>,
    /// Application type override.
    pub app_type: Option<String>,
    /// Application version override.
    pub app_version: Option<String>,
    /// Error class override for normalised runtime errors.
    pub error_class: Option<String>,
    /// Caller-supplied grouping hash; the computed one never
    /// overwrites it.
    pub grouping_hash: Option<String>,
    /// In-project rule for this report.
    pub in_project: ProjectMatcher,
    /// Directory source paths are resolved against; defaults to the
    /// current working directory.
    pub project_root: Option<PathBuf>,
}

impl ReportOptions {
    /// Create empty options; every field falls back to configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key for this report.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the severity.
    #[must_use]
    pub const fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Set the severity from a loosely-typed name; unknown names
    /// coerce to `"error"`.
    #[must_use]
    pub fn with_severity_name(mut self, name: &str) -> Self {
        self.severity = Some(Severity::coerce(Some(name)));
        self
    }

    /// Set the context string.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Set the affected user.
    #[must_use]
    pub fn with_user(mut self, user: Map<String, Value>) -> Self {
        self.user = Some(user);
        self
    }

    /// Set diagnostic metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set the release stage.
    #[must_use]
    pub fn with_release_stage(mut self, stage: impl Into<String>) -> Self {
        self.release_stage = Some(stage.into());
        self
    }

    /// Set the notify-release-stages list.
    #[must_use]
    pub fn with_notify_release_stages(mut self, stages: Vec<String>) -> Self {
        self.notify_release_stages = Some(stages);
        self
    }

    /// Override the error class.
    #[must_use]
    pub fn with_error_class(mut self, class: impl Into<String>) -> Self {
        self.error_class = Some(class.into());
        self
    }

    /// Supply a custom grouping hash.
    #[must_use]
    pub fn with_grouping_hash(mut self, hash: impl Into<String>) -> Self {
        self.grouping_hash = Some(hash.into());
        self
    }

    /// Set the in-project rule.
    #[must_use]
    pub fn with_in_project(mut self, matcher: ProjectMatcher) -> Self {
        self.in_project = matcher;
        self
    }

    /// Set the directory source paths are resolved against.
    #[must_use]
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }
}

/// Options after merging a call's [`ReportOptions`] over the
/// process-wide [`ClientConfig`].
#[derive(Debug, Clone)]
pub(crate) struct ResolvedOptions {
    pub api_key: String,
    pub severity: Severity,
    pub context: Option<String>,
    pub user: Option<Map<String, Value>>,
    pub os_version: Option<String>,
    pub hostname: Option<String>,
    pub metadata: Option<Map<String, Value>>,
    pub release_stage: String,
    pub notify_release_stages: Vec<String>,
    pub app_type: Option<String>,
    pub app_version: Option<String>,
    pub error_class: Option<String>,
    pub grouping_hash: Option<String>,
    pub matcher: ProjectMatcher,
    pub root: PathBuf,
}

pub(crate) fn resolve(config: &ClientConfig, options: ReportOptions) -> ResolvedOptions {
    ResolvedOptions {
        api_key: options
            .api_key
            .or_else(|| config.api_key.clone())
            .unwrap_or_default(),
        severity: options.severity.unwrap_or_default(),
        context: options.context,
        user: options.user,
        os_version: options.os_version.or_else(|| config.os_version.clone()),
        hostname: Some(options.hostname.unwrap_or_else(|| config.hostname.clone())),
        metadata: options.metadata,
        release_stage: options
            .release_stage
            .unwrap_or_else(|| config.release_stage.clone()),
        notify_release_stages: options
            .notify_release_stages
            .unwrap_or_else(|| config.notify_release_stages.clone()),
        app_type: options.app_type.or_else(|| config.app_type.clone()),
        app_version: options.app_version.or_else(|| config.app_version.clone()),
        error_class: options.error_class,
        grouping_hash: options.grouping_hash,
        matcher: options.in_project,
        root: options
            .project_root
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from(".")),
    }
}

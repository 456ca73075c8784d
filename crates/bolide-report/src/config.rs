//! Process-wide client configuration.
//!
//! Configuration is loaded once at startup and read-only thereafter.
//! Per-call [`ReportOptions`](crate::ReportOptions) are merged over
//! these defaults, with explicit option keys always winning.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

use crate::ReportError;

/// Default release stage attached to every report.
pub const DEFAULT_RELEASE_STAGE: &str = "production";

/// Default hostname when none is configured.
pub const DEFAULT_HOSTNAME: &str = "unknown";

/// Process-wide defaults for the reporting pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API key identifying the receiving project.
    pub api_key: Option<String>,

    /// Reporting host name (default: `"unknown"`).
    pub hostname: String,

    /// Operating system version string.
    pub os_version: Option<String>,

    /// Deployment environment label (default: `"production"`).
    pub release_stage: String,

    /// Release stages for which delivery is wanted
    /// (default: `["production"]`).
    pub notify_release_stages: Vec<String>,

    /// Application type, e.g. `"web"` or `"worker"`.
    pub app_type: Option<String>,

    /// Application version.
    pub app_version: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            hostname: DEFAULT_HOSTNAME.to_owned(),
            os_version: None,
            release_stage: DEFAULT_RELEASE_STAGE.to_owned(),
            notify_release_stages: vec![DEFAULT_RELEASE_STAGE.to_owned()],
            app_type: None,
            app_version: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from files and environment.
    ///
    /// Configuration is loaded in order (later sources override earlier):
    /// 1. Default values
    /// 2. `bolide.toml` in the current directory
    /// 3. Environment variables prefixed with `BOLIDE_`
    pub fn load() -> Result<Self, ReportError> {
        Self::load_from("bolide.toml")
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &str) -> Result<Self, ReportError> {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("BOLIDE_"))
            .extract()
            .map_err(|e| ReportError::Config(e.to_string()))
    }
}

//! Layout service configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api/admin";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// How layouts are addressed on the layout service.
///
/// Both schemes use the `plot-units` collection; they differ in whether the
/// layout is the resource itself or a `layout` sub-resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutKeying {
    /// `{base}/plot-units/{property_id}`, elements inline with the property.
    #[default]
    Property,
    /// `{base}/plot-units/{project_id}/layout`.
    Project,
}

impl LayoutKeying {
    /// Path of the layout resource for `id`, relative to the base URL.
    #[must_use]
    pub fn layout_path(self, id: &str) -> String {
        match self {
            Self::Property => format!("/plot-units/{id}"),
            Self::Project => format!("/plot-units/{id}/layout"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl BridgeTimeouts {
    #[must_use]
    pub fn request(self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for BridgeTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Base URL of the admin API, without a trailing slash.
    pub base_url: String,
    pub keying: LayoutKeying,
    pub timeouts: BridgeTimeouts,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            keying: LayoutKeying::default(),
            timeouts: BridgeTimeouts::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(String),
}

impl BridgeConfig {
    /// Build typed bridge config from environment variables.
    ///
    /// Optional:
    /// - `PLOTDESK_API_BASE_URL`: default `http://localhost:5000/api/admin`
    /// - `PLOTDESK_LAYOUT_KEYING`: `property` (default) or `project`
    /// - `PLOTDESK_REQUEST_TIMEOUT_SECS`: default 30
    /// - `PLOTDESK_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for an unknown keying scheme.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("PLOTDESK_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let keying = parse_keying(std::env::var("PLOTDESK_LAYOUT_KEYING").ok().as_deref())?;
        let timeouts = BridgeTimeouts {
            request_secs: env_parse_u64("PLOTDESK_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("PLOTDESK_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Ok(Self::new(base_url, keying, timeouts))
    }

    /// Build a config, trimming any trailing slash from `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, keying: LayoutKeying, timeouts: BridgeTimeouts) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, keying, timeouts }
    }

    /// Full URL of the layout resource for `id`.
    #[must_use]
    pub fn layout_url(&self, id: &str) -> String {
        format!("{}{}", self.base_url, self.keying.layout_path(id))
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).map_or(default, |v| v.trim().parse().unwrap_or(default))
}

/// Parse a keying scheme name. Absent means [`LayoutKeying::Property`].
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for anything other than `property` or `project`.
pub fn parse_keying(raw: Option<&str>) -> Result<LayoutKeying, ConfigError> {
    match raw.map(str::trim).unwrap_or("property") {
        "property" => Ok(LayoutKeying::Property),
        "project" => Ok(LayoutKeying::Project),
        other => Err(ConfigError::Parse(format!(
            "unknown PLOTDESK_LAYOUT_KEYING '{other}' (expected 'property' or 'project')"
        ))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

//! Client configuration.

use std::time::Duration;

/// Host of the Cozi REST service.
pub const BASE_URL: &str = "https://rest.cozi.com";
/// Version segment every endpoint path is appended to.
pub const API_VERSION: &str = "api/ext/2207";

pub const DEFAULT_USER_AGENT: &str = "cozi-api-client";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Options recognized by `CoziClient::new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Sent as `User-Agent` on every request.
    pub user_agent: String,
    /// Whole-request timeout; expiry surfaces as an `UNKNOWN_ERROR` ApiError.
    pub timeout: Duration,
    /// Emit a log line before and after every operation.
    pub debug: bool,
    /// Root that endpoint paths are appended to. Defaults to the versioned
    /// Cozi endpoint; tests point it at a local server.
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            debug: false,
            base_url: format!("{BASE_URL}/{API_VERSION}"),
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with `COZI_USER_AGENT`, `COZI_TIMEOUT_MS`,
    /// `COZI_DEBUG` and `COZI_BASE_URL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like `from_env`, reading variables through `lookup`. Values that do not
    /// parse leave the default in place.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(user_agent) = lookup("COZI_USER_AGENT").filter(|v| !v.is_empty()) {
            config.user_agent = user_agent;
        }
        if let Some(millis) = lookup("COZI_TIMEOUT_MS").and_then(|v| v.trim().parse::<u64>().ok()) {
            config.timeout = Duration::from_millis(millis);
        }
        if let Some(debug) = lookup("COZI_DEBUG").and_then(|v| parse_flag(&v)) {
            config.debug = debug;
        }
        if let Some(base_url) = lookup("COZI_BASE_URL").filter(|v| !v.is_empty()) {
            config.base_url = base_url;
        }
        config
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

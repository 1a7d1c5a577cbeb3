//! Panel configuration parsed from environment variables.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The hosting page did not bind the panel to an event.
    #[error("missing event id; the chat panel cannot start without one")]
    MissingEventId,

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("unknown refresh policy '{0}' (expected 'overlap' or 'skip-while-in-flight')")]
    InvalidRefreshPolicy(String),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// EVENT ID
// =============================================================================

/// Identifier of the event whose chat the panel shows. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventId(String);

impl EventId {
    /// Validate a raw event id supplied by the host.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEventId`] when the id is empty or blank.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingEventId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// REFRESH POLICY
// =============================================================================

/// What a scheduled tick does when an earlier refresh has not completed yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Always fetch. Overlapping responses render in completion order.
    #[default]
    Overlap,
    /// Skip the tick while any refresh is in flight. User-triggered
    /// refreshes are never skipped.
    SkipWhileInFlight,
}

impl FromStr for RefreshPolicy {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "overlap" => Ok(Self::Overlap),
            "skip-while-in-flight" | "skip_while_in_flight" => Ok(Self::SkipWhileInFlight),
            other => Err(ConfigError::InvalidRefreshPolicy(other.to_owned())),
        }
    }
}

// =============================================================================
// PANEL CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelConfig {
    pub base_url: String,
    pub event_id: EventId,
    pub poll_interval: Duration,
    pub max_message_chars: usize,
    pub refresh_policy: RefreshPolicy,
    /// Overall HTTP request timeout. `None` keeps the client default.
    pub request_timeout: Option<Duration>,
    /// Raw `Cookie` header sent with every request (session + CSRF cookies).
    pub cookie: Option<String>,
}

impl PanelConfig {
    /// Config for `event_id` with every other setting at its default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEventId`] for a blank id.
    pub fn new(event_id: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            event_id: EventId::parse(event_id)?,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
            refresh_policy: RefreshPolicy::default(),
            request_timeout: None,
            cookie: None,
        })
    }

    /// Set the poll interval; zero keeps the default.
    pub fn set_poll_interval_ms(&mut self, millis: u64) {
        let millis = if millis == 0 { DEFAULT_POLL_INTERVAL_MS } else { millis };
        self.poll_interval = Duration::from_millis(millis);
    }

    /// Set the message length limit; zero keeps the default, since no
    /// message could ever be sent under it.
    pub fn set_max_message_chars(&mut self, max: usize) {
        self.max_message_chars = if max == 0 { DEFAULT_MAX_MESSAGE_CHARS } else { max };
    }

    /// Build typed panel config from environment variables.
    ///
    /// Required:
    /// - `XAT_EVENT_ID`
    ///
    /// Optional:
    /// - `XAT_BASE_URL`: default `http://127.0.0.1:8000`
    /// - `XAT_POLL_INTERVAL_MS`: default 5000; zero falls back to the default
    /// - `XAT_MAX_MESSAGE_CHARS`: default 500; zero falls back to the default
    /// - `XAT_REFRESH_POLICY`: `overlap` (default) or `skip-while-in-flight`
    /// - `XAT_REQUEST_TIMEOUT_SECS`: unset keeps the HTTP client default
    /// - `XAT_COOKIE`: raw `Cookie` header value
    ///
    /// # Errors
    ///
    /// Returns an error if the event id is missing or a value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let event_id = std::env::var("XAT_EVENT_ID").unwrap_or_default();
        let mut config = Self::new(&event_id)?;

        if let Some(base_url) = env_non_empty("XAT_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_owned();
        }
        config.set_poll_interval_ms(env_parse("XAT_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS));
        config.set_max_message_chars(env_parse("XAT_MAX_MESSAGE_CHARS", DEFAULT_MAX_MESSAGE_CHARS));
        if let Some(policy) = env_non_empty("XAT_REFRESH_POLICY") {
            config.refresh_policy = policy.parse()?;
        }
        config.request_timeout = env_non_empty("XAT_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        config.cookie = env_non_empty("XAT_COOKIE");

        Ok(config)
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

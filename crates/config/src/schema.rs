//! Config schema types (server, Slack, Gemini).

use std::time::Duration;

use secrecy::{ExposeSecret, Secret};

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_SLACK_API_BASE_URL: &str = "https://slack.com/api";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Root configuration, loaded once at process start.
#[derive(Debug, Clone)]
pub struct RelaybotConfig {
    pub server: ServerConfig,
    pub slack: SlackConfig,
    pub gemini: GeminiConfig,
    /// Per-request timeout applied to outbound Slack and Gemini calls.
    pub http_timeout: Duration,
}

/// HTTP listener settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Shared secret expected in the `X-API-KEY` header of `/gemini`.
    /// `None` keeps the diagnostic endpoint closed.
    pub api_key: Option<Secret<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.into(),
            port: DEFAULT_PORT,
            api_key: None,
        }
    }
}

/// Slack bot account settings.
#[derive(Clone)]
pub struct SlackConfig {
    /// Bot OAuth token (`xoxb-…`).
    pub bot_token: Secret<String>,
    /// The bot's own user ID, used for mention stripping and loop prevention.
    pub bot_user_id: String,
    /// Signing secret for Events API request verification.
    pub signing_secret: Option<Secret<String>>,
    /// Web API base URL, overridable for tests.
    pub api_base_url: String,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("bot_token", &"[REDACTED]")
            .field("bot_user_id", &self.bot_user_id)
            .field(
                "signing_secret",
                &self.signing_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

/// Gemini provider settings.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl RelaybotConfig {
    /// Whether `/gemini` can ever authorize a caller.
    pub fn diagnostic_endpoint_enabled(&self) -> bool {
        self.server
            .api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().is_empty())
    }
}

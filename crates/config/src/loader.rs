use std::time::Duration;

use {secrecy::Secret, tracing::debug};

use crate::{
    error::{Error, Result},
    schema::{
        DEFAULT_BIND, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, DEFAULT_HTTP_TIMEOUT_SECS,
        DEFAULT_PORT, DEFAULT_SLACK_API_BASE_URL, GeminiConfig, RelaybotConfig, ServerConfig,
        SlackConfig,
    },
};

pub const ENV_GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const ENV_SLACK_BOT_TOKEN: &str = "SLACK_BOT_TOKEN";
pub const ENV_BOT_USER_ID: &str = "BOT_USER_ID";
pub const ENV_API_KEY: &str = "RELAYBOT_API_KEY";
pub const ENV_SLACK_SIGNING_SECRET: &str = "SLACK_SIGNING_SECRET";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";
pub const ENV_GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";
pub const ENV_SLACK_API_BASE_URL: &str = "SLACK_API_BASE_URL";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "RELAYBOT_HTTP_TIMEOUT_SECS";
pub const ENV_BIND: &str = "RELAYBOT_BIND";
pub const ENV_PORT: &str = "RELAYBOT_PORT";

/// Load config from the process environment.
pub fn load_from_env() -> Result<RelaybotConfig> {
    load_with(|key| std::env::var(key).ok())
}

/// Load config using a custom lookup function.
///
/// This is the implementation used by [`load_from_env`]; the separate
/// signature makes it testable without mutating the process environment.
/// Blank values are treated as unset.
pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<RelaybotConfig> {
    let get = |key: &str| {
        lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let mut missing = Vec::new();
    let mut require = |key: &str| {
        let value = get(key);
        if value.is_none() {
            missing.push(key.to_string());
        }
        value.unwrap_or_default()
    };
    let google_api_key = require(ENV_GOOGLE_API_KEY);
    let bot_token = require(ENV_SLACK_BOT_TOKEN);
    let bot_user_id = require(ENV_BOT_USER_ID);
    if !missing.is_empty() {
        return Err(Error::Missing { keys: missing });
    }

    let port = match get(ENV_PORT) {
        Some(raw) => raw
            .parse::<u16>()
            .map_err(|e| Error::invalid(ENV_PORT, e))?,
        None => DEFAULT_PORT,
    };
    let timeout_secs = match get(ENV_HTTP_TIMEOUT_SECS) {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|e| Error::invalid(ENV_HTTP_TIMEOUT_SECS, e))?,
        None => DEFAULT_HTTP_TIMEOUT_SECS,
    };
    if timeout_secs == 0 {
        return Err(Error::invalid(ENV_HTTP_TIMEOUT_SECS, "must be greater than zero"));
    }

    let api_key = get(ENV_API_KEY).map(Secret::new);
    if api_key.is_none() {
        debug!("{ENV_API_KEY} not set, /gemini will reject every request");
    }

    Ok(RelaybotConfig {
        server: ServerConfig {
            bind: get(ENV_BIND).unwrap_or_else(|| DEFAULT_BIND.into()),
            port,
            api_key,
        },
        slack: SlackConfig {
            bot_token: Secret::new(bot_token),
            bot_user_id,
            signing_secret: get(ENV_SLACK_SIGNING_SECRET).map(Secret::new),
            api_base_url: get(ENV_SLACK_API_BASE_URL)
                .unwrap_or_else(|| DEFAULT_SLACK_API_BASE_URL.into()),
        },
        gemini: GeminiConfig {
            api_key: Secret::new(google_api_key),
            model: get(ENV_GEMINI_MODEL).unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into()),
            base_url: get(ENV_GEMINI_BASE_URL).unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.into()),
        },
        http_timeout: Duration::from_secs(timeout_secs),
    })
}

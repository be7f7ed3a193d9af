use std::sync::Arc;

use {secrecy::Secret, tracing::info};

use {
    relaybot_agents::{GeminiProvider, LlmProvider},
    relaybot_channels::{ChannelOutbound, ThreadHistory},
    relaybot_config::RelaybotConfig,
    relaybot_slack::SlackClient,
};

use crate::{dedup::DedupStore, dispatch::EventDispatcher};

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: EventDispatcher,
    pub provider: Arc<dyn LlmProvider>,
    /// Shared secret for `/gemini`. `None` locks the endpoint.
    pub api_key: Option<Arc<Secret<String>>>,
    /// Slack signing secret. `None` skips request verification.
    pub signing_secret: Option<Arc<Secret<String>>>,
    pub version: String,
}

impl AppState {
    /// Wire the Slack client, Gemini provider and a fresh dedup store from
    /// configuration.
    pub fn from_config(config: &RelaybotConfig) -> anyhow::Result<Self> {
        let slack = Arc::new(SlackClient::new(
            config.slack.bot_token.clone(),
            config.slack.api_base_url.clone(),
            config.http_timeout,
        )?);
        let provider: Arc<dyn LlmProvider> = Arc::new(GeminiProvider::with_timeout(
            config.gemini.api_key.clone(),
            config.gemini.model.clone(),
            config.gemini.base_url.clone(),
            config.http_timeout,
        )?);

        if config.slack.signing_secret.is_none() {
            info!("SLACK_SIGNING_SECRET not set, accepting unsigned Slack requests");
        }
        if !config.diagnostic_endpoint_enabled() {
            info!("no diagnostic API key configured, /gemini will reject every request");
        }

        Ok(Self::new(
            Arc::clone(&slack) as Arc<dyn ThreadHistory>,
            slack,
            provider,
            config.slack.bot_user_id.clone(),
            config.server.api_key.clone(),
            config.slack.signing_secret.clone(),
        ))
    }

    pub fn new(
        history: Arc<dyn ThreadHistory>,
        outbound: Arc<dyn ChannelOutbound>,
        provider: Arc<dyn LlmProvider>,
        bot_user_id: impl Into<String>,
        api_key: Option<Secret<String>>,
        signing_secret: Option<Secret<String>>,
    ) -> Self {
        let dispatcher = EventDispatcher::new(
            Arc::new(DedupStore::new()),
            history,
            outbound,
            Arc::clone(&provider),
            bot_user_id,
        );
        Self {
            dispatcher,
            provider,
            api_key: api_key.map(Arc::new),
            signing_secret: signing_secret.map(Arc::new),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

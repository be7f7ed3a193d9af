use std::time::Duration;

use {
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
    tracing::{debug, trace},
};

use relaybot_channels::{
    ChannelOutbound, Error, Result, ThreadHistory, ThreadMessage, error::Context,
};

/// Page size requested from `conversations.replies`.
const REPLIES_PAGE_LIMIT: &str = "200";

/// Slack Web API client for the bot account.
pub struct SlackClient {
    http: reqwest::Client,
    bot_token: Secret<String>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RepliesResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    messages: Vec<ThreadMessage>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: Option<String>,
}

impl SlackClient {
    pub fn new(bot_token: Secret<String>, base_url: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::external("building Slack HTTP client", e))?;
        Ok(Self::with_client(http, bot_token, base_url))
    }

    pub fn with_client(http: reqwest::Client, bot_token: Secret<String>, base_url: String) -> Self {
        Self {
            http,
            bot_token,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    async fn fetch_replies_page(
        &self,
        channel: &str,
        thread_ts: &str,
        cursor: Option<&str>,
    ) -> Result<RepliesResponse> {
        let method = "conversations.replies";
        let mut query = vec![
            ("channel", channel),
            ("ts", thread_ts),
            ("limit", REPLIES_PAGE_LIMIT),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor));
        }

        let resp = self
            .http
            .get(self.url(method))
            .bearer_auth(self.bot_token.expose_secret())
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::external(method, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::api(method, format!("HTTP {status}: {body}")));
        }

        let page = resp
            .json::<RepliesResponse>()
            .await
            .with_context(|| format!("decoding {method} response"))?;
        if !page.ok {
            return Err(Error::api(
                method,
                page.error.unwrap_or_else(|| "unknown_error".into()),
            ));
        }
        Ok(page)
    }
}

#[async_trait]
impl ThreadHistory for SlackClient {
    async fn fetch_thread_replies(
        &self,
        channel: &str,
        thread_ts: &str,
    ) -> Result<Vec<ThreadMessage>> {
        let mut messages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .fetch_replies_page(channel, thread_ts, cursor.as_deref())
                .await?;
            trace!(channel, thread_ts, count = page.messages.len(), "fetched replies page");
            messages.extend(page.messages);

            match page.response_metadata.and_then(|m| m.next_cursor) {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        debug!(channel, thread_ts, count = messages.len(), "fetched thread history");
        Ok(messages)
    }
}

#[async_trait]
impl ChannelOutbound for SlackClient {
    async fn post_message(&self, channel: &str, text: &str, thread_ts: &str) -> Result<()> {
        let method = "chat.postMessage";
        let body = serde_json::json!({
            "channel": channel,
            "text": text,
            "thread_ts": thread_ts,
            "mrkdwn": true,
        });

        let resp = self
            .http
            .post(self.url(method))
            .bearer_auth(self.bot_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::external(method, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::api(method, format!("HTTP {status}: {body}")));
        }

        let api = resp
            .json::<ApiResponse>()
            .await
            .with_context(|| format!("decoding {method} response"))?;
        if !api.ok {
            return Err(Error::api(
                method,
                api.error.unwrap_or_else(|| "unknown_error".into()),
            ));
        }

        debug!(channel, thread_ts, "posted reply");
        Ok(())
    }
}

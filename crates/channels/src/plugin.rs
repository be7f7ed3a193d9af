use {async_trait::async_trait, serde::Deserialize};

use crate::Result;

/// One entry of a thread's reply history, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ThreadMessage {
    pub text: String,
    /// Sender user ID. Absent for some integration and bot posts.
    pub user: Option<String>,
    /// Present when the message was posted by a bot or app.
    pub bot_id: Option<String>,
    /// Client-generated identifier, stable across delivery retries.
    pub client_msg_id: Option<String>,
    pub ts: String,
}

impl ThreadMessage {
    /// Whether the message was written by `bot_user_id` or by any bot account.
    pub fn is_bot_authored(&self, bot_user_id: &str) -> bool {
        self.bot_id.is_some() || self.user.as_deref() == Some(bot_user_id)
    }
}

/// Read access to conversation threads.
#[async_trait]
pub trait ThreadHistory: Send + Sync {
    /// Fetch every reply in the thread anchored at `thread_ts`, including the
    /// parent message, in chronological order.
    async fn fetch_thread_replies(&self, channel: &str, thread_ts: &str)
    -> Result<Vec<ThreadMessage>>;
}

/// Send messages to a channel.
#[async_trait]
pub trait ChannelOutbound: Send + Sync {
    /// Post `text` into `channel`, as a reply in the thread anchored at `thread_ts`.
    async fn post_message(&self, channel: &str, text: &str, thread_ts: &str) -> Result<()>;
}

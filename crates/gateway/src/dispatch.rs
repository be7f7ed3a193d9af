use std::sync::Arc;

use {
    tokio::task::JoinHandle,
    tracing::{debug, error, info, warn},
};

use {
    relaybot_agents::LlmProvider,
    relaybot_channels::{ChannelOutbound, ThreadHistory, ThreadMessage},
    relaybot_slack::{SlackEvent, normalize_markup, strip_mentions},
};

use crate::{
    dedup::DedupStore,
    error::{Error, Result},
};

/// Why an inbound event was not handed to the reply task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Written by this bot or by another bot account.
    SelfAuthored,
    /// The event identifier was already admitted recently.
    Duplicate,
    /// Nothing left to answer once bot mentions are removed.
    EmptyText,
}

/// An event that passed filtering, with its mention-free text.
#[derive(Debug, Clone)]
pub struct AdmittedEvent {
    pub event: SlackEvent,
    pub text: String,
}

/// Filters inbound Slack events and spawns one reply task per admitted event.
#[derive(Clone)]
pub struct EventDispatcher {
    dedup: Arc<DedupStore>,
    history: Arc<dyn ThreadHistory>,
    outbound: Arc<dyn ChannelOutbound>,
    provider: Arc<dyn LlmProvider>,
    bot_user_id: String,
}

impl EventDispatcher {
    pub fn new(
        dedup: Arc<DedupStore>,
        history: Arc<dyn ThreadHistory>,
        outbound: Arc<dyn ChannelOutbound>,
        provider: Arc<dyn LlmProvider>,
        bot_user_id: impl Into<String>,
    ) -> Self {
        Self {
            dedup,
            history,
            outbound,
            provider,
            bot_user_id: bot_user_id.into(),
        }
    }

    pub fn dedup(&self) -> &DedupStore {
        &self.dedup
    }

    /// Run the synchronous filter pipeline.
    ///
    /// The duplicate check records the identifier, so an admitted event
    /// stays admitted even if its reply task later fails.
    pub fn admit(&self, event: SlackEvent) -> std::result::Result<AdmittedEvent, DropReason> {
        if event.is_self_authored(&self.bot_user_id) {
            return Err(DropReason::SelfAuthored);
        }
        if self.dedup.check_and_admit(event.dedup_key()) {
            return Err(DropReason::Duplicate);
        }

        let text = strip_mentions(&event.text, &self.bot_user_id);
        if text.is_empty() {
            return Err(DropReason::EmptyText);
        }

        Ok(AdmittedEvent { event, text })
    }

    /// Filter `event` and, if admitted, spawn its reply task.
    ///
    /// Returns `None` when the event was dropped. Callers on the request path
    /// ignore the handle; tests await it.
    pub fn dispatch(&self, event: SlackEvent) -> Option<JoinHandle<()>> {
        let admitted = match self.admit(event) {
            Ok(admitted) => admitted,
            Err(reason) => {
                debug!(?reason, "dropping slack event");
                return None;
            },
        };

        info!(
            channel = %admitted.event.channel,
            thread_ts = %admitted.event.thread_anchor(),
            client_msg_id = admitted.event.dedup_key().unwrap_or_default(),
            "dispatching reply"
        );

        let this = self.clone();
        Some(tokio::spawn(async move {
            let channel = admitted.event.channel.clone();
            let thread_ts = admitted.event.thread_anchor().to_string();
            if let Err(e) = this.reply(admitted).await {
                match e.platform_reason() {
                    Some(reason) => {
                        error!(%channel, %thread_ts, reason, "slack API error while replying")
                    },
                    None => error!(%channel, %thread_ts, error = %e, "failed to reply"),
                }
            }
        }))
    }

    async fn reply(&self, admitted: AdmittedEvent) -> Result<()> {
        let AdmittedEvent { event, text } = admitted;

        let history = match event.parent_thread_ts() {
            Some(parent) => {
                self.history
                    .fetch_thread_replies(&event.channel, parent)
                    .await?
            },
            None => Vec::new(),
        };

        let prompt = build_prompt(&history, &event, &text, &self.bot_user_id);
        debug!(lines = history.len() + 1, "built conversation context");

        let generated = self
            .provider
            .generate(&prompt)
            .await
            .map_err(Error::Generation)?;
        if generated.trim().is_empty() {
            warn!(
                provider = self.provider.name(),
                channel = %event.channel,
                "model returned empty text, not replying"
            );
            return Ok(());
        }

        let reply = normalize_markup(&generated);
        self.outbound
            .post_message(&event.channel, &reply, event.thread_anchor())
            .await?;
        Ok(())
    }
}

/// Whether a history entry is the message that triggered this event.
fn is_current_message(msg: &ThreadMessage, event: &SlackEvent) -> bool {
    match event.dedup_key() {
        Some(id) => msg.client_msg_id.as_deref() == Some(id),
        None => msg.ts == event.ts,
    }
}

/// Render thread history plus the current message as role-tagged lines.
pub fn build_prompt(
    history: &[ThreadMessage],
    event: &SlackEvent,
    current_text: &str,
    bot_user_id: &str,
) -> String {
    let mut lines: Vec<String> = history
        .iter()
        .filter(|msg| !is_current_message(msg, event))
        .map(|msg| {
            let role = if msg.is_bot_authored(bot_user_id) {
                "Bot"
            } else {
                "User"
            };
            format!("{role}: {}", strip_mentions(&msg.text, bot_user_id).trim())
        })
        .collect();
    lines.push(format!("User: {current_text}"));
    lines.join("\n")
}

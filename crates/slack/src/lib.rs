//! Slack integration for relaybot.
//!
//! Covers the inbound side of the Events API (payload parsing and request
//! signature verification) and the two Web API calls the bridge needs:
//! `conversations.replies` and `chat.postMessage`.

pub mod client;
pub mod event;
pub mod markdown;
pub mod signature;

pub use {
    client::SlackClient,
    event::{InboundPayload, SlackEvent, parse_payload},
    markdown::{mention_tag, normalize_markup, strip_mentions},
};

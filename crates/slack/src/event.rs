use serde::Deserialize;

use relaybot_channels::{Error, Result};

/// A message event delivered through the Events API (`event_callback.event`).
///
/// Only the fields the bridge reads are modelled; everything else Slack sends
/// is ignored. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SlackEvent {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    /// Client-generated message ID, stable across Slack's delivery retries.
    pub client_msg_id: Option<String>,
    pub channel: String,
    pub user: Option<String>,
    pub bot_id: Option<String>,
    pub text: String,
    pub ts: String,
    pub thread_ts: Option<String>,
}

impl SlackEvent {
    /// Whether the event was written by the bot itself or by any bot account.
    pub fn is_self_authored(&self, bot_user_id: &str) -> bool {
        self.bot_id.is_some() || self.user.as_deref() == Some(bot_user_id)
    }

    /// Explicit thread parent, ignoring blank values.
    pub fn parent_thread_ts(&self) -> Option<&str> {
        self.thread_ts.as_deref().filter(|ts| !ts.is_empty())
    }

    /// Whether the event is a reply inside an existing thread.
    pub fn continues_thread(&self) -> bool {
        self.parent_thread_ts().is_some()
    }

    /// The timestamp replies must be addressed to: the thread parent when the
    /// event is already in a thread, otherwise the event's own `ts`.
    pub fn thread_anchor(&self) -> &str {
        self.parent_thread_ts().unwrap_or(&self.ts)
    }

    /// The deduplication key, if the event carries a usable one.
    pub fn dedup_key(&self) -> Option<&str> {
        self.client_msg_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// The shapes of body `/slack/events` accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundPayload {
    /// URL verification handshake; the value is echoed back verbatim.
    Challenge(serde_json::Value),
    /// An event callback.
    Event(SlackEvent),
    /// A JSON object with neither field. Acknowledged and ignored.
    Other,
}

/// Parse a raw Events API request body.
///
/// A `challenge` field takes precedence over `event`. Bodies that are not a
/// JSON object, or whose `event` is not an object, are rejected.
pub fn parse_payload(body: &[u8]) -> Result<InboundPayload> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    let serde_json::Value::Object(mut map) = value else {
        return Err(Error::invalid_input("events payload must be a JSON object"));
    };

    if let Some(challenge) = map.remove("challenge") {
        return Ok(InboundPayload::Challenge(challenge));
    }

    match map.remove("event") {
        Some(event @ serde_json::Value::Object(_)) => {
            Ok(InboundPayload::Event(serde_json::from_value(event)?))
        },
        Some(_) => Err(Error::invalid_input("`event` must be a JSON object")),
        None => Ok(InboundPayload::Other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn event(json: serde_json::Value) -> SlackEvent {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn top_level_message_anchors_on_own_ts() {
        let ev = event(serde_json::json!({
            "type": "message",
            "text": "<@U123> hi",
            "user": "U999",
            "ts": "100.1",
            "channel": "C1",
            "client_msg_id": "abc",
        }));
        assert_eq!(ev.thread_anchor(), "100.1");
        assert!(!ev.continues_thread());
        assert_eq!(ev.dedup_key(), Some("abc"));
    }

    #[test]
    fn thread_reply_anchors_on_parent() {
        let ev = event(serde_json::json!({
            "ts": "100.5",
            "thread_ts": "100.1",
        }));
        assert_eq!(ev.thread_anchor(), "100.1");
        assert!(ev.continues_thread());
    }

    #[test]
    fn blank_thread_ts_is_ignored() {
        let ev = event(serde_json::json!({ "ts": "100.5", "thread_ts": "" }));
        assert_eq!(ev.thread_anchor(), "100.5");
        assert!(!ev.continues_thread());
    }

    #[test]
    fn blank_client_msg_id_has_no_dedup_key() {
        let ev = event(serde_json::json!({ "client_msg_id": "" }));
        assert_eq!(ev.dedup_key(), None);
    }

    #[test]
    fn self_authored_detection() {
        let from_bot_user = event(serde_json::json!({ "user": "U123" }));
        let from_bot_app = event(serde_json::json!({ "user": "U999", "bot_id": "B1" }));
        let from_human = event(serde_json::json!({ "user": "U999" }));
        assert!(from_bot_user.is_self_authored("U123"));
        assert!(from_bot_app.is_self_authored("U123"));
        assert!(!from_human.is_self_authored("U123"));
    }

    #[test]
    fn parse_challenge() {
        let payload = parse_payload(br#"{"challenge":"xyz","type":"url_verification"}"#).unwrap();
        assert_eq!(payload, InboundPayload::Challenge(serde_json::json!("xyz")));
    }

    #[test]
    fn challenge_wins_over_event() {
        let payload = parse_payload(br#"{"challenge":"xyz","event":{"text":"hi"}}"#).unwrap();
        assert!(matches!(payload, InboundPayload::Challenge(_)));
    }

    #[test]
    fn parse_event_callback() {
        let payload = parse_payload(
            br#"{"type":"event_callback","event":{"type":"message","text":"hi","channel":"C1","ts":"1.0"}}"#,
        )
        .unwrap();
        let InboundPayload::Event(ev) = payload else {
            panic!("expected event payload");
        };
        assert_eq!(ev.text, "hi");
        assert_eq!(ev.channel, "C1");
    }

    #[test]
    fn parse_other_object() {
        assert_eq!(
            parse_payload(br#"{"type":"app_rate_limited"}"#).unwrap(),
            InboundPayload::Other
        );
    }

    #[test]
    fn parse_rejects_malformed_bodies() {
        assert!(parse_payload(b"not json").is_err());
        assert!(parse_payload(b"[1,2,3]").is_err());
        assert!(parse_payload(br#"{"event":"nope"}"#).is_err());
    }
}

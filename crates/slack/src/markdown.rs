//! Text adaptation between Slack mrkdwn and model output.

/// The literal tag Slack inserts when a user @-mentions `user_id`.
pub fn mention_tag(user_id: &str) -> String {
    format!("<@{user_id}>")
}

/// Remove every mention of `bot_user_id` from `text`.
///
/// Surrounding whitespace is trimmed only when a mention was actually
/// removed; text without the tag is returned unchanged.
pub fn strip_mentions(text: &str, bot_user_id: &str) -> String {
    let tag = mention_tag(bot_user_id);
    if text.contains(&tag) {
        text.replace(&tag, "").trim().to_string()
    } else {
        text.to_string()
    }
}

/// Convert model markdown emphasis to Slack mrkdwn.
///
/// Models emit `**bold**`; Slack renders bold as `*bold*`.
pub fn normalize_markup(text: &str) -> String {
    text.replace("**", "*")
}

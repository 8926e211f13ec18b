//! Handling for @-mentions of the bot.

use chrono::{DateTime, Local};
use slack_morphism::prelude::SlackAppMentionEvent;
use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        templates::{self, ReplyTemplate},
        types::{AttachmentField, EventError, ReplyAttachment, UserProfile},
    },
    service::chat::ChatClient,
};

/// Respond to an @-mention of the bot.
///
/// Looks up the mentioning user, builds the reply for the message text, and
/// posts it to the configured reply channel. A lookup failure abandons the
/// reply before any post is attempted.
#[instrument(skip_all)]
pub async fn handle_mention(event: SlackAppMentionEvent, chat: &ChatClient, config: &Config) -> Result<(), EventError> {
    info!("Received app mention event ...");

    let user_id = event.user.0;
    let profile = chat.user_info(&user_id).await.map_err(EventError::Lookup)?;

    let text = event.content.text.unwrap_or_default();
    let reply = build_reply(&profile, &text, Local::now());

    chat.post_reply(&config.reply_channel_id, &reply).await.map_err(EventError::Post)?;

    Ok(())
}

/// Build the reply for a mention: template choice plus the fixed metadata
/// fields.
pub fn build_reply(profile: &UserProfile, raw_text: &str, sent_at: DateTime<Local>) -> ReplyAttachment {
    // Lowercased for matching only; the original casing is never shown back.
    let normalized = raw_text.to_lowercase();
    let template = ReplyTemplate::select(&normalized);

    ReplyAttachment {
        pretext: template.pretext().to_string(),
        text: template.body(&profile.real_name),
        color: template.color().to_string(),
        fields: vec![
            AttachmentField {
                title: templates::DATE_FIELD_TITLE.to_string(),
                value: sent_at.format(templates::DATE_FORMAT).to_string(),
                short: false,
            },
            AttachmentField {
                title: templates::INITIALIZER_FIELD_TITLE.to_string(),
                value: profile.display_name.clone(),
                short: true,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(display_name: &str, real_name: &str) -> UserProfile {
        UserProfile {
            display_name: display_name.to_string(),
            real_name: real_name.to_string(),
        }
    }

    #[test]
    fn test_hello_text_gets_the_greeting_reply() {
        let reply = build_reply(&profile("Alice A", "Alice A"), "<@U0BOT> hello there", Local::now());

        assert_eq!(reply.pretext, "Greetings");
        assert_eq!(reply.text, "Hello, Alice A");
        assert_eq!(reply.color, "#4af030");
    }

    #[test]
    fn test_other_text_gets_the_service_offer_reply() {
        let reply = build_reply(&profile("Bob B", "Bob B"), "<@U0BOT> what is the status", Local::now());

        assert_eq!(reply.pretext, "How can I be of service?");
        assert_eq!(reply.text, "How can I help you Bob B?");
        assert_eq!(reply.color, "#3d3d3d");
    }

    #[test]
    fn test_casing_does_not_affect_selection() {
        let reply = build_reply(&profile("Alice A", "Alice A"), "HeLLo!", Local::now());

        assert_eq!(reply.color, "#4af030");
    }

    #[test]
    fn test_every_reply_carries_date_and_initializer_fields() {
        let sent_at = Local::now();
        let reply = build_reply(&profile("ali", "Alice A"), "hello", sent_at);

        assert_eq!(reply.fields.len(), 2);

        assert_eq!(reply.fields[0].title, "Date");
        assert!(!reply.fields[0].short);

        let parsed = DateTime::parse_from_str(&reply.fields[0].value, templates::DATE_FORMAT).expect("Date field should parse back");
        assert_eq!(parsed.timestamp(), sent_at.timestamp());

        assert_eq!(reply.fields[1].title, "Initializer");
        assert_eq!(reply.fields[1].value, "ali");
        assert!(reply.fields[1].short);
    }
}

//! Decoded webhook event envelope.
//!
//! Only user-sourced text messages drive the quiz; every other event,
//! source, or message kind decodes into its `Other` variant and is
//! dropped by the handler without a reply.

use serde::Deserialize;

/// One webhook delivery, possibly carrying several events.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// A single webhook event.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WebhookEvent {
    #[serde(rename_all = "camelCase")]
    Message {
        source: EventSource,
        message: MessageContent,
        reply_token: String,
    },
    /// Follow, unfollow, postback and anything else LINE may add.
    #[serde(other)]
    Other,
}

/// Where the event originated.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventSource {
    #[serde(rename_all = "camelCase")]
    User { user_id: String },
    /// Group and room chats are not part of the quiz.
    #[serde(other)]
    Other,
}

/// The content of a message event.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageContent {
    Text { text: String },
    /// Stickers, images, audio and so on.
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_user_text_message() {
        let json = r#"{
            "destination": "xxxxxxxxxx",
            "events": [{
                "type": "message",
                "mode": "active",
                "timestamp": 1462629479859,
                "replyToken": "rt-1",
                "source": {"type": "user", "userId": "U4af4980629"},
                "message": {"id": "444573844083572737", "type": "text", "text": "Hello"}
            }]
        }"#;
        let payload: WebhookPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.events.len(), 1);
        let WebhookEvent::Message {
            source,
            message,
            reply_token,
        } = &payload.events[0]
        else {
            panic!("expected message event");
        };
        assert_eq!(reply_token, "rt-1");
        let EventSource::User { user_id } = source else {
            panic!("expected user source");
        };
        assert_eq!(user_id, "U4af4980629");
        let MessageContent::Text { text } = message else {
            panic!("expected text message");
        };
        assert_eq!(text, "Hello");
    }

    #[test]
    fn unknown_event_kind_decodes_as_other() {
        let json = r#"{"events": [{"type": "follow", "replyToken": "rt-2",
            "source": {"type": "user", "userId": "U1"}}]}"#;
        let payload: WebhookPayload = serde_json::from_str(json).unwrap();
        assert!(matches!(payload.events[0], WebhookEvent::Other));
    }

    #[test]
    fn group_source_decodes_as_other() {
        let json = r#"{"type": "group", "groupId": "G1", "userId": "U1"}"#;
        let source: EventSource = serde_json::from_str(json).unwrap();
        assert!(matches!(source, EventSource::Other));
    }

    #[test]
    fn sticker_message_decodes_as_other() {
        let json = r#"{"type": "sticker", "packageId": "1", "stickerId": "2"}"#;
        let message: MessageContent = serde_json::from_str(json).unwrap();
        assert!(matches!(message, MessageContent::Other));
    }

    #[test]
    fn empty_payload_has_no_events() {
        let payload: WebhookPayload = serde_json::from_str(r#"{"destination": "x"}"#).unwrap();
        assert!(payload.events.is_empty());
    }
}

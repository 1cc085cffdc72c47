//! LINE Messaging API client — replies and profile lookups over reqwest.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::LineError;

const API_BASE: &str = "https://api.line.me/v2/bot";

/// One part of an outbound reply, in LINE wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutgoingMessage {
    Text { text: String },
    #[serde(rename_all = "camelCase")]
    Image {
        original_content_url: String,
        preview_image_url: String,
    },
}

/// Seam between reply composition and delivery.
///
/// The webhook handler composes messages and hands them off here; tests
/// substitute a recording stub.
#[async_trait]
pub trait MessagingApi: Send + Sync {
    /// Send a correlated reply against a short-lived reply token.
    async fn reply(
        &self,
        reply_token: &str,
        messages: Vec<OutgoingMessage>,
    ) -> Result<(), LineError>;

    /// Fetch a user's display name, if the profile is visible to the bot.
    async fn display_name(&self, user_id: &str) -> Option<String>;
}

/// Client for the LINE Messaging API.
pub struct LineClient {
    access_token: SecretString,
    client: reqwest::Client,
    api_base: String,
}

impl LineClient {
    pub fn new(access_token: SecretString) -> Self {
        Self {
            access_token,
            client: reqwest::Client::new(),
            api_base: API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Profile {
    display_name: String,
}

#[async_trait]
impl MessagingApi for LineClient {
    async fn reply(
        &self,
        reply_token: &str,
        messages: Vec<OutgoingMessage>,
    ) -> Result<(), LineError> {
        let body = serde_json::json!({
            "replyToken": reply_token,
            "messages": messages,
        });

        let resp = self
            .client
            .post(format!("{}/message/reply", self.api_base))
            .bearer_auth(self.access_token.expose_secret())
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LineError::ReplyFailed { status, body });
        }
        Ok(())
    }

    async fn display_name(&self, user_id: &str) -> Option<String> {
        let resp = self
            .client
            .get(format!("{}/profile/{}", self.api_base, user_id))
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .ok()?;

        if !resp.status().is_success() {
            tracing::debug!(user_id, status = %resp.status(), "Profile lookup failed");
            return None;
        }
        resp.json::<Profile>().await.ok().map(|p| p.display_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_message_wire_shape() {
        let msg = OutgoingMessage::Text {
            text: "hello".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            serde_json::json!({"type": "text", "text": "hello"})
        );
    }

    #[test]
    fn image_message_wire_shape() {
        let msg = OutgoingMessage::Image {
            original_content_url: "https://h/image/image_1?is_preview=false".to_string(),
            preview_image_url: "https://h/image/image_1?is_preview=true".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            serde_json::json!({
                "type": "image",
                "originalContentUrl": "https://h/image/image_1?is_preview=false",
                "previewImageUrl": "https://h/image/image_1?is_preview=true"
            })
        );
    }

    #[test]
    fn profile_decodes_display_name() {
        let profile: Profile =
            serde_json::from_str(r#"{"displayName": "Alice", "userId": "U1"}"#).unwrap();
        assert_eq!(profile.display_name, "Alice");
    }
}

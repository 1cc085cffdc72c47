//! HTTP surface: the webhook callback and the image endpoint.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{ImageError, WebhookError};
use crate::images::ImageService;
use crate::line::client::{MessagingApi, OutgoingMessage};
use crate::line::events::{EventSource, MessageContent, WebhookEvent, WebhookPayload};
use crate::line::signature;
use crate::quiz::tracker::{QuizTracker, ReplyPart};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tracker: Arc<QuizTracker>,
    pub images: Arc<ImageService>,
    pub messaging: Arc<dyn MessagingApi>,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/callback", post(callback))
        .route("/image/{fid}", get(get_image))
        .with_state(state)
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

impl IntoResponse for ImageError {
    fn into_response(self) -> Response {
        let status = match &self {
            ImageError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            ImageError::NotFound(_) => StatusCode::NOT_FOUND,
            ImageError::Io(_) | ImageError::Codec(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// POST /callback — signed webhook deliveries from the platform.
async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<&'static str, WebhookError> {
    let sig = headers
        .get("x-line-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !signature::verify(state.config.channel_secret.expose_secret(), body.as_bytes(), sig) {
        return Err(WebhookError::InvalidSignature);
    }

    let payload: WebhookPayload = serde_json::from_str(&body)?;
    for event in payload.events {
        handle_event(&state, event).await;
    }
    Ok("OK")
}

/// Process one decoded event. Anything that is not a user-sourced text
/// message is dropped without a reply.
async fn handle_event(state: &AppState, event: WebhookEvent) {
    let WebhookEvent::Message {
        source,
        message,
        reply_token,
    } = event
    else {
        return;
    };
    let EventSource::User { user_id } = source else {
        return;
    };
    let MessageContent::Text { text } = message else {
        return;
    };

    let display_name = state.messaging.display_name(&user_id).await;
    let reply = state
        .tracker
        .advance(&user_id, &text, display_name.as_deref())
        .await;
    info!(user_id = %user_id, step = reply.step, "Quiz step evaluated");

    let messages = reply
        .parts
        .into_iter()
        .map(|part| match part {
            ReplyPart::Text(text) => OutgoingMessage::Text { text },
            ReplyPart::Image { image_id } => OutgoingMessage::Image {
                original_content_url: state.config.image_url(&image_id, false),
                preview_image_url: state.config.image_url(&image_id, true),
            },
        })
        .collect();

    // Fire-and-forget: a failed delivery is logged, never retried.
    if let Err(e) = state.messaging.reply(&reply_token, messages).await {
        warn!(error = %e, "Reply delivery failed");
    }
}

#[derive(Debug, Deserialize)]
struct ImageQuery {
    #[serde(default)]
    is_preview: bool,
}

/// GET /image/{fid}?is_preview=<bool> — serve a stored JPEG.
async fn get_image(
    State(state): State<AppState>,
    Path(fid): Path<String>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ImageError> {
    let bytes = state.images.get(&fid, query.is_preview).await?;
    Ok((
        [(header::CONTENT_TYPE, "image/jpeg")],
        bytes.as_ref().clone(),
    )
        .into_response())
}

//! Error types for linequiz.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("LINE API error: {0}")]
    Line(#[from] LineError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Inbound webhook errors. Both map to HTTP 400 at the boundary.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Malformed webhook payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

/// Image delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Invalid image identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image codec error: {0}")]
    Codec(#[from] image::ImageError),
}

/// Outbound LINE Messaging API errors. Reply delivery is fire-and-forget,
/// so callers log these rather than propagate them to the webhook response.
#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("Reply delivery failed ({status}): {body}")]
    ReplyFailed {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;

//! Environment configuration, loaded once at process start.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Process-wide configuration. Immutable after startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// LINE channel access token, used as a bearer token on outbound calls.
    pub access_token: SecretString,
    /// LINE channel secret, used to verify webhook signatures.
    pub channel_secret: SecretString,
    /// Public host name the messaging platform fetches image URLs from.
    pub host: String,
    /// Directory holding the quiz images as `{fid}.jpg`.
    pub images_dir: PathBuf,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// `LINE_ACCESS_TOKEN`, `LINE_CHANNEL_SECRET` and `PUBLIC_HOST` are
    /// required; `IMAGES_DIR` defaults to `images` and `BIND_ADDR` to
    /// `0.0.0.0:8000`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            access_token: SecretString::from(require("LINE_ACCESS_TOKEN")?),
            channel_secret: SecretString::from(require("LINE_CHANNEL_SECRET")?),
            host: require("PUBLIC_HOST")?,
            images_dir: std::env::var("IMAGES_DIR")
                .unwrap_or_else(|_| "images".to_string())
                .into(),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
        })
    }

    /// Build the public URL the platform fetches an image from.
    pub fn image_url(&self, fid: &str, is_preview: bool) -> String {
        format!(
            "https://{}/image/{}?is_preview={}",
            self.host, fid, is_preview
        )
    }
}

fn require(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

//! LINE platform integration: webhook events, signature checks, reply client.

pub mod client;
pub mod events;
pub mod signature;

pub use client::{LineClient, MessagingApi, OutgoingMessage};
pub use events::{EventSource, MessageContent, WebhookEvent, WebhookPayload};

//! Relaybot: a single-channel Discord relay in front of the Gemini API.
//!
//! Each inbound message runs through one [`pipeline::TurnPipeline`] turn:
//! per-user rate limiting, transcript persistence, optional OCR of image
//! attachments, prompt assembly, round-robin key rotation, generation, and
//! chunked reply delivery.

pub mod chunker;
pub mod config;
pub mod discord;
pub mod error;
pub mod llm;
pub mod ocr;
pub mod pipeline;
pub mod prompt;
pub mod ratelimit;
pub mod transcript;

pub use error::{Error, Result};

/// Inbound message from the messaging platform, already reduced to what the
/// pipeline needs.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Stable platform user id of the sender.
    pub author_id: u64,
    /// Display name of the sender, used in transcript lines and the prompt.
    pub author_name: String,
    /// Channel the message arrived in.
    pub channel_id: u64,
    /// Message text.
    pub text: String,
    /// Attachments in platform order.
    pub attachments: Vec<Attachment>,
    /// Whether the sender is the bot itself.
    pub is_own: bool,
}

/// One message attachment.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub url: String,
}

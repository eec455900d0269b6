//! The message turn pipeline: one inbound message in, at most one generated
//! reply out.
//!
//! Sequencing per turn: drop own messages, filter to the allowed channel,
//! rate-check, load history and persist the user line, OCR attachments,
//! build the prompt, rotate to the next API key and generate, persist the
//! assistant line, send the reply in chunks, trim the transcript.
//!
//! A failed generation aborts the turn after the user line has already been
//! persisted; the transcript then carries an unanswered user line. That
//! matches the reference behavior and is deliberate.

use crate::chunker;
use crate::error::Result;
use crate::llm::ModelClient;
use crate::ocr::TextExtractor;
use crate::prompt::{self, ASSISTANT_NAME};
use crate::ratelimit::{RateDecision, RateLimiter};
use crate::transcript::{TRANSCRIPT_CAP, TranscriptStore};
use crate::InboundMessage;
use std::sync::Arc;
use std::time::Instant;

const GENERATION_FAILURE_NOTICE: &str =
    "Something went wrong while generating a reply. Please try again later.";

/// Delivery seam for outbound messages. One call per chunk.
#[async_trait::async_trait]
pub trait Responder: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

/// How a turn ended. Early exits are expected control flow, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Reply generated, persisted, and sent.
    Completed,
    /// Sender is the bot itself; dropped before anything else.
    OwnMessage,
    /// Message arrived outside the allowed channel; dropped silently.
    WrongChannel,
    /// Sender is still cooling down; a notice was sent, nothing persisted.
    RateLimited { retry_after_secs: u64 },
}

/// Per-process pipeline state. All mutable state (rate-limit map, credential
/// index, per-user transcript locks) lives inside the injected components.
pub struct TurnPipeline {
    allowed_channel_id: u64,
    rate_limiter: RateLimiter,
    transcripts: TranscriptStore,
    extractor: Arc<dyn TextExtractor>,
    model: Arc<dyn ModelClient>,
    max_chunk_len: usize,
}

impl TurnPipeline {
    pub fn new(
        allowed_channel_id: u64,
        rate_limiter: RateLimiter,
        transcripts: TranscriptStore,
        extractor: Arc<dyn TextExtractor>,
        model: Arc<dyn ModelClient>,
    ) -> Self {
        Self {
            allowed_channel_id,
            rate_limiter,
            transcripts,
            extractor,
            model,
            max_chunk_len: chunker::MAX_CHUNK_LEN,
        }
    }

    /// Run one full turn for an inbound message.
    pub async fn handle_message(
        &self,
        message: &InboundMessage,
        responder: &dyn Responder,
    ) -> Result<TurnOutcome> {
        if message.is_own {
            return Ok(TurnOutcome::OwnMessage);
        }
        if message.channel_id != self.allowed_channel_id {
            return Ok(TurnOutcome::WrongChannel);
        }

        if let RateDecision::Limited { retry_after_secs } = self
            .rate_limiter
            .check_and_record(message.author_id, Instant::now())
        {
            responder
                .send(&format!(
                    "You're sending messages too quickly! Please wait \
                     {retry_after_secs} seconds before trying again."
                ))
                .await?;
            return Ok(TurnOutcome::RateLimited { retry_after_secs });
        }

        // Single writer per user for the rest of the turn.
        let _guard = self.transcripts.lock_user(message.author_id).await;

        let history = self.transcripts.read(message.author_id).await?;
        self.transcripts
            .append_line(
                message.author_id,
                &format!("{}: {}", message.author_name, message.text),
            )
            .await?;

        let mut extracted = Vec::new();
        for attachment in &message.attachments {
            if !self.extractor.supports(&attachment.filename) {
                continue;
            }
            match self.extractor.extract(attachment).await {
                Ok(text) => extracted.push(text),
                Err(error) => {
                    tracing::warn!(
                        filename = %attachment.filename,
                        %error,
                        "attachment extraction failed, skipping"
                    );
                }
            }
        }

        let prompt = prompt::build(&message.author_name, &history, &message.text, &extracted);

        let reply = match self.model.generate(&prompt).await {
            Ok(reply) => reply,
            Err(error) => {
                // Abort: no assistant line, the user line stays unanswered.
                let _ = responder.send(GENERATION_FAILURE_NOTICE).await;
                return Err(error.into());
            }
        };

        self.transcripts
            .append_line(message.author_id, &format!("{ASSISTANT_NAME}: {reply}"))
            .await?;

        for chunk in chunker::split_chunks(&reply, self.max_chunk_len) {
            responder.send(&chunk).await?;
        }

        self.transcripts
            .truncate_to_last(message.author_id, TRANSCRIPT_CAP)
            .await?;

        Ok(TurnOutcome::Completed)
    }
}

//! Discord adapter: serenity events in, pipeline turns out.

use crate::error::Result;
use crate::pipeline::{Responder, TurnPipeline};
use crate::{Attachment, InboundMessage};
use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::sync::Arc;

struct Handler {
    pipeline: Arc<TurnPipeline>,
}

/// Sends pipeline output back to the channel the message came from.
struct DiscordResponder {
    http: Arc<serenity::http::Http>,
    channel_id: serenity::model::id::ChannelId,
}

#[async_trait]
impl Responder for DiscordResponder {
    async fn send(&self, text: &str) -> Result<()> {
        self.channel_id.say(&self.http, text).await?;
        Ok(())
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        tracing::info!(user = %ready.user.name, "connected to discord");
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let is_own = msg.author.id == ctx.cache.current_user().id;
        let inbound = InboundMessage {
            author_id: msg.author.id.get(),
            author_name: msg.author.name.clone(),
            channel_id: msg.channel_id.get(),
            text: msg.content.clone(),
            attachments: msg
                .attachments
                .iter()
                .map(|attachment| Attachment {
                    filename: attachment.filename.clone(),
                    url: attachment.url.clone(),
                })
                .collect(),
            is_own,
        };
        let responder = DiscordResponder {
            http: ctx.http.clone(),
            channel_id: msg.channel_id,
        };

        match self.pipeline.handle_message(&inbound, &responder).await {
            Ok(outcome) => {
                tracing::debug!(author = %inbound.author_name, ?outcome, "turn finished");
            }
            Err(error) => {
                tracing::error!(author = %inbound.author_name, %error, "message turn failed");
            }
        }
    }
}

/// Connect to the Discord gateway and dispatch messages into the pipeline
/// until the connection ends.
pub async fn run(token: &str, pipeline: Arc<TurnPipeline>) -> Result<()> {
    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(token, intents)
        .event_handler(Handler { pipeline })
        .await?;

    client.start().await?;
    Ok(())
}

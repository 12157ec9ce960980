//! Delivery of results back through the chat transport.

use crate::Error;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// Discord rejects messages above 2000 characters.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;
/// Default chunk size, kept below the hard limit as a safety margin.
pub const DEFAULT_CHUNK_LIMIT: usize = 1900;

/// Where a response goes. One instance is bound to one reply target.
#[async_trait]
pub trait Outbound: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<(), Error>;

    async fn send_attachment(&self, payload: Vec<u8>, filename: &str) -> Result<(), Error>;

    async fn indicate_typing(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// Split `text` into consecutive pieces of at most `limit` characters.
pub fn split_chunks(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for c in text.chars() {
        if count == limit {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(c);
        count += 1;
    }
    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Send `text`, split into ordered chunks when it exceeds `limit`.
/// Chunks are sent one after another; returns how many were sent.
pub async fn dispatch_text(out: &dyn Outbound, text: &str, limit: usize) -> Result<usize, Error> {
    let chunks = split_chunks(text, limit);
    let total = chunks.len();
    for (i, chunk) in chunks.iter().enumerate() {
        out.send_text(chunk).await?;
        if total > 1 {
            tracing::debug!("Sent part {}/{} of the response", i + 1, total);
        }
    }
    Ok(total)
}

/// Replies to a message in its channel.
pub struct ChannelReply {
    http: Arc<serenity::Http>,
    channel_id: serenity::ChannelId,
    reply_to: Option<serenity::MessageId>,
}

impl ChannelReply {
    pub fn new(
        http: Arc<serenity::Http>,
        channel_id: serenity::ChannelId,
        reply_to: Option<serenity::MessageId>,
    ) -> Self {
        Self {
            http,
            channel_id,
            reply_to,
        }
    }

    fn builder(&self) -> serenity::CreateMessage {
        let builder = serenity::CreateMessage::new();
        match self.reply_to {
            Some(message_id) => builder.reference_message((self.channel_id, message_id)),
            None => builder,
        }
    }
}

#[async_trait]
impl Outbound for ChannelReply {
    async fn send_text(&self, text: &str) -> Result<(), Error> {
        self.channel_id
            .send_message(&self.http, self.builder().content(text))
            .await?;
        Ok(())
    }

    async fn send_attachment(&self, payload: Vec<u8>, filename: &str) -> Result<(), Error> {
        let attachment = serenity::CreateAttachment::bytes(payload, filename);
        self.channel_id
            .send_message(&self.http, self.builder().add_file(attachment))
            .await?;
        Ok(())
    }

    async fn indicate_typing(&self) -> Result<(), Error> {
        self.channel_id.broadcast_typing(&self.http).await?;
        Ok(())
    }
}

/// Replies to the invoking command, prefix or slash.
pub struct CommandReply<'a> {
    ctx: crate::Context<'a>,
}

impl<'a> CommandReply<'a> {
    pub fn new(ctx: crate::Context<'a>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Outbound for CommandReply<'_> {
    async fn send_text(&self, text: &str) -> Result<(), Error> {
        self.ctx.say(text).await?;
        Ok(())
    }

    async fn send_attachment(&self, payload: Vec<u8>, filename: &str) -> Result<(), Error> {
        let attachment = serenity::CreateAttachment::bytes(payload, filename);
        self.ctx
            .send(poise::CreateReply::default().attachment(attachment))
            .await?;
        Ok(())
    }

    async fn indicate_typing(&self) -> Result<(), Error> {
        self.ctx.defer().await?;
        Ok(())
    }
}

use crate::activation::InboundMessage;
use crate::dispatch::ChannelReply;
use crate::{Data, Error};
use poise::serenity_prelude as serenity;
use tracing::error;

/// Handle a gateway message event: activation, generation and reply.
pub async fn handle_message(
    ctx: &serenity::Context,
    new_message: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    let inbound = inbound_from(new_message, channel_label(ctx, new_message));
    let out = ChannelReply::new(ctx.http.clone(), new_message.channel_id, Some(new_message.id));

    if let Err(e) = data.responder.handle_message(&inbound, &out).await {
        error!(
            "Failed to reply to user {} in {}: {}",
            inbound.author_id, inbound.channel_label, e
        );
        return Err(e);
    }
    Ok(())
}

pub fn inbound_from(message: &serenity::Message, channel_label: String) -> InboundMessage {
    InboundMessage {
        author_id: message.author.id.get(),
        author_is_bot: message.author.bot,
        content: message.content.clone(),
        mentioned_ids: message.mentions.iter().map(|user| user.id.get()).collect(),
        replied_to_author_id: message
            .referenced_message
            .as_deref()
            .map(|referenced| referenced.author.id.get()),
        channel_id: message.channel_id.get(),
        message_id: message.id.get(),
        channel_label,
    }
}

/// Readable channel name for log lines. Falls back to the raw id when uncached.
fn channel_label(ctx: &serenity::Context, message: &serenity::Message) -> String {
    if message.guild_id.is_none() {
        return "Direct Message".to_string();
    }

    match ctx.cache.channel(message.channel_id) {
        Some(channel) => match channel.kind {
            serenity::ChannelType::PublicThread
            | serenity::ChannelType::PrivateThread
            | serenity::ChannelType::NewsThread => format!("Thread: {}", channel.name),
            _ => format!("#{}", channel.name),
        },
        None => format!("channel {}", message.channel_id),
    }
}

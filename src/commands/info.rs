use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use tracing::info;

/// Permissions requested by the invite link.
pub fn invite_permissions() -> serenity::Permissions {
    serenity::Permissions::VIEW_CHANNEL
        | serenity::Permissions::SEND_MESSAGES
        | serenity::Permissions::EMBED_LINKS
        | serenity::Permissions::ATTACH_FILES
        | serenity::Permissions::READ_MESSAGE_HISTORY
}

pub fn invite_url(client_id: u64) -> String {
    format!(
        "https://discord.com/oauth2/authorize?client_id={}&permissions={}&scope=bot%20applications.commands",
        client_id,
        invite_permissions().bits()
    )
}

pub fn help_text(prefix: &str, wake_word: &str) -> String {
    format!(
        "**Available commands:**\n\
         `{p}help` - Show this message.\n\
         `{p}config [temperature] [top_p] [top_k] [max_tokens]` - Show or change the model parameters (administrators).\n\
         `{p}logs [lines]` - Show the latest log lines (administrators).\n\
         `{p}invite` - Get a link to add the bot to another server.\n\
         `{p}image <prompt>` - Generate an image from a description.\n\n\
         To ask a question, mention me, reply to one of my messages, or start with `{w},`.",
        p = prefix,
        w = wake_word
    )
}

/// Get a link to add the bot to another server
#[poise::command(prefix_command, slash_command, aliases("convite"))]
pub async fn invite(ctx: Context<'_>) -> Result<(), Error> {
    let url = invite_url(ctx.data().bot_id);
    ctx.say(format!("🔗 Add me to your server: <{}>", url)).await?;
    Ok(())
}

/// List the available commands
#[poise::command(prefix_command, slash_command, aliases("ajuda"))]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let config = &ctx.data().config;
    ctx.say(help_text(&config.command_prefix, &config.wake_word))
        .await?;
    info!("Help requested by {}", ctx.author().name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_url_carries_client_id_and_permissions() {
        let url = invite_url(1234567890);
        assert!(url.starts_with("https://discord.com/oauth2/authorize?client_id=1234567890&"));
        assert!(url.contains("permissions=117760"));
        assert!(url.ends_with("scope=bot%20applications.commands"));
    }

    #[test]
    fn help_uses_prefix_and_wake_word() {
        let text = help_text("?", "samer");
        assert!(text.contains("`?config [temperature]"));
        assert!(text.contains("`?image <prompt>`"));
        assert!(text.contains("`samer,`"));
    }
}

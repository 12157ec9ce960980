pub mod admin;
pub mod image;
pub mod info;
pub mod settings;

use crate::{Data, Error};
use tracing::error;

pub const MISSING_PERMISSIONS: &str = "❌ You don't have permission to run this command.";
pub const INVALID_ARGUMENT: &str = "❌ Invalid argument.";
pub const COMMAND_FAILED: &str = "❌ Something went wrong while running the command.";

/// Every command registered with the framework.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        settings::config(),
        admin::logs(),
        image::image(),
        info::invite(),
        info::help(),
    ]
}

/// Framework error hook: fixed replies for users, details only in the log.
pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(
                "Command {} failed for user {} in channel {}: {}",
                ctx.command().qualified_name,
                ctx.author().id,
                ctx.channel_id(),
                error
            );
            if let Err(e) = ctx.say(COMMAND_FAILED).await {
                error!("Could not report command failure: {}", e);
            }
        }
        poise::FrameworkError::MissingUserPermissions { ctx, .. } => {
            if let Err(e) = ctx.say(MISSING_PERMISSIONS).await {
                error!("Could not report missing permissions: {}", e);
            }
        }
        poise::FrameworkError::ArgumentParse { ctx, input, .. } => {
            tracing::warn!(
                "Bad argument for {} from user {}: {:?}",
                ctx.command().qualified_name,
                ctx.author().id,
                input
            );
            if let Err(e) = ctx.say(INVALID_ARGUMENT).await {
                error!("Could not report invalid argument: {}", e);
            }
        }
        poise::FrameworkError::UnknownCommand {
            ctx, msg, prefix, ..
        } => {
            let reply = format!(
                "❌ Command not found. Use `{}help` to see the available commands.",
                prefix
            );
            if let Err(e) = msg.reply(ctx, reply).await {
                error!("Could not report unknown command: {}", e);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

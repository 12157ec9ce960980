use crate::dispatch::{dispatch_text, CommandReply};
use crate::logging::tail_lines;
use crate::{Context, Error};
use std::io;
use tracing::info;

pub const DEFAULT_LOG_LINES: u32 = 10;
pub const MAX_LOG_LINES: u32 = 200;

/// Show the latest lines of the bot log (administrators)
#[poise::command(
    prefix_command,
    slash_command,
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn logs(
    ctx: Context<'_>,
    #[description = "How many lines to show (default 10)"] lines: Option<u32>,
) -> Result<(), Error> {
    let count = lines.unwrap_or(DEFAULT_LOG_LINES).clamp(1, MAX_LOG_LINES);

    let latest = match tail_lines(&ctx.data().config.log_file, count as usize) {
        Ok(latest) => latest,
        Err(e) if e.kind() == io::ErrorKind::NotFound => vec!["Log file not found.".to_string()],
        Err(e) => return Err(e.into()),
    };

    let out = CommandReply::new(ctx);
    dispatch_text(&out, &log_block(&latest), ctx.data().responder.chunk_limit()).await?;

    info!("Logs shown to {}", ctx.author().name);
    Ok(())
}

fn log_block(lines: &[String]) -> String {
    format!("```\n{}\n```", lines.concat())
}

use crate::generation::ConfigUpdate;
use crate::{Context, Error};
use tracing::{info, warn};

/// Show or change the text generation parameters (administrators)
#[poise::command(
    prefix_command,
    slash_command,
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn config(
    ctx: Context<'_>,
    #[description = "Sampling temperature (0 to 1)"] temperature: Option<f32>,
    #[description = "Nucleus sampling probability (0 to 1)"] top_p: Option<f32>,
    #[description = "Top-k sampling (1 to 1000)"] top_k: Option<i64>,
    #[description = "Maximum output tokens (1 to 8192)"] max_tokens: Option<i64>,
) -> Result<(), Error> {
    let update = ConfigUpdate {
        temperature,
        top_p,
        top_k,
        max_output_tokens: max_tokens,
    };
    let settings = ctx.data().responder.settings();

    if update.is_empty() {
        ctx.say(format!("Current generation config: {}", settings.snapshot()))
            .await?;
        return Ok(());
    }

    match settings.apply(&update) {
        Ok((previous, current)) => {
            info!(
                "Generation config changed from [{}] to [{}] | User: {}",
                previous,
                current,
                ctx.author().name
            );
            ctx.say(format!("✅ Generation config updated: {}", current))
                .await?;
        }
        Err(e) => {
            warn!("Rejected generation config ({}) | User: {}", e, ctx.author().name);
            ctx.say(format!("❌ {}. Nothing was changed.", e)).await?;
        }
    }

    Ok(())
}

use crate::dispatch::CommandReply;
use crate::{Context, Error};

/// Generate an image from a text description
#[poise::command(prefix_command, slash_command, aliases("imagem"))]
pub async fn image(
    ctx: Context<'_>,
    #[description = "What the image should show"]
    #[rest]
    prompt: String,
) -> Result<(), Error> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        ctx.say("❌ Describe the image you want, e.g. `image a courthouse at dawn`.")
            .await?;
        return Ok(());
    }

    let channel = format!("channel {}", ctx.channel_id());
    ctx.data()
        .responder
        .handle_image(ctx.author().id.get(), &channel, prompt, &CommandReply::new(ctx))
        .await
}

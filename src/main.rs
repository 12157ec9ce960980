use poise::serenity_prelude as serenity;
use samer::{commands, config::Config, mention, Data, Error};
use tracing::{debug, error, info};

async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::Message { new_message } = event {
        mention::handle_message(ctx, new_message, data).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing credentials stop the process here
    let config = Config::from_env()?;
    samer::logging::init(&config)?;
    debug!("Loaded configuration: {:?}", config);

    let discord_token = config.discord_token.clone();
    let prefix = config.command_prefix.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(prefix),
                case_insensitive_commands: true,
                ..Default::default()
            },
            on_error: |error| Box::pin(commands::on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!(
                    "{} is online and connected to {} servers",
                    ready.user.name,
                    ready.guilds.len()
                );
                if config.register_commands {
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                    info!("Registered {} commands globally", framework.options().commands.len());
                }

                ctx.set_activity(Some(serenity::ActivityData::watching(&config.status_message)));

                Ok(Data::new(config, ready.user.id.get()))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES;

    let mut client = serenity::ClientBuilder::new(&discord_token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    Ok(())
}

pub mod activation;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod generation;
pub mod llm;
pub mod logging;
pub mod mention;
pub mod prompt;
pub mod responder;
pub mod session;

use config::{Config, TextBackend};
use std::sync::Arc;
use std::time::Duration;

/// Custom data passed to all commands
pub struct Data {
    pub config: Config,
    pub responder: responder::Responder,
    /// Bot's own user ID, used for mention detection and the invite link
    pub bot_id: u64,
}

impl Data {
    pub fn new(config: Config, bot_id: u64) -> Self {
        let text: Arc<dyn llm::TextGenerator> = match config.text_backend {
            TextBackend::Gemini => Arc::new(llm::GeminiClient::new(
                &config.ai_api_key,
                &config.text_api_base,
                &config.text_model,
                Duration::from_secs(config.llm_timeout_secs),
            )),
            TextBackend::OpenAi => Arc::new(llm::OpenAiClient::new(
                &config.ai_api_key,
                &config.text_api_base,
                &config.text_model,
                Duration::from_secs(config.llm_timeout_secs),
            )),
        };
        let image = Arc::new(llm::HuggingFaceClient::new(
            &config.image_api_token,
            &config.image_api_base,
            &config.image_model,
            Duration::from_secs(config.image_timeout_secs),
        ));

        let mut responder = responder::Responder::new(
            activation::ActivationFilter::new(bot_id, &config.wake_word, &config.command_prefix),
            config.system_prompt.clone(),
            config.message_chunk_limit,
            generation::GenerationSettings::default(),
            text,
            image,
        );
        if config.session_memory {
            responder = responder.with_sessions(session::SessionStore::new(
                config.session_max_users,
                config.session_max_turns,
            ));
        }

        Self {
            config,
            responder,
            bot_id,
        }
    }
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

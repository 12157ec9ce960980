use crate::dispatch::{DEFAULT_CHUNK_LIMIT, DISCORD_MESSAGE_LIMIT};
use crate::llm;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBackend {
    Gemini,
    OpenAi,
}

impl FromStr for TextBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(TextBackend::Gemini),
            "openai" => Ok(TextBackend::OpenAi),
            other => Err(anyhow::anyhow!(
                "TEXT_BACKEND must be `gemini` or `openai`, got `{}`",
                other
            )),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub ai_api_key: String,
    pub image_api_token: String,
    pub text_backend: TextBackend,
    pub text_model: String,
    pub text_api_base: String,
    pub image_model: String,
    pub image_api_base: String,
    pub system_prompt: String,
    pub wake_word: String,
    pub command_prefix: String,
    pub message_chunk_limit: usize,
    pub status_message: String,
    pub register_commands: bool,

    // Logging
    pub log_file: String,
    pub log_max_bytes: u64,
    pub log_backups: usize,

    // Timeouts
    pub llm_timeout_secs: u64,
    pub image_timeout_secs: u64,

    // Conversational memory
    pub session_memory: bool,
    pub session_max_users: usize,
    pub session_max_turns: usize,
}

const DEFAULT_SYSTEM_PROMPT: &str = "\
<identity>
You are Samer, a retired judge who helps students prepare for public-service \
examinations, with broad knowledge across every area of law.
</identity>
<context>
You give precise, verified answers on legal topics. Your goal is to make complex \
concepts simple and approachable.
</context>
<task>
Answer questions about law clearly and concisely, avoid speculation and keep a \
friendly tone.
</task>
<constraints>
- Only talk about topics you know.
- Avoid generic or unverified answers.
- Respect privacy and the confidentiality of information.
</constraints>";

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("{} must be set", key))
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        let text_backend: TextBackend = match env::var("TEXT_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => TextBackend::Gemini,
        };
        let (default_base, default_model) = match text_backend {
            TextBackend::Gemini => (llm::gemini::DEFAULT_API_BASE, llm::gemini::DEFAULT_MODEL),
            TextBackend::OpenAi => (llm::client::DEFAULT_API_BASE, llm::client::DEFAULT_MODEL),
        };

        Ok(Config {
            discord_token: required("DISCORD_TOKEN")?,
            ai_api_key: required("AI_API_KEY")
                .or_else(|_| required("GOOGLE_API_KEY"))
                .map_err(|_| anyhow::anyhow!("GOOGLE_API_KEY (or AI_API_KEY) must be set"))?,
            image_api_token: required("HF_API_TOKEN")?,
            text_backend,
            text_model: env::var("TEXT_MODEL").unwrap_or_else(|_| default_model.to_string()),
            text_api_base: env::var("TEXT_API_BASE").unwrap_or_else(|_| default_base.to_string()),
            image_model: env::var("IMAGE_MODEL")
                .unwrap_or_else(|_| llm::image::DEFAULT_MODEL.to_string()),
            image_api_base: env::var("IMAGE_API_BASE")
                .unwrap_or_else(|_| llm::image::DEFAULT_API_BASE.to_string()),
            system_prompt: env::var("SYSTEM_PROMPT")
                .unwrap_or_else(|_| DEFAULT_SYSTEM_PROMPT.to_string()),
            wake_word: env::var("WAKE_WORD")
                .unwrap_or_else(|_| "samer".to_string())
                .trim()
                .to_lowercase(),
            command_prefix: env::var("COMMAND_PREFIX").unwrap_or_else(|_| "!".to_string()),
            message_chunk_limit: env_or("MESSAGE_CHUNK_LIMIT", DEFAULT_CHUNK_LIMIT)
                .clamp(1, DISCORD_MESSAGE_LIMIT),
            status_message: env::var("STATUS_MESSAGE")
                .unwrap_or_else(|_| "your messages".to_string()),
            register_commands: env_or("REGISTER_COMMANDS", false),

            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "bot.log".to_string()),
            log_max_bytes: env_or("LOG_MAX_BYTES", 5 * 1024 * 1024),
            log_backups: env_or("LOG_BACKUPS", 5),

            llm_timeout_secs: env_or("LLM_TIMEOUT_SECS", 120),
            image_timeout_secs: env_or("IMAGE_TIMEOUT_SECS", 180),

            session_memory: env_or("SESSION_MEMORY", false),
            session_max_users: env_or("SESSION_MAX_USERS", 500),
            session_max_turns: env_or("SESSION_MAX_TURNS", 10),
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("ai_api_key", &"[REDACTED]")
            .field("image_api_token", &"[REDACTED]")
            .field("text_backend", &self.text_backend)
            .field("text_model", &self.text_model)
            .field("text_api_base", &self.text_api_base)
            .field("image_model", &self.image_model)
            .field("image_api_base", &self.image_api_base)
            .field("system_prompt", &self.system_prompt)
            .field("wake_word", &self.wake_word)
            .field("command_prefix", &self.command_prefix)
            .field("message_chunk_limit", &self.message_chunk_limit)
            .field("status_message", &self.status_message)
            .field("register_commands", &self.register_commands)
            .field("log_file", &self.log_file)
            .field("log_max_bytes", &self.log_max_bytes)
            .field("log_backups", &self.log_backups)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("image_timeout_secs", &self.image_timeout_secs)
            .field("session_memory", &self.session_memory)
            .field("session_max_users", &self.session_max_users)
            .field("session_max_turns", &self.session_max_turns)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    // Environment variables are process-global, so everything runs in one test.
    #[test]
    fn test_config_logic() {
        for key in [
            "DISCORD_TOKEN",
            "AI_API_KEY",
            "GOOGLE_API_KEY",
            "HF_API_TOKEN",
            "TEXT_BACKEND",
            "WAKE_WORD",
            "MESSAGE_CHUNK_LIMIT",
        ] {
            env::remove_var(key);
        }

        // 1. Missing credentials are fatal
        assert!(Config::build().is_err(), "Should fail when credentials are missing");
        env::set_var("DISCORD_TOKEN", "test_token");
        env::set_var("GOOGLE_API_KEY", "secret_api_key");
        let err = Config::build().unwrap_err();
        assert!(err.to_string().contains("HF_API_TOKEN"));

        // 2. Defaults
        env::set_var("HF_API_TOKEN", "hf_secret");
        let config = Config::build().unwrap();
        assert_eq!(config.discord_token, "test_token");
        assert_eq!(config.ai_api_key, "secret_api_key");
        assert_eq!(config.text_backend, TextBackend::Gemini);
        assert_eq!(config.text_model, llm::gemini::DEFAULT_MODEL);
        assert_eq!(config.wake_word, "samer");
        assert_eq!(config.command_prefix, "!");
        assert_eq!(config.message_chunk_limit, 1900);
        assert!(!config.session_memory);

        // 3. Overrides and clamping
        env::set_var("TEXT_BACKEND", "OpenAI");
        env::set_var("WAKE_WORD", "  Samélio ");
        env::set_var("MESSAGE_CHUNK_LIMIT", "5000");
        let config = Config::build().unwrap();
        assert_eq!(config.text_backend, TextBackend::OpenAi);
        assert_eq!(config.text_api_base, llm::client::DEFAULT_API_BASE);
        assert_eq!(config.wake_word, "samélio");
        assert_eq!(config.message_chunk_limit, DISCORD_MESSAGE_LIMIT);

        env::set_var("TEXT_BACKEND", "llama");
        assert!(Config::build().is_err());
        env::remove_var("TEXT_BACKEND");

        // 4. Debug redaction
        let debug_output = format!("{:?}", Config::build().unwrap());
        assert!(!debug_output.contains("test_token"));
        assert!(!debug_output.contains("secret_api_key"));
        assert!(!debug_output.contains("hf_secret"));
        assert!(debug_output.contains("[REDACTED]"));

        // Cleanup
        for key in [
            "DISCORD_TOKEN",
            "GOOGLE_API_KEY",
            "HF_API_TOKEN",
            "WAKE_WORD",
            "MESSAGE_CHUNK_LIMIT",
        ] {
            env::remove_var(key);
        }
    }
}

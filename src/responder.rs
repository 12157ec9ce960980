//! Message routing and response dispatch.
//!
//! Flow for one inbound message: activation filter, prompt assembly, one backend
//! call, then chunked delivery. Backend problems never reach the user as raw
//! diagnostics; they become one of the fixed apology strings below.

use crate::activation::{Activation, ActivationFilter, InboundMessage, Trigger};
use crate::dispatch::{dispatch_text, Outbound};
use crate::generation::GenerationSettings;
use crate::llm::{Generation, ImageGenerator, TextGenerator};
use crate::prompt;
use crate::session::{SessionStore, Turn};
use crate::Error;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const EMPTY_REPLY: &str =
    "Sorry, I couldn't come up with an answer. Could you rephrase your question?";
pub const FAILED_REPLY: &str = "Sorry, something went wrong. Please try again.";
pub const EMPTY_IMAGE: &str = "Sorry, the image service returned nothing. Try a different prompt.";
pub const FAILED_IMAGE: &str = "Sorry, I couldn't generate that image. Please try again.";
pub const IMAGE_FILENAME: &str = "image.png";

/// What happened to an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    Ignored,
    Suppressed(Trigger),
    Replied { chunks: usize },
}

pub struct Responder {
    filter: ActivationFilter,
    system_prompt: String,
    chunk_limit: usize,
    settings: GenerationSettings,
    text: Arc<dyn TextGenerator>,
    image: Arc<dyn ImageGenerator>,
    sessions: Option<SessionStore>,
}

impl Responder {
    pub fn new(
        filter: ActivationFilter,
        system_prompt: impl Into<String>,
        chunk_limit: usize,
        settings: GenerationSettings,
        text: Arc<dyn TextGenerator>,
        image: Arc<dyn ImageGenerator>,
    ) -> Self {
        Self {
            filter,
            system_prompt: system_prompt.into(),
            chunk_limit: chunk_limit.max(1),
            settings,
            text,
            image,
            sessions: None,
        }
    }

    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn chunk_limit(&self) -> usize {
        self.chunk_limit
    }

    pub fn bot_id(&self) -> u64 {
        self.filter.bot_id()
    }

    pub async fn handle_message(
        &self,
        message: &InboundMessage,
        out: &dyn Outbound,
    ) -> Result<Handled, Error> {
        let (trigger, content) = match self.filter.evaluate(message) {
            Activation::Ignored(_) => return Ok(Handled::Ignored),
            Activation::Suppressed(trigger) => {
                debug!(
                    "Nothing to answer after stripping {:?} from message {} in {}",
                    trigger, message.message_id, message.channel_label
                );
                return Ok(Handled::Suppressed(trigger));
            }
            Activation::Respond { trigger, content } => (trigger, content),
        };

        info!(
            "Message received | Channel: {} | User: {} | Trigger: {:?}",
            message.channel_label, message.author_id, trigger
        );

        if let Err(e) = out.indicate_typing().await {
            debug!("Typing indicator failed in {}: {}", message.channel_label, e);
        }

        let reply = self
            .generate_reply(message.author_id, &message.channel_label, &content)
            .await;
        let chunks = dispatch_text(out, &reply, self.chunk_limit).await?;

        if chunks > 1 {
            info!("Reply sent in {} parts to user {}", chunks, message.author_id);
        } else {
            info!("Reply sent to user {}", message.author_id);
        }
        Ok(Handled::Replied { chunks })
    }

    /// Call the text backend and map the outcome to the text the user will see.
    pub async fn generate_reply(&self, user_id: u64, channel: &str, content: &str) -> String {
        let history = self
            .sessions
            .as_ref()
            .map(|s| s.history(user_id))
            .unwrap_or_default();
        let full_prompt = prompt::assemble_with_history(&self.system_prompt, &history, content);
        let config = self.settings.snapshot();

        info!("Processing message from user {}", user_id);
        match Generation::from_text(self.text.generate(&full_prompt, &config).await) {
            Generation::Success(text) => {
                info!("Response generated for user {}", user_id);
                if let Some(sessions) = &self.sessions {
                    sessions.record(
                        user_id,
                        Turn {
                            user: content.to_string(),
                            assistant: text.clone(),
                        },
                    );
                }
                text
            }
            Generation::Empty => {
                warn!("Empty response generated for user {} in {}", user_id, channel);
                EMPTY_REPLY.to_string()
            }
            Generation::Failed(e) => {
                error!(
                    "Text generation failed for user {} in {}: {:?}",
                    user_id, channel, e
                );
                FAILED_REPLY.to_string()
            }
        }
    }

    /// Generate an image for `prompt` and deliver it, or an apology.
    pub async fn handle_image(
        &self,
        user_id: u64,
        channel: &str,
        prompt: &str,
        out: &dyn Outbound,
    ) -> Result<(), Error> {
        if let Err(e) = out.indicate_typing().await {
            debug!("Typing indicator failed in {}: {}", channel, e);
        }

        info!("Image requested by user {} in {}", user_id, channel);
        match Generation::from_image(self.image.text_to_image(prompt).await) {
            Generation::Success(bytes) => {
                info!("Image generated for user {} ({} bytes)", user_id, bytes.len());
                out.send_attachment(bytes, IMAGE_FILENAME).await
            }
            Generation::Empty => {
                warn!("Empty image generated for user {} in {}", user_id, channel);
                out.send_text(EMPTY_IMAGE).await
            }
            Generation::Failed(e) => {
                error!(
                    "Image generation failed for user {} in {}: {:?}",
                    user_id, channel, e
                );
                out.send_text(FAILED_IMAGE).await
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::generation::GenerationConfig;
    use crate::llm::BackendError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    pub enum Scripted<T> {
        Ok(T),
        Empty,
        Fail,
    }

    /// Text backend returning a fixed outcome and remembering what it was asked.
    pub struct FakeText {
        pub reply: Scripted<String>,
        pub calls: Mutex<Vec<(String, GenerationConfig)>>,
    }

    impl FakeText {
        pub fn new(reply: Scripted<String>) -> Self {
            Self {
                reply,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn prompts(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
        }
    }

    #[async_trait]
    impl TextGenerator for FakeText {
        async fn generate(
            &self,
            prompt: &str,
            config: &GenerationConfig,
        ) -> Result<Option<String>, BackendError> {
            self.calls.lock().unwrap().push((prompt.to_string(), *config));
            match &self.reply {
                Scripted::Ok(text) => Ok(Some(text.clone())),
                Scripted::Empty => Ok(None),
                Scripted::Fail => Err(BackendError::Timeout(Duration::from_secs(30))),
            }
        }
    }

    pub struct FakeImage(pub Scripted<Vec<u8>>);

    #[async_trait]
    impl ImageGenerator for FakeImage {
        async fn text_to_image(&self, _prompt: &str) -> Result<Option<Vec<u8>>, BackendError> {
            match &self.0 {
                Scripted::Ok(bytes) => Ok(Some(bytes.clone())),
                Scripted::Empty => Ok(None),
                Scripted::Fail => Err(BackendError::Decode("quota exceeded".into())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{FakeImage, FakeText, Scripted};
    use super::*;
    use crate::dispatch::testing::{Recorder, Sent};
    use crate::generation::ConfigUpdate;

    const BOT: u64 = 42;
    const PERSONA: &str = "You are Samer.";

    fn responder(text: Arc<FakeText>, limit: usize) -> Responder {
        Responder::new(
            ActivationFilter::new(BOT, "samer", "!"),
            PERSONA,
            limit,
            GenerationSettings::default(),
            text,
            Arc::new(FakeImage(Scripted::Empty)),
        )
    }

    fn message(content: &str) -> InboundMessage {
        InboundMessage {
            author_id: 7,
            content: content.to_string(),
            channel_id: 1,
            message_id: 2,
            channel_label: "#law".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn wake_word_question_gets_a_single_reply() {
        let answer = "Due process guarantees a fair legal procedure.....";
        assert_eq!(answer.chars().count(), 50);
        let text = Arc::new(FakeText::new(Scripted::Ok(answer.to_string())));
        let responder = responder(text.clone(), 1900);
        let out = Recorder::default();

        let handled = responder
            .handle_message(&message("samer, what is due process?"), &out)
            .await
            .unwrap();

        assert_eq!(handled, Handled::Replied { chunks: 1 });
        assert_eq!(
            text.prompts(),
            vec![prompt::assemble(PERSONA, "what is due process?")]
        );
        assert_eq!(out.sent(), vec![Sent::Typing, Sent::Text(answer.to_string())]);
    }

    #[tokio::test]
    async fn backend_failure_becomes_apology() {
        let text = Arc::new(FakeText::new(Scripted::Fail));
        let responder = responder(text, 1900);
        let out = Recorder::default();

        let handled = responder
            .handle_message(&message("samer: hello"), &out)
            .await
            .unwrap();

        assert_eq!(handled, Handled::Replied { chunks: 1 });
        assert_eq!(out.texts(), vec![FAILED_REPLY]);
    }

    #[tokio::test]
    async fn empty_backend_result_becomes_apology() {
        let text = Arc::new(FakeText::new(Scripted::Ok("   ".to_string())));
        let responder = responder(text, 1900);
        let out = Recorder::default();

        responder
            .handle_message(&message("samer! hello"), &out)
            .await
            .unwrap();

        assert_eq!(out.texts(), vec![EMPTY_REPLY]);
    }

    #[tokio::test]
    async fn empty_content_has_no_side_effects() {
        let text = Arc::new(FakeText::new(Scripted::Ok("unused".to_string())));
        let responder = responder(text.clone(), 1900);
        let out = Recorder::default();
        let mut ping = message("<@42>");
        ping.mentioned_ids = vec![BOT];

        let handled = responder.handle_message(&ping, &out).await.unwrap();

        assert_eq!(handled, Handled::Suppressed(Trigger::Mention));
        assert!(text.prompts().is_empty());
        assert!(out.sent().is_empty());
    }

    #[tokio::test]
    async fn unaddressed_and_bot_messages_are_ignored() {
        let text = Arc::new(FakeText::new(Scripted::Ok("unused".to_string())));
        let responder = responder(text.clone(), 1900);
        let out = Recorder::default();

        let mut from_bot = message("samer, hi");
        from_bot.author_is_bot = true;
        assert_eq!(
            responder.handle_message(&from_bot, &out).await.unwrap(),
            Handled::Ignored
        );
        assert_eq!(
            responder
                .handle_message(&message("just chatting"), &out)
                .await
                .unwrap(),
            Handled::Ignored
        );
        assert!(text.prompts().is_empty());
        assert!(out.sent().is_empty());
    }

    #[tokio::test]
    async fn long_reply_is_chunked_in_order() {
        let answer = "0123456789".repeat(3);
        let text = Arc::new(FakeText::new(Scripted::Ok(answer.clone())));
        let responder = responder(text, 10);
        let out = Recorder::default();

        let handled = responder
            .handle_message(&message("samer, count"), &out)
            .await
            .unwrap();

        assert_eq!(handled, Handled::Replied { chunks: 3 });
        assert_eq!(out.texts().concat(), answer);
        assert!(out.texts().iter().all(|c| c == "0123456789"));
    }

    #[tokio::test]
    async fn generation_uses_current_settings() {
        let text = Arc::new(FakeText::new(Scripted::Ok("ok".to_string())));
        let responder = responder(text.clone(), 1900);
        responder
            .settings()
            .apply(&ConfigUpdate {
                temperature: Some(0.25),
                ..Default::default()
            })
            .unwrap();

        responder
            .handle_message(&message("samer, hi"), &Recorder::default())
            .await
            .unwrap();

        let calls = text.calls.lock().unwrap();
        assert_eq!(calls[0].1.temperature, 0.25);
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let text = Arc::new(FakeText::new(Scripted::Ok("ok".to_string())));
        let responder = responder(text, 1900);
        let out = Recorder {
            fail_sends: true,
            ..Default::default()
        };

        assert!(responder
            .handle_message(&message("samer, hi"), &out)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn sessions_replay_successful_turns() {
        let text = Arc::new(FakeText::new(Scripted::Ok("answer".to_string())));
        let responder = responder(text.clone(), 1900).with_sessions(SessionStore::new(10, 5));

        responder.generate_reply(7, "#law", "first").await;
        responder.generate_reply(7, "#law", "second").await;

        let prompts = text.prompts();
        assert_eq!(prompts[0], prompt::assemble(PERSONA, "first"));
        assert_eq!(
            prompts[1],
            format!("{PERSONA}\n\nUser: first\nAssistant: answer\n\nUser: second\nAssistant:")
        );
    }

    #[tokio::test]
    async fn image_outcomes() {
        let text = Arc::new(FakeText::new(Scripted::Empty));
        let cases = [
            (
                Scripted::Ok(vec![0x89, b'P', b'N', b'G']),
                Sent::Attachment {
                    len: 4,
                    filename: IMAGE_FILENAME.to_string(),
                },
            ),
            (Scripted::Empty, Sent::Text(EMPTY_IMAGE.to_string())),
            (Scripted::Fail, Sent::Text(FAILED_IMAGE.to_string())),
        ];

        for (outcome, expected) in cases {
            let responder = Responder::new(
                ActivationFilter::new(BOT, "samer", "!"),
                PERSONA,
                1900,
                GenerationSettings::default(),
                text.clone(),
                Arc::new(FakeImage(outcome)),
            );
            let out = Recorder::default();
            responder
                .handle_image(7, "#art", "a courthouse at dawn", &out)
                .await
                .unwrap();
            assert_eq!(out.sent(), vec![Sent::Typing, expected]);
        }
    }
}

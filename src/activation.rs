//! Decides whether an inbound message should get a reply, and what text to forward.

/// Characters that may directly follow the wake-word.
pub const WAKE_SEPARATORS: [char; 5] = [' ', ',', ':', '?', '!'];

/// Transport-independent view of an inbound chat message.
#[derive(Debug, Clone, Default)]
pub struct InboundMessage {
    pub author_id: u64,
    pub author_is_bot: bool,
    pub content: String,
    pub mentioned_ids: Vec<u64>,
    pub replied_to_author_id: Option<u64>,
    pub channel_id: u64,
    pub message_id: u64,
    /// Human-readable channel name, used for logging only.
    pub channel_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Mention,
    WakeWord,
    ReplyToBot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    FromBot,
    Command,
    NotAddressed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Ignored(IgnoreReason),
    /// Addressed to the bot, but nothing remained after stripping the trigger.
    Suppressed(Trigger),
    Respond { trigger: Trigger, content: String },
}

impl Activation {
    pub fn should_respond(&self) -> bool {
        matches!(self, Activation::Respond { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ActivationFilter {
    bot_id: u64,
    wake_word: String,
    command_prefix: String,
}

impl ActivationFilter {
    pub fn new(bot_id: u64, wake_word: &str, command_prefix: &str) -> Self {
        Self {
            bot_id,
            wake_word: wake_word.trim().to_lowercase(),
            command_prefix: command_prefix.to_string(),
        }
    }

    pub fn bot_id(&self) -> u64 {
        self.bot_id
    }

    /// Rules are checked in order and the first match wins.
    pub fn evaluate(&self, message: &InboundMessage) -> Activation {
        if message.author_is_bot || message.author_id == self.bot_id {
            return Activation::Ignored(IgnoreReason::FromBot);
        }
        if !self.command_prefix.is_empty() && message.content.starts_with(&self.command_prefix) {
            return Activation::Ignored(IgnoreReason::Command);
        }

        let trigger = if message.mentioned_ids.contains(&self.bot_id) {
            Trigger::Mention
        } else if strip_wake_word(&message.content, &self.wake_word).is_some() {
            Trigger::WakeWord
        } else if message.replied_to_author_id == Some(self.bot_id) {
            Trigger::ReplyToBot
        } else {
            return Activation::Ignored(IgnoreReason::NotAddressed);
        };

        let content = self.clean(&message.content);
        if content.is_empty() {
            Activation::Suppressed(trigger)
        } else {
            Activation::Respond { trigger, content }
        }
    }

    fn clean(&self, content: &str) -> String {
        let stripped = strip_bot_mentions(content, self.bot_id);
        match strip_wake_word(&stripped, &self.wake_word) {
            Some(rest) => rest.trim().to_string(),
            None => stripped,
        }
    }
}

pub fn strip_bot_mentions(input: &str, bot_id: u64) -> String {
    let mention = format!("<@{}>", bot_id);
    let mention_nick = format!("<@!{}>", bot_id);

    input
        .replace(&mention, "")
        .replace(&mention_nick, "")
        .trim()
        .to_string()
}

/// If `input` (after leading whitespace) starts with `wake_word` in any case,
/// immediately followed by one separator, return the text after that separator.
/// `wake_word` must already be lower case.
pub fn strip_wake_word<'a>(input: &'a str, wake_word: &str) -> Option<&'a str> {
    if wake_word.is_empty() {
        return None;
    }

    let input = input.trim_start();
    let mut chars = input.char_indices();
    let mut prefix = String::with_capacity(wake_word.len());
    for _ in 0..wake_word.chars().count() {
        let (_, c) = chars.next()?;
        prefix.push(c);
    }
    if prefix.to_lowercase() != wake_word {
        return None;
    }

    let (idx, separator) = chars.next()?;
    if !WAKE_SEPARATORS.contains(&separator) {
        return None;
    }
    Some(&input[idx + separator.len_utf8()..])
}

use crate::session::Turn;

/// Build the text sent to the generation backend.
pub fn assemble(system_prompt: &str, user_text: &str) -> String {
    format!("{}\n\nUser: {}\nAssistant:", system_prompt, user_text)
}

/// Same as [`assemble`], with prior turns replayed between the persona and the new message.
pub fn assemble_with_history(system_prompt: &str, history: &[Turn], user_text: &str) -> String {
    let mut prompt = String::from(system_prompt);
    for turn in history {
        prompt.push_str("\n\nUser: ");
        prompt.push_str(&turn.user);
        prompt.push_str("\nAssistant: ");
        prompt.push_str(&turn.assistant);
    }
    prompt.push_str("\n\nUser: ");
    prompt.push_str(user_text);
    prompt.push_str("\nAssistant:");
    prompt
}

//! Outbound request construction

use super::{ConversationHistory, PendingAttachment, Persona, UserMemory};
use crate::llm::{Content, GenerateRequest, GenerationConfig, Part};

/// The turn being sent right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingTurn {
    pub text: String,
    pub attachment: Option<PendingAttachment>,
}

/// Text shown in the history for the user's turn
pub fn display_text(text: &str, attachment: Option<&PendingAttachment>) -> String {
    match attachment {
        Some(a) if text.is_empty() => format!("File: {}", a.file_name),
        Some(a) => format!("{text} (File: {})", a.file_name),
        None => text.to_string(),
    }
}

/// Persona instruction plus any remembered facts
pub fn system_preamble(persona: Persona, memory: &UserMemory) -> String {
    match memory.describe() {
        Some(facts) => format!("{}\n\n{facts}", persona.system_instruction()),
        None => persona.system_instruction().to_string(),
    }
}

/// Build the provider body: prior turns, then the outgoing turn.
///
/// The preamble goes in front of the first user turn only. With an empty
/// history that is the outgoing turn itself.
pub fn build_request(
    history: &ConversationHistory,
    persona: Persona,
    memory: &UserMemory,
    turn: &OutgoingTurn,
) -> GenerateRequest {
    let preamble = system_preamble(persona, memory);

    let mut parts = Vec::new();
    if !turn.text.is_empty() {
        parts.push(Part::text(turn.text.clone()));
    }
    if let Some(attachment) = &turn.attachment {
        parts.push(attachment.to_inline_part());
    }
    let mut current = Content::user(parts);

    let mut contents = history.to_api_turns();
    match contents.iter_mut().find(|c| c.is_user()) {
        Some(first_user) => prepend_text(first_user, &preamble),
        None => prepend_text(&mut current, &preamble),
    }
    contents.push(current);

    GenerateRequest {
        contents,
        generation_config: GenerationConfig::default(),
    }
}

fn prepend_text(content: &mut Content, preamble: &str) {
    for part in &mut content.parts {
        if let Part::Text { text } = part {
            *text = format!("{preamble}\n\n{text}");
            return;
        }
    }
    content.parts.insert(0, Part::text(preamble));
}

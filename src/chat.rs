//! Chat domain: messages, personas, user memory, attachments
//!
//! Everything here is plain data and pure functions; the runtime owns the
//! single `AppState` instance and performs all I/O.

mod attachment;
mod memory;
mod message;
mod persona;
mod request;

pub use attachment::{is_supported_media_type, AttachmentError, PendingAttachment};
pub use memory::{extract_fact, Fact, UserMemory};
pub use message::{ConversationHistory, Message, Sender};
pub use persona::Persona;
pub use request::{build_request, display_text, system_preamble, OutgoingTurn};

/// Input the user is composing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
    pub attachment: Option<PendingAttachment>,
}

impl Draft {
    pub fn clear(&mut self) {
        self.text.clear();
        self.attachment = None;
    }
}

/// Application state owned by the chat runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub history: ConversationHistory,
    pub persona: Persona,
    pub memory: UserMemory,
    pub dark_mode: bool,
    pub draft: Draft,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            history: ConversationHistory::new(),
            persona: Persona::Default,
            memory: UserMemory::default(),
            dark_mode: true,
            draft: Draft::default(),
        }
    }
}

//! Request coordinator state

use crate::reveal::RevealBuffer;

/// Lifecycle of the (at most one) outstanding request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChatState {
    /// Ready for user input, no pending operations
    #[default]
    Idle,

    /// Provider call in flight
    Sending {
        request_id: u64,
        /// Trimmed text the user sent, kept for fact extraction
        user_text: String,
    },

    /// Reply received, reveal animation running
    Revealing {
        request_id: u64,
        buffer: RevealBuffer,
    },
}

/// Coarse status for renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Sending,
    Revealing,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::Sending => "sending",
            Status::Revealing => "revealing",
        }
    }
}

impl ChatState {
    pub fn status(&self) -> Status {
        match self {
            ChatState::Idle => Status::Idle,
            ChatState::Sending { .. } => Status::Sending,
            ChatState::Revealing { .. } => Status::Revealing,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, ChatState::Idle)
    }

    /// Request the state belongs to, if any
    pub fn request_id(&self) -> Option<u64> {
        match self {
            ChatState::Idle => None,
            ChatState::Sending { request_id, .. } | ChatState::Revealing { request_id, .. } => {
                Some(*request_id)
            }
        }
    }

    /// The in-progress display buffer
    pub fn revealed_text(&self) -> Option<&str> {
        match self {
            ChatState::Revealing { buffer, .. } => Some(buffer.revealed()),
            _ => None,
        }
    }
}

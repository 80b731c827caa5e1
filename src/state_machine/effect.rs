//! Effects produced by state transitions

use crate::chat::{Fact, OutgoingTurn};

/// Effects to be executed after state transition, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Snapshot history, persona and memory into a request and start the call.
    /// Emitted before the user's message is appended so the history holds
    /// prior turns only.
    RequestReply {
        request_id: u64,
        turn: OutgoingTurn,
    },

    /// Append the user's display message and persist history
    AppendUserMessage { text: String },

    /// Clear draft text and pending attachment
    ClearDraft,

    /// Abort the in-flight provider call
    AbortRequest,

    /// Start the reveal tick source
    StartReveal { request_id: u64 },

    /// Stop the reveal tick source
    StopReveal,

    /// Append the assistant message for the current request, at most once
    CommitReply { text: String },

    /// Merge a fact into user memory and persist it
    RememberFact(Fact),

    /// Tell subscribers the coordinator state changed
    NotifyStateChange,
}

impl Effect {
    pub fn commit_reply(text: impl Into<String>) -> Self {
        Effect::CommitReply { text: text.into() }
    }
}

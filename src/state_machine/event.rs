//! Events that drive the request coordinator

use crate::chat::PendingAttachment;
use crate::llm::Reply;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Send {
        /// Allocated by the runtime so the transition stays pure
        request_id: u64,
        text: String,
        attachment: Option<PendingAttachment>,
    },
    Cancel,

    // Provider events
    ReplyReceived {
        request_id: u64,
        reply: Reply,
    },
    RequestFailed {
        request_id: u64,
        message: String,
    },

    // Animator events
    RevealTick {
        request_id: u64,
    },
}

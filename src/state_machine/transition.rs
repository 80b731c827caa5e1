//! Pure state transition function
//!
//! Given the same state and event it always produces the same result, with no
//! I/O. Request ids make late provider replies and animator ticks from an
//! earlier request harmless: they fall through as no-ops.

use super::{ChatState, Effect, Event};
use crate::chat::{display_text, extract_fact, OutgoingTurn};
use crate::llm::ReplyKind;
use crate::reveal::RevealBuffer;
use thiserror::Error;

/// Prefix of the assistant message synthesized for transport failures
pub const TRANSPORT_ERROR_PREFIX: &str = "Error connecting to Muse";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Reasons a send is refused. Refusal changes nothing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A reply is already in progress (stop it first)")]
    Busy,
    #[error("Nothing to send")]
    EmptyMessage,
}

pub fn transition(state: &ChatState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Sending
        // ============================================================
        (
            ChatState::Idle,
            Event::Send {
                request_id,
                text,
                attachment,
            },
        ) => {
            let text = text.trim().to_string();
            if text.is_empty() && attachment.is_none() {
                return Err(TransitionError::EmptyMessage);
            }

            let display = display_text(&text, attachment.as_ref());
            Ok(TransitionResult::new(ChatState::Sending {
                request_id,
                user_text: text.clone(),
            })
            .with_effect(Effect::RequestReply {
                request_id,
                turn: OutgoingTurn { text, attachment },
            })
            .with_effect(Effect::AppendUserMessage { text: display })
            .with_effect(Effect::ClearDraft)
            .with_effect(Effect::NotifyStateChange))
        }

        (ChatState::Sending { .. } | ChatState::Revealing { .. }, Event::Send { .. }) => {
            Err(TransitionError::Busy)
        }

        // ============================================================
        // Provider outcome
        // ============================================================
        (
            ChatState::Sending {
                request_id,
                user_text,
            },
            Event::ReplyReceived {
                request_id: replied,
                reply,
            },
        ) if replied == *request_id => {
            let remembered = if reply.kind == ReplyKind::Answer {
                extract_fact(user_text).map(Effect::RememberFact)
            } else {
                None
            };

            Ok(TransitionResult::new(ChatState::Revealing {
                request_id: *request_id,
                buffer: RevealBuffer::new(reply.text),
            })
            .with_effects(remembered)
            .with_effect(Effect::StartReveal {
                request_id: *request_id,
            })
            .with_effect(Effect::NotifyStateChange))
        }

        (
            ChatState::Sending { request_id, .. },
            Event::RequestFailed {
                request_id: failed,
                message,
            },
        ) if failed == *request_id => Ok(TransitionResult::new(ChatState::Idle)
            .with_effect(Effect::commit_reply(format!(
                "{TRANSPORT_ERROR_PREFIX}: {message}"
            )))
            .with_effect(Effect::NotifyStateChange)),

        // ============================================================
        // Reveal
        // ============================================================
        (
            ChatState::Revealing { request_id, buffer },
            Event::RevealTick { request_id: ticked },
        ) if ticked == *request_id => {
            let mut buffer = buffer.clone();
            buffer.advance();

            if buffer.is_complete() {
                Ok(TransitionResult::new(ChatState::Idle)
                    .with_effect(Effect::StopReveal)
                    .with_effect(Effect::commit_reply(buffer.full()))
                    .with_effect(Effect::NotifyStateChange))
            } else {
                Ok(TransitionResult::new(ChatState::Revealing {
                    request_id: *request_id,
                    buffer,
                })
                .with_effect(Effect::NotifyStateChange))
            }
        }

        // ============================================================
        // Cancellation
        // ============================================================
        (ChatState::Sending { .. }, Event::Cancel) => Ok(TransitionResult::new(ChatState::Idle)
            .with_effect(Effect::AbortRequest)
            .with_effect(Effect::NotifyStateChange)),

        (ChatState::Revealing { buffer, .. }, Event::Cancel) => {
            let revealed = buffer.revealed();
            let partial = (!revealed.trim().is_empty()).then(|| Effect::commit_reply(revealed));

            Ok(TransitionResult::new(ChatState::Idle)
                .with_effect(Effect::StopReveal)
                .with_effect(Effect::AbortRequest)
                .with_effects(partial)
                .with_effect(Effect::NotifyStateChange))
        }

        // Nothing in flight to cancel
        (ChatState::Idle, Event::Cancel) => Ok(TransitionResult::new(ChatState::Idle)),

        // ============================================================
        // Stale events from an earlier or cancelled request
        // ============================================================
        (
            _,
            Event::ReplyReceived { .. } | Event::RequestFailed { .. } | Event::RevealTick { .. },
        ) => Ok(TransitionResult::new(state.clone())),
    }
}

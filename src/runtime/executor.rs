//! Chat runtime executor

use super::lifecycle::RequestLifecycle;
use super::{AttachmentInfo, ChatCommand, ChatUpdate, ChatView};

use crate::chat::{build_request, AppState, Message, OutgoingTurn};
use crate::db::{DbResult, KeyValueStore, Persistence};
use crate::llm::{LlmService, ReplyKind};
use crate::reveal::RevealAnimator;
use crate::state_machine::{transition, ChatState, Effect, Event};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

/// Generic chat runtime that can work with any store and LLM implementation
pub struct ChatRuntime<S, L>
where
    S: KeyValueStore + Clone + 'static,
    L: LlmService + 'static,
{
    state: ChatState,
    app: AppState,
    persistence: Persistence<S>,
    llm: Arc<L>,
    animator: RevealAnimator,
    /// Present from `RequestReply` until the coordinator is idle again
    lifecycle: Option<RequestLifecycle>,
    next_request_id: u64,
    command_rx: mpsc::Receiver<ChatCommand>,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<ChatUpdate>,
}

impl<S, L> ChatRuntime<S, L>
where
    S: KeyValueStore + Clone + 'static,
    L: LlmService + 'static,
{
    pub fn new(
        app: AppState,
        persistence: Persistence<S>,
        llm: L,
        reveal_interval: Duration,
        command_rx: mpsc::Receiver<ChatCommand>,
        broadcast_tx: broadcast::Sender<ChatUpdate>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(64);
        Self {
            state: ChatState::Idle,
            app,
            persistence,
            llm: Arc::new(llm),
            animator: RevealAnimator::new(reveal_interval, event_tx.clone()),
            lifecycle: None,
            next_request_id: 1,
            command_rx,
            event_rx,
            event_tx,
            broadcast_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(model = %self.llm.model_id(), "Starting chat runtime");

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    // Every handle dropped
                    None => break,
                },
                Some(event) = self.event_rx.recv() => self.process_event(event),
            }
        }

        self.animator.stop();
        self.lifecycle = None;
        tracing::info!("Chat runtime stopped");
    }

    fn handle_command(&mut self, command: ChatCommand) {
        match command {
            ChatCommand::SetDraft(text) => self.app.draft.text = text,

            ChatCommand::Attach(attachment) => {
                tracing::info!(file = %attachment.file_name, media_type = %attachment.media_type, "Attachment selected");
                let info = AttachmentInfo::from(&attachment);
                self.app.draft.attachment = Some(attachment);
                self.broadcast(ChatUpdate::AttachmentChanged(Some(info)));
            }

            ChatCommand::Detach => {
                self.app.draft.attachment = None;
                self.broadcast(ChatUpdate::AttachmentChanged(None));
            }

            ChatCommand::Submit => {
                let request_id = self.next_request_id;
                self.next_request_id += 1;
                self.process_event(Event::Send {
                    request_id,
                    text: self.app.draft.text.clone(),
                    attachment: self.app.draft.attachment.clone(),
                });
            }

            ChatCommand::Cancel => self.process_event(Event::Cancel),

            ChatCommand::ToggleTheme => {
                self.app.dark_mode = !self.app.dark_mode;
                let result = self.persistence.save_theme(self.app.dark_mode);
                self.check_persisted("theme", result);
                self.broadcast(ChatUpdate::ThemeChanged(self.app.dark_mode));
            }

            ChatCommand::SelectPersona(persona) => {
                tracing::info!(persona = persona.key(), "Persona selected");
                self.app.persona = persona;
                let result = self.persistence.save_persona(persona);
                self.check_persisted("persona", result);
                self.broadcast(ChatUpdate::PersonaChanged(persona));
            }

            ChatCommand::Snapshot(reply) => {
                let view = ChatView::new(
                    &self.app,
                    self.state.status(),
                    self.state.revealed_text().map(String::from),
                );
                let _ = reply.send(view);
            }
        }
    }

    fn process_event(&mut self, event: Event) {
        let result = match transition(&self.state, event) {
            Ok(r) => r,
            Err(e) => {
                // Refusals are user-facing (e.g. "reply in progress")
                tracing::debug!(error = %e, state = self.state.status().as_str(), "Event rejected");
                self.broadcast(ChatUpdate::Rejected {
                    reason: e.to_string(),
                });
                return;
            }
        };

        self.state = result.new_state;
        for effect in result.effects {
            self.execute_effect(effect);
        }

        if self.state.is_idle() {
            // Dropping the lifecycle cancels anything still tied to it
            self.lifecycle = None;
        }
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::RequestReply { request_id, turn } => self.spawn_request(request_id, &turn),

            Effect::AppendUserMessage { text } => self.append_message(Message::user(text)),

            Effect::ClearDraft => {
                self.app.draft.clear();
                self.broadcast(ChatUpdate::DraftCleared);
            }

            Effect::AbortRequest => {
                tracing::info!("Aborting reply request");
                if let Some(lifecycle) = &self.lifecycle {
                    lifecycle.cancel();
                }
            }

            Effect::StartReveal { request_id } => self.animator.start(request_id),

            Effect::StopReveal => self.animator.stop(),

            Effect::CommitReply { text } => {
                let allowed = self
                    .lifecycle
                    .as_mut()
                    .is_some_and(RequestLifecycle::try_commit);
                if allowed {
                    self.append_message(Message::assistant(text));
                } else {
                    tracing::warn!("Dropping duplicate reply commit");
                }
            }

            Effect::RememberFact(fact) => {
                tracing::info!(key = %fact.key, "Remembering fact about user");
                if self.app.memory.remember(fact) {
                    let result = self.persistence.save_memory(&self.app.memory);
                    self.check_persisted("memory", result);
                    self.broadcast(ChatUpdate::MemoryUpdated(self.app.memory.clone()));
                }
            }

            Effect::NotifyStateChange => self.broadcast(ChatUpdate::StateChanged {
                status: self.state.status(),
                revealed: self.state.revealed_text().map(String::from),
            }),
        }
    }

    /// Snapshot the request from current state and race it against
    /// cancellation in a background task
    fn spawn_request(&mut self, request_id: u64, turn: &OutgoingTurn) {
        let request = build_request(&self.app.history, self.app.persona, &self.app.memory, turn);

        let lifecycle = RequestLifecycle::new(request_id);
        let cancel_token = lifecycle.token();
        self.lifecycle = Some(lifecycle);

        let llm = self.llm.clone();
        let event_tx = self.event_tx.clone();
        let persona = self.app.persona.key();

        tokio::spawn(async move {
            tracing::info!(
                request_id,
                persona,
                turns = request.contents.len(),
                "Requesting reply (background)"
            );

            tokio::select! {
                biased;

                () = cancel_token.cancelled() => {
                    tracing::info!(request_id, "Reply request aborted");
                }

                result = llm.generate(&request) => {
                    let event = match result {
                        Ok(response) => {
                            let reply = response.into_reply();
                            if reply.kind != ReplyKind::Answer {
                                tracing::warn!(request_id, kind = ?reply.kind, "Provider gave no usable answer");
                            }
                            Event::ReplyReceived { request_id, reply }
                        }
                        Err(e) => {
                            tracing::error!(request_id, error = %e, kind = ?e.kind, "Reply request failed");
                            Event::RequestFailed { request_id, message: e.message }
                        }
                    };
                    let _ = event_tx.send(event).await;
                }
            }
        });
    }

    fn append_message(&mut self, message: Message) {
        self.app.history.append(message.clone());
        self.broadcast(ChatUpdate::MessageAppended(message));
        let result = self.persistence.save_history(&self.app.history);
        self.check_persisted("history", result);
    }

    /// Storage failures are reported but never stop the conversation
    fn check_persisted(&self, what: &str, result: DbResult<()>) {
        if let Err(e) = result {
            tracing::error!(what, error = %e, "Failed to persist");
            self.broadcast(ChatUpdate::Error {
                message: format!("Failed to save {what}: {e}"),
            });
        }
    }

    fn broadcast(&self, update: ChatUpdate) {
        // No subscribers is fine
        let _ = self.broadcast_tx.send(update);
    }
}

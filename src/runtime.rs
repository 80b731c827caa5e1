//! Runtime for the chat client
//!
//! One `ChatRuntime` task owns the application state and the request
//! coordinator. Front ends talk to it through a `ChatHandle`: commands go in
//! over an mpsc channel and `ChatUpdate`s come back over a broadcast channel.

mod executor;
mod lifecycle;

#[cfg(test)]
pub mod testing;

pub use executor::ChatRuntime;
pub use lifecycle::RequestLifecycle;

use crate::chat::{AppState, Message, PendingAttachment, Persona, UserMemory};
use crate::db::{KeyValueStore, Persistence};
use crate::llm::LlmService;
use crate::state_machine::Status;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Requests from a front end
#[derive(Debug)]
pub enum ChatCommand {
    SetDraft(String),
    Attach(PendingAttachment),
    Detach,
    Submit,
    Cancel,
    ToggleTheme,
    SelectPersona(Persona),
    Snapshot(oneshot::Sender<ChatView>),
}

/// Name and media type of the pending attachment, without its bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentInfo {
    pub file_name: String,
    pub media_type: String,
}

impl From<&PendingAttachment> for AttachmentInfo {
    fn from(attachment: &PendingAttachment) -> Self {
        Self {
            file_name: attachment.file_name.clone(),
            media_type: attachment.media_type.clone(),
        }
    }
}

/// Changes pushed to subscribers
#[derive(Debug, Clone)]
pub enum ChatUpdate {
    MessageAppended(Message),
    StateChanged {
        status: Status,
        /// Visible part of the reply while revealing
        revealed: Option<String>,
    },
    ThemeChanged(bool),
    PersonaChanged(Persona),
    MemoryUpdated(UserMemory),
    AttachmentChanged(Option<AttachmentInfo>),
    DraftCleared,
    /// A command was refused and nothing changed
    Rejected {
        reason: String,
    },
    Error {
        message: String,
    },
}

/// Everything a renderer needs, rebuilt from a snapshot plus updates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatView {
    pub history: Vec<Message>,
    pub status: Status,
    pub revealed: Option<String>,
    pub persona: Persona,
    pub dark_mode: bool,
    pub memory: UserMemory,
    pub attachment: Option<AttachmentInfo>,
}

impl ChatView {
    pub fn new(app: &AppState, status: Status, revealed: Option<String>) -> Self {
        Self {
            history: app.history.messages().to_vec(),
            status,
            revealed,
            persona: app.persona,
            dark_mode: app.dark_mode,
            memory: app.memory.clone(),
            attachment: app.draft.attachment.as_ref().map(AttachmentInfo::from),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.status != Status::Idle
    }

    pub fn apply(&mut self, update: &ChatUpdate) {
        match update {
            ChatUpdate::MessageAppended(message) => self.history.push(message.clone()),
            ChatUpdate::StateChanged { status, revealed } => {
                self.status = *status;
                self.revealed.clone_from(revealed);
            }
            ChatUpdate::ThemeChanged(dark_mode) => self.dark_mode = *dark_mode,
            ChatUpdate::PersonaChanged(persona) => self.persona = *persona,
            ChatUpdate::MemoryUpdated(memory) => self.memory = memory.clone(),
            ChatUpdate::AttachmentChanged(attachment) => self.attachment.clone_from(attachment),
            ChatUpdate::DraftCleared => self.attachment = None,
            ChatUpdate::Rejected { .. } | ChatUpdate::Error { .. } => {}
        }
    }
}

#[derive(Debug, Error)]
#[error("Chat runtime has stopped")]
pub struct RuntimeStopped;

/// Handle to interact with a running chat runtime
#[derive(Clone)]
pub struct ChatHandle {
    command_tx: mpsc::Sender<ChatCommand>,
    broadcast_tx: broadcast::Sender<ChatUpdate>,
}

impl ChatHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<ChatUpdate> {
        self.broadcast_tx.subscribe()
    }

    pub async fn command(&self, command: ChatCommand) -> Result<(), RuntimeStopped> {
        self.command_tx.send(command).await.map_err(|_| RuntimeStopped)
    }

    /// Replace the draft text and submit it together with any pending attachment
    pub async fn send_message(&self, text: impl Into<String>) -> Result<(), RuntimeStopped> {
        self.command(ChatCommand::SetDraft(text.into())).await?;
        self.command(ChatCommand::Submit).await
    }

    pub async fn attach(&self, attachment: PendingAttachment) -> Result<(), RuntimeStopped> {
        self.command(ChatCommand::Attach(attachment)).await
    }

    pub async fn detach(&self) -> Result<(), RuntimeStopped> {
        self.command(ChatCommand::Detach).await
    }

    pub async fn cancel(&self) -> Result<(), RuntimeStopped> {
        self.command(ChatCommand::Cancel).await
    }

    pub async fn toggle_theme(&self) -> Result<(), RuntimeStopped> {
        self.command(ChatCommand::ToggleTheme).await
    }

    pub async fn select_persona(&self, persona: Persona) -> Result<(), RuntimeStopped> {
        self.command(ChatCommand::SelectPersona(persona)).await
    }

    pub async fn snapshot(&self) -> Result<ChatView, RuntimeStopped> {
        let (tx, rx) = oneshot::channel();
        self.command(ChatCommand::Snapshot(tx)).await?;
        rx.await.map_err(|_| RuntimeStopped)
    }
}

/// Restore persisted state and spawn the runtime task.
pub fn start<S, L>(persistence: Persistence<S>, llm: L, reveal_interval: Duration) -> ChatHandle
where
    S: KeyValueStore + Clone + 'static,
    L: LlmService + 'static,
{
    let app = persistence.load();
    let (command_tx, command_rx) = mpsc::channel(32);
    let (broadcast_tx, _) = broadcast::channel(256);

    let runtime = ChatRuntime::new(
        app,
        persistence,
        llm,
        reveal_interval,
        command_rx,
        broadcast_tx.clone(),
    );
    tokio::spawn(runtime.run());

    ChatHandle {
        command_tx,
        broadcast_tx,
    }
}

//! Terminal front end state
//!
//! `ChatScreen` turns key presses into `Action`s for the runtime and folds
//! `ChatUpdate`s into what is drawn. It performs no I/O itself.

mod ui;

pub use ui::{draw, Palette};

use crate::chat::Sender;
use crate::runtime::{ChatUpdate, ChatView};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::path::PathBuf;

/// What the event loop should do in response to a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Send(String),
    Cancel,
    ToggleTheme,
    NextPersona,
    Attach(PathBuf),
    Detach,
}

pub const BUSY_NOTICE: &str = "Muse is still replying. Press Esc to stop.";

pub struct ChatScreen {
    pub view: ChatView,
    pub input: String,
    /// One-line message shown in the status bar until the next key press
    pub notice: Option<String>,
    pub scroll: u16,
    max_scroll: u16,
    /// Keep the newest line in view
    follow: bool,
}

impl ChatScreen {
    pub fn new(view: ChatView) -> Self {
        Self {
            view,
            input: String::new(),
            notice: None,
            scroll: 0,
            max_scroll: 0,
            follow: true,
        }
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn apply(&mut self, update: &ChatUpdate) {
        self.view.apply(update);
        match update {
            ChatUpdate::DraftCleared => self.input.clear(),
            ChatUpdate::Rejected { reason } => self.set_notice(reason.clone()),
            ChatUpdate::Error { message } => self.set_notice(message.clone()),
            // Sending jumps to the bottom; replies only follow if already there
            ChatUpdate::MessageAppended(message) if message.sender == Sender::User => {
                self.follow = true;
            }
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.kind != KeyEventKind::Press {
            return Action::None;
        }
        self.notice = None;

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Action::Quit,
                KeyCode::Char('t') => Action::ToggleTheme,
                KeyCode::Char('p') => Action::NextPersona,
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Enter => self.submit(),
            KeyCode::Esc => {
                if self.view.is_busy() {
                    Action::Cancel
                } else {
                    Action::None
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
                Action::None
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                Action::None
            }
            KeyCode::Up => self.scroll_up(1),
            KeyCode::Down => self.scroll_down(1),
            KeyCode::PageUp => self.scroll_up(10),
            KeyCode::PageDown => self.scroll_down(10),
            _ => Action::None,
        }
    }

    fn submit(&mut self) -> Action {
        let trimmed = self.input.trim();

        if let Some(path) = trimmed
            .strip_prefix("/attach")
            .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
        {
            let path = path.trim();
            if path.is_empty() {
                self.set_notice("Usage: /attach <path>");
                return Action::None;
            }
            let action = Action::Attach(PathBuf::from(path));
            self.input.clear();
            return action;
        }
        if trimmed == "/detach" {
            self.input.clear();
            return Action::Detach;
        }

        if self.view.is_busy() {
            self.set_notice(BUSY_NOTICE);
            return Action::None;
        }
        // The runtime clears the input once it accepts the message
        Action::Send(self.input.clone())
    }

    fn scroll_up(&mut self, lines: u16) -> Action {
        self.follow = false;
        self.scroll = self.scroll.saturating_sub(lines);
        Action::None
    }

    fn scroll_down(&mut self, lines: u16) -> Action {
        self.scroll = self.scroll.saturating_add(lines).min(self.max_scroll);
        self.follow = self.scroll == self.max_scroll;
        Action::None
    }

    /// Called by the renderer once the wrapped height is known
    pub(crate) fn update_scroll_bounds(&mut self, max_scroll: u16) {
        self.max_scroll = max_scroll;
        if self.follow || self.scroll > max_scroll {
            self.scroll = max_scroll;
        }
    }
}

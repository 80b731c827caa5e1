//! Typed load/save of client state on top of a `KeyValueStore`

use super::{DbResult, KeyValueStore, KEY_CHAT_LOG, KEY_DARK_MODE, KEY_PERSONA, KEY_USER_MEMORY};
use crate::chat::{AppState, ConversationHistory, Persona, UserMemory};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Reads and writes the four persisted keys.
///
/// Every value is JSON encoded. Missing or unreadable values fall back to
/// defaults on load so a damaged store never prevents startup.
#[derive(Clone)]
pub struct Persistence<S> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Restore theme, history, persona and memory. The draft always starts empty.
    pub fn load(&self) -> AppState {
        let defaults = AppState::default();

        let dark_mode = self.read(KEY_DARK_MODE).unwrap_or(defaults.dark_mode);
        let history: ConversationHistory = self.read(KEY_CHAT_LOG).unwrap_or_default();
        let memory: UserMemory = self.read(KEY_USER_MEMORY).unwrap_or_default();
        let persona = self
            .read::<String>(KEY_PERSONA)
            .and_then(|key| {
                let persona = Persona::from_key(&key);
                if persona.is_none() {
                    tracing::warn!(persona = %key, "Unknown stored persona, using default");
                }
                persona
            })
            .unwrap_or_default();

        tracing::info!(
            messages = history.len(),
            persona = persona.key(),
            dark_mode,
            facts = memory.iter().count(),
            "Loaded persisted state"
        );

        AppState {
            history,
            persona,
            memory,
            dark_mode,
            ..defaults
        }
    }

    pub fn save_theme(&self, dark_mode: bool) -> DbResult<()> {
        self.write(KEY_DARK_MODE, &dark_mode)
    }

    pub fn save_history(&self, history: &ConversationHistory) -> DbResult<()> {
        self.write(KEY_CHAT_LOG, history)
    }

    pub fn save_persona(&self, persona: Persona) -> DbResult<()> {
        self.write(KEY_PERSONA, persona.key())
    }

    pub fn save_memory(&self, memory: &UserMemory) -> DbResult<()> {
        self.write(KEY_USER_MEMORY, memory)
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read stored value");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding corrupt stored value");
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> DbResult<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key, &raw)
    }
}

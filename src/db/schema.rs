//! Database schema and persisted keys

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

/// Theme flag, stored as JSON `true`/`false`
pub const KEY_DARK_MODE: &str = "darkMode";

/// Conversation history, stored as a JSON array of messages
pub const KEY_CHAT_LOG: &str = "chatLog";

/// Selected persona key, stored as a JSON string
pub const KEY_PERSONA: &str = "persona";

/// Remembered facts, stored as a JSON object
pub const KEY_USER_MEMORY: &str = "userMemory";

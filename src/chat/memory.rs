//! User facts remembered across sessions
//!
//! Facts are extracted heuristically from what the user types. The map is
//! merge/overwrite only; nothing is ever removed.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Phrase is case-insensitive, the name itself must start with a capital
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i:\bmy\s+name\s+is|\bi['’]m)\s+(\p{Lu}[\p{L}'-]*)")
        .expect("name pattern is a valid regex")
});

/// A single extracted fact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    pub key: String,
    pub value: String,
}

/// Look for a self-introduction in user text.
///
/// Best effort only: "my name is NAME" or "I'm NAME".
pub fn extract_fact(text: &str) -> Option<Fact> {
    let captures = NAME_PATTERN.captures(text)?;
    let name = captures.get(1)?.as_str();
    Some(Fact {
        key: "name".to_string(),
        value: name.to_string(),
    })
}

/// Persisted fact map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserMemory {
    facts: BTreeMap<String, String>,
}

impl UserMemory {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.facts.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.facts.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Set or overwrite a fact. Returns false when the value was already known.
    pub fn remember(&mut self, fact: Fact) -> bool {
        if self.get(&fact.key) == Some(fact.value.as_str()) {
            return false;
        }
        self.facts.insert(fact.key, fact.value);
        true
    }

    /// One-line summary for the outbound system instruction
    pub fn describe(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let facts: Vec<String> = self.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        Some(format!("Known facts about the user: {}.", facts.join(", ")))
    }
}

//! Simulated typing for replies that have already arrived in full
//!
//! `RevealBuffer` is the pure part: which prefix of the reply is visible.
//! `RevealAnimator` is the tick source that drives it at a fixed cadence.

mod animator;

pub use animator::{RevealAnimator, DEFAULT_REVEAL_INTERVAL};

/// End offset of the unit that starts at `from`.
///
/// A unit is any leading whitespace plus the following run of non-whitespace,
/// so consecutive units concatenate back to the original text.
pub fn next_unit_end(text: &str, from: usize) -> usize {
    let Some(rest) = text.get(from..) else {
        return text.len();
    };
    let mut seen_word = false;
    for (i, c) in rest.char_indices() {
        if c.is_whitespace() {
            if seen_word {
                return from + i;
            }
        } else {
            seen_word = true;
        }
    }
    text.len()
}

/// Visible prefix of a fully received reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealBuffer {
    full: String,
    shown: usize,
}

impl RevealBuffer {
    pub fn new(full: impl Into<String>) -> Self {
        Self {
            full: full.into(),
            shown: 0,
        }
    }

    pub fn full(&self) -> &str {
        &self.full
    }

    /// Text revealed so far
    pub fn revealed(&self) -> &str {
        self.full.get(..self.shown).unwrap_or_default()
    }

    pub fn is_complete(&self) -> bool {
        self.shown >= self.full.len()
    }

    /// Reveal one more unit. Returns false if everything was already shown.
    pub fn advance(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        self.shown = next_unit_end(&self.full, self.shown);
        true
    }
}

//! Preset system-instruction profiles

/// Selectable persona
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Persona {
    #[default]
    Default,
    Creative,
    Technical,
    Concise,
}

impl Persona {
    pub const ALL: [Persona; 4] = [
        Persona::Default,
        Persona::Creative,
        Persona::Technical,
        Persona::Concise,
    ];

    /// Stable identifier, used as the persisted value
    pub fn key(self) -> &'static str {
        match self {
            Persona::Default => "default",
            Persona::Creative => "creative",
            Persona::Technical => "technical",
            Persona::Concise => "concise",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            Persona::Default => "Muse",
            Persona::Creative => "Creative Muse",
            Persona::Technical => "Technical Muse",
            Persona::Concise => "Concise Muse",
        }
    }

    pub fn system_instruction(self) -> &'static str {
        match self {
            Persona::Default => {
                "You are Muse, a friendly and helpful AI assistant. Answer clearly and warmly."
            }
            Persona::Creative => {
                "You are Muse in creative mode. Be imaginative and playful, offer unexpected ideas, \
                 and feel free to use vivid language, stories and metaphors."
            }
            Persona::Technical => {
                "You are Muse in technical mode. Be precise and rigorous, prefer concrete examples \
                 and code, and state assumptions explicitly."
            }
            Persona::Concise => {
                "You are Muse in concise mode. Answer in as few words as possible without losing \
                 accuracy. Avoid preamble."
            }
        }
    }

    /// The next persona in display order, wrapping around
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

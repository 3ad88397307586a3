use serde::Serialize;

/// Label used for turns spoken before any speaker marker appears
pub const DEFAULT_UNKNOWN_SPEAKER: &str = "Unknown Speaker";

/// Who spoke a turn
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Speaker {
    /// Name taken from an explicit speaker marker
    Named(String),
    /// No marker has been seen yet in the document
    Unknown,
}

impl Speaker {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Whether this speaker came from an explicit marker
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Named(_))
    }

    /// The marker name, if resolved
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name.as_str()),
            Self::Unknown => None,
        }
    }

    /// Display label, substituting `unknown_label` for the sentinel
    pub fn label<'a>(&'a self, unknown_label: &'a str) -> &'a str {
        match self {
            Self::Named(name) => name.as_str(),
            Self::Unknown => unknown_label,
        }
    }
}

/// One utterance recovered from a transcript block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Position in processing order, strictly increasing across a document
    pub index: usize,
    /// The block's declared `data-index`, when it was a valid number
    pub source_index: Option<u64>,
    /// Current speaker when the block was read (carried forward)
    pub speaker: Speaker,
    /// Whitespace-normalized utterance text, never empty
    pub text: String,
}

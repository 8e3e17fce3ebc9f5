use serde::{Deserialize, Serialize};

/// One narrative beat in the story graph.
///
/// Nodes reference each other only by `id`, so a story stays plain data
/// that can be written by hand in RON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub text: String,
    /// Choice labels. Index 0 is displayed as choice "1".
    #[serde(default)]
    pub options: Vec<String>,
    /// Successor ids, parallel to `options`. Empty means terminal.
    #[serde(default)]
    pub transitions: Vec<String>,
    #[serde(default)]
    pub illustration: Option<String>,
    #[serde(default)]
    pub audio: Option<String>,
    /// Eligible for main-encounter escalation once the encounter quota is met.
    #[serde(default)]
    pub is_main_encounter: bool,
}

impl Node {
    /// Build a node with no media and no main-encounter tag.
    pub fn new(id: &str, text: &str, options: &[&str], transitions: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            transitions: transitions.iter().map(|s| s.to_string()).collect(),
            illustration: None,
            audio: None,
            is_main_encounter: false,
        }
    }

    pub fn with_illustration(mut self, reference: &str) -> Self {
        self.illustration = Some(reference.to_string());
        self
    }

    pub fn with_audio(mut self, reference: &str) -> Self {
        self.audio = Some(reference.to_string());
        self
    }

    pub fn main_encounter(mut self) -> Self {
        self.is_main_encounter = true;
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.transitions.is_empty()
    }

    /// The illustration reference, treating an empty string as absent.
    pub fn illustration_ref(&self) -> Option<&str> {
        self.illustration.as_deref().filter(|s| !s.is_empty())
    }

    /// The audio reference, treating an empty string as absent.
    pub fn audio_ref(&self) -> Option<&str> {
        self.audio.as_deref().filter(|s| !s.is_empty())
    }

    /// Successor for a 1-based choice, if the choice is in range.
    pub fn successor(&self, choice: usize) -> Option<&str> {
        choice
            .checked_sub(1)
            .and_then(|i| self.transitions.get(i))
            .map(String::as_str)
    }
}

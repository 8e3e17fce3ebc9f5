/// Story documents — the declarative content file a graph is built from.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use super::node::Node;

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Number of random encounters required before the main plot advances.
pub const DEFAULT_ENCOUNTER_QUOTA: u32 = 3;

/// Pacing knobs carried alongside the authored content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_quota")]
    pub encounter_quota: u32,
}

fn default_quota() -> u32 {
    DEFAULT_ENCOUNTER_QUOTA
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            encounter_quota: DEFAULT_ENCOUNTER_QUOTA,
        }
    }
}

/// Authored content for one story, as written in a `.ron` file.
///
/// ```ron
/// (
///     title: "Two rooms",
///     start: "start",
///     terminal: "end",
///     nodes: [
///         (id: "start", text: "A door.", options: ["Proceed"], transitions: ["end"]),
///         (id: "end", text: "Done."),
///     ],
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryDocument {
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_start")]
    pub start: String,
    /// Sentinel id that always counts as game over.
    #[serde(default = "default_terminal")]
    pub terminal: String,
    /// Fallback destination for escalation when no main encounter exists.
    #[serde(default)]
    pub hub: Option<String>,
    /// Ids eligible for the random-encounter draw, in draw order.
    #[serde(default)]
    pub random_pool: Vec<String>,
    #[serde(default)]
    pub pacing: PacingConfig,
    pub nodes: Vec<Node>,
}

fn default_start() -> String {
    "start".to_string()
}

fn default_terminal() -> String {
    "end".to_string()
}

impl StoryDocument {
    /// A document with default start/terminal ids and no random pool.
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            title: String::new(),
            start: default_start(),
            terminal: default_terminal(),
            hub: None,
            random_pool: Vec::new(),
            pacing: PacingConfig::default(),
            nodes,
        }
    }

    /// Load a story document from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<StoryDocument, StoryError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a story document from a RON string.
    pub fn parse_ron(input: &str) -> Result<StoryDocument, StoryError> {
        Ok(ron::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_document_defaults() {
        let doc = StoryDocument::parse_ron(
            r#"(
                nodes: [
                    (id: "start", text: "Begin.", options: ["Proceed"], transitions: ["end"]),
                    (id: "end", text: "Fin."),
                ],
            )"#,
        )
        .unwrap();
        assert_eq!(doc.start, "start");
        assert_eq!(doc.terminal, "end");
        assert_eq!(doc.hub, None);
        assert!(doc.random_pool.is_empty());
        assert_eq!(doc.pacing.encounter_quota, 3);
        assert_eq!(doc.nodes.len(), 2);
    }

    #[test]
    fn parse_pacing_override() {
        let doc = StoryDocument::parse_ron(
            r#"(pacing: (encounter_quota: 5), nodes: [])"#,
        )
        .unwrap();
        assert_eq!(doc.pacing.encounter_quota, 5);
    }

    #[test]
    fn parse_error_is_reported() {
        let err = StoryDocument::parse_ron("(nodes: [ (id: 4) ])").unwrap_err();
        assert!(matches!(err, StoryError::Ron(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = StoryDocument::load_from_ron(Path::new("tests/fixtures/does_not_exist.ron"))
            .unwrap_err();
        assert!(matches!(err, StoryError::Io(_)));
    }

    #[test]
    fn ron_round_trip() {
        let mut doc = StoryDocument::new(vec![
            Node::new("start", "Begin.", &["Proceed"], &["end"]),
            Node::new("end", "Fin.", &[], &[]),
        ]);
        doc.random_pool.push("start".to_string());

        let serialized = ron::to_string(&doc).unwrap();
        let back = StoryDocument::parse_ron(&serialized).unwrap();
        assert_eq!(back.nodes, doc.nodes);
        assert_eq!(back.random_pool, doc.random_pool);
    }
}

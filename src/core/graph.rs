/// Story graph — the immutable, validated node set.
///
/// All cross-references are checked once at load time so traversal can
/// trust every id it follows.

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::schema::node::Node;
use crate::schema::story::StoryDocument;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("duplicate node id '{0}'")]
    DuplicateNode(String),
    #[error("start node '{0}' does not exist")]
    MissingStart(String),
    #[error("node '{node}' has {options} options but {transitions} transitions")]
    LengthMismatch {
        node: String,
        options: usize,
        transitions: usize,
    },
    #[error("node '{node}' transitions to non-existent node '{target}'")]
    DanglingTransition { node: String, target: String },
    #[error("random pool references non-existent node '{0}'")]
    UnknownPoolEntry(String),
    #[error("random pool lists '{0}' more than once")]
    DuplicatePoolEntry(String),
    #[error("random encounter '{0}' is terminal")]
    TerminalRandomNode(String),
    #[error("random encounter '{0}' is also tagged as a main encounter")]
    RandomMainEncounter(String),
    #[error("random encounter '{node}' routes directly to random encounter '{target}'")]
    RandomToRandom { node: String, target: String },
    #[error("hub node '{0}' does not exist")]
    UnknownHub(String),
    #[error("hub node '{0}' is also a random encounter")]
    RandomHub(String),
    #[error("random encounters present but no main encounter or hub to escalate to")]
    NoEscalationTarget,
    #[error("encounter quota must be at least 1")]
    ZeroQuota,
}

/// A loaded story: nodes keyed by id plus the random-encounter pool.
#[derive(Debug, Clone)]
pub struct StoryGraph {
    title: String,
    nodes: FxHashMap<String, Node>,
    start: String,
    terminal: String,
    hub: Option<String>,
    random_pool: Vec<String>,
    random_set: FxHashSet<String>,
    main_encounters: Vec<String>,
    quota: u32,
}

impl StoryGraph {
    /// Validate a document and build the graph from it.
    pub fn from_document(doc: StoryDocument) -> Result<StoryGraph, IntegrityError> {
        if doc.pacing.encounter_quota == 0 {
            return Err(IntegrityError::ZeroQuota);
        }

        let mut nodes = FxHashMap::default();
        for node in doc.nodes {
            if node.options.len() != node.transitions.len() {
                return Err(IntegrityError::LengthMismatch {
                    node: node.id.clone(),
                    options: node.options.len(),
                    transitions: node.transitions.len(),
                });
            }
            if nodes.contains_key(&node.id) {
                return Err(IntegrityError::DuplicateNode(node.id));
            }
            nodes.insert(node.id.clone(), node);
        }

        if !nodes.contains_key(&doc.start) {
            return Err(IntegrityError::MissingStart(doc.start));
        }

        if let Some(ref hub) = doc.hub {
            if !nodes.contains_key(hub) {
                return Err(IntegrityError::UnknownHub(hub.clone()));
            }
        }

        // Sorted so error reporting does not depend on hash order
        let mut ids: Vec<&String> = nodes.keys().collect();
        ids.sort();
        for id in &ids {
            let node = &nodes[*id];
            for target in &node.transitions {
                if !nodes.contains_key(target) {
                    return Err(IntegrityError::DanglingTransition {
                        node: node.id.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        let mut random_set = FxHashSet::default();
        for id in &doc.random_pool {
            let node = nodes
                .get(id)
                .ok_or_else(|| IntegrityError::UnknownPoolEntry(id.clone()))?;
            if node.is_terminal() {
                return Err(IntegrityError::TerminalRandomNode(id.clone()));
            }
            if node.is_main_encounter {
                return Err(IntegrityError::RandomMainEncounter(id.clone()));
            }
            if !random_set.insert(id.clone()) {
                return Err(IntegrityError::DuplicatePoolEntry(id.clone()));
            }
        }

        if let Some(ref hub) = doc.hub {
            if random_set.contains(hub) {
                return Err(IntegrityError::RandomHub(hub.clone()));
            }
        }

        for id in &doc.random_pool {
            for target in &nodes[id].transitions {
                if random_set.contains(target) {
                    return Err(IntegrityError::RandomToRandom {
                        node: id.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        let main_encounters: Vec<String> = ids
            .iter()
            .filter(|id| nodes[**id].is_main_encounter)
            .map(|id| (*id).clone())
            .collect();

        // A full encounter cycle must have somewhere to escalate to
        if !random_set.is_empty() && main_encounters.is_empty() && doc.hub.is_none() {
            return Err(IntegrityError::NoEscalationTarget);
        }

        Ok(StoryGraph {
            title: doc.title,
            nodes,
            start: doc.start,
            terminal: doc.terminal,
            hub: doc.hub,
            random_pool: doc.random_pool,
            random_set,
            main_encounters,
            quota: doc.pacing.encounter_quota,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn terminal_sentinel(&self) -> &str {
        &self.terminal
    }

    pub fn hub(&self) -> Option<&str> {
        self.hub.as_deref()
    }

    pub fn is_random(&self, id: &str) -> bool {
        self.random_set.contains(id)
    }

    /// Random-encounter ids in authored order.
    pub fn random_pool(&self) -> &[String] {
        &self.random_pool
    }

    /// Ids tagged as main encounters, sorted.
    pub fn main_encounters(&self) -> &[String] {
        &self.main_encounters
    }

    pub fn quota(&self) -> u32 {
        self.quota
    }

    /// Replace the encounter quota. Zero is rejected.
    pub fn set_quota(&mut self, quota: u32) -> Result<(), IntegrityError> {
        if quota == 0 {
            return Err(IntegrityError::ZeroQuota);
        }
        self.quota = quota;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(nodes: Vec<Node>) -> StoryDocument {
        StoryDocument::new(nodes)
    }

    fn dungeon() -> StoryDocument {
        let mut d = doc(vec![
            Node::new("start", "Begin.", &["Proceed"], &["hub"]),
            Node::new("hub", "Doors.", &["Stone", "Iron"], &["stone", "iron"]),
            Node::new("stone", "Stone.", &["Back"], &["hub"]).main_encounter(),
            Node::new("iron", "Iron.", &["Onward"], &["end"]).main_encounter(),
            Node::new("ghoul", "Ghouls.", &["Fight", "Run"], &["hub", "hub"]),
            Node::new("end", "Fin.", &[], &[]),
        ]);
        d.hub = Some("hub".to_string());
        d.random_pool = vec!["ghoul".to_string()];
        d
    }

    #[test]
    fn valid_document_loads() {
        let graph = StoryGraph::from_document(dungeon()).unwrap();
        assert_eq!(graph.len(), 6);
        assert_eq!(graph.start(), "start");
        assert_eq!(graph.hub(), Some("hub"));
        assert!(graph.is_random("ghoul"));
        assert!(!graph.is_random("hub"));
        assert_eq!(graph.main_encounters(), &["iron".to_string(), "stone".to_string()]);
        assert_eq!(graph.quota(), 3);
    }

    #[test]
    fn every_transition_target_exists() {
        let graph = StoryGraph::from_document(dungeon()).unwrap();
        for id in ["start", "hub", "stone", "iron", "ghoul", "end"] {
            let node = graph.node(id).unwrap();
            assert_eq!(node.options.len(), node.transitions.len());
            for target in &node.transitions {
                assert!(graph.contains(target), "{} -> {}", id, target);
            }
        }
    }

    #[test]
    fn dangling_transition_rejected() {
        let err = StoryGraph::from_document(doc(vec![
            Node::new("start", "Begin.", &["Stone door"], &["stone_room"]),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            IntegrityError::DanglingTransition {
                node: "start".to_string(),
                target: "stone_room".to_string(),
            }
        );
    }

    #[test]
    fn length_mismatch_rejected() {
        let err = StoryGraph::from_document(doc(vec![
            Node::new("start", "Begin.", &["A", "B"], &["end"]),
            Node::new("end", "Fin.", &[], &[]),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            IntegrityError::LengthMismatch { options: 2, transitions: 1, .. }
        ));
    }

    #[test]
    fn duplicate_node_rejected() {
        let err = StoryGraph::from_document(doc(vec![
            Node::new("start", "One.", &[], &[]),
            Node::new("start", "Two.", &[], &[]),
        ]))
        .unwrap_err();
        assert_eq!(err, IntegrityError::DuplicateNode("start".to_string()));
    }

    #[test]
    fn missing_start_rejected() {
        let err = StoryGraph::from_document(doc(vec![Node::new("end", "Fin.", &[], &[])]))
            .unwrap_err();
        assert_eq!(err, IntegrityError::MissingStart("start".to_string()));
    }

    #[test]
    fn unknown_hub_rejected() {
        let mut d = dungeon();
        d.hub = Some("atrium".to_string());
        assert_eq!(
            StoryGraph::from_document(d).unwrap_err(),
            IntegrityError::UnknownHub("atrium".to_string())
        );
    }

    #[test]
    fn random_pool_entries_validated() {
        let mut d = dungeon();
        d.random_pool.push("wraith".to_string());
        assert_eq!(
            StoryGraph::from_document(d).unwrap_err(),
            IntegrityError::UnknownPoolEntry("wraith".to_string())
        );

        let mut d = dungeon();
        d.random_pool.push("ghoul".to_string());
        assert_eq!(
            StoryGraph::from_document(d).unwrap_err(),
            IntegrityError::DuplicatePoolEntry("ghoul".to_string())
        );

        let mut d = dungeon();
        d.random_pool.push("end".to_string());
        assert_eq!(
            StoryGraph::from_document(d).unwrap_err(),
            IntegrityError::TerminalRandomNode("end".to_string())
        );

        let mut d = dungeon();
        d.random_pool.push("stone".to_string());
        assert_eq!(
            StoryGraph::from_document(d).unwrap_err(),
            IntegrityError::RandomMainEncounter("stone".to_string())
        );
    }

    #[test]
    fn random_to_random_rejected() {
        let mut d = dungeon();
        d.nodes
            .push(Node::new("knight", "A knight.", &["Fight"], &["ghoul"]));
        d.random_pool.push("knight".to_string());
        assert_eq!(
            StoryGraph::from_document(d).unwrap_err(),
            IntegrityError::RandomToRandom {
                node: "knight".to_string(),
                target: "ghoul".to_string(),
            }
        );
    }

    #[test]
    fn random_hub_rejected() {
        let mut d = dungeon();
        d.hub = Some("ghoul".to_string());
        assert_eq!(
            StoryGraph::from_document(d).unwrap_err(),
            IntegrityError::RandomHub("ghoul".to_string())
        );
    }

    #[test]
    fn random_pool_needs_escalation_target() {
        let mut d = doc(vec![
            Node::new("start", "A stair.", &["Down"], &["crypt"]),
            Node::new("crypt", "The crypt.", &[], &[]),
            Node::new("ghoul", "Ghouls.", &["Fight"], &["start"]),
        ]);
        d.random_pool = vec!["ghoul".to_string()];
        d.pacing.encounter_quota = 1;
        assert_eq!(
            StoryGraph::from_document(d.clone()).unwrap_err(),
            IntegrityError::NoEscalationTarget
        );

        // either a hub or a tagged main encounter is enough
        let mut with_hub = d.clone();
        with_hub.hub = Some("start".to_string());
        assert!(StoryGraph::from_document(with_hub).is_ok());

        let mut with_main = d;
        with_main.nodes[0] =
            Node::new("start", "A stair.", &["Down"], &["crypt"]).main_encounter();
        assert!(StoryGraph::from_document(with_main).is_ok());
    }

    #[test]
    fn zero_quota_rejected() {
        let mut d = dungeon();
        d.pacing.encounter_quota = 0;
        assert_eq!(
            StoryGraph::from_document(d).unwrap_err(),
            IntegrityError::ZeroQuota
        );

        let mut graph = StoryGraph::from_document(dungeon()).unwrap();
        assert_eq!(graph.set_quota(0), Err(IntegrityError::ZeroQuota));
        graph.set_quota(5).unwrap();
        assert_eq!(graph.quota(), 5);
    }
}

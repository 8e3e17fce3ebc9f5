//! The narrative engine: owns the loaded graph, the playthrough state,
//! and the random source, and exposes the query and choice surface.

use log::{debug, info};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::graph::{IntegrityError, StoryGraph};
use crate::core::pacing::{self, Step, TransitionKind};
use crate::core::random::{self, RandomSource};
use crate::core::state::EngineState;
use crate::schema::node::Node;
use crate::schema::story::{StoryDocument, StoryError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("integrity error: {0}")]
    Integrity(#[from] IntegrityError),
    #[error("story error: {0}")]
    Story(#[from] StoryError),
    #[error("no story loaded")]
    NotLoaded,
    #[error("choice {choice} out of range (1-{max})")]
    OutOfRange { choice: usize, max: usize },
    #[error("cursor points at unknown node '{0}'")]
    InvalidCursor(String),
    #[error("random encounter pool is empty")]
    EmptyRandomPool,
    #[error("no main encounter or hub to escalate to")]
    NoEscalationTarget,
}

/// Everything the display collaborator needs for one screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene<'a> {
    pub node_id: &'a str,
    pub text: &'a str,
    pub options: &'a [String],
    pub illustration: Option<&'a str>,
}

/// Outcome of a handled choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub from: String,
    pub to: String,
    pub game_over: bool,
}

struct Loaded {
    graph: StoryGraph,
    state: EngineState,
}

/// The top-level story runtime. Built via `NarrativeEngine::builder()`.
pub struct NarrativeEngine {
    loaded: Option<Loaded>,
    rng: Box<dyn RandomSource>,
    quota_override: Option<u32>,
}

/// Builder for constructing a `NarrativeEngine`.
pub struct NarrativeEngineBuilder {
    story_path: Option<PathBuf>,
    seed: Option<u64>,
    quota: Option<u32>,
    /// Directly provided story (for testing without files).
    story: Option<StoryDocument>,
    /// Directly provided random source (for pinning draws in tests).
    rng: Option<Box<dyn RandomSource>>,
}

impl NarrativeEngine {
    pub fn builder() -> NarrativeEngineBuilder {
        NarrativeEngineBuilder {
            story_path: None,
            seed: None,
            quota: None,
            story: None,
            rng: None,
        }
    }

    /// Validate and install a story, starting a fresh playthrough.
    ///
    /// A failed load leaves the engine unloaded.
    pub fn load(&mut self, document: StoryDocument) -> Result<(), EngineError> {
        self.loaded = None;
        let mut graph = StoryGraph::from_document(document)?;
        if let Some(quota) = self.quota_override {
            graph.set_quota(quota)?;
        }
        info!(
            "loaded story '{}': {} nodes, {} random encounters, {} main encounters, quota {}",
            graph.title(),
            graph.len(),
            graph.random_pool().len(),
            graph.main_encounters().len(),
            graph.quota()
        );
        let state = EngineState::new(graph.start());
        self.loaded = Some(Loaded { graph, state });
        Ok(())
    }

    /// Load a story from a RON file.
    pub fn load_from_ron(&mut self, path: &Path) -> Result<(), EngineError> {
        let document = StoryDocument::load_from_ron(path)?;
        self.load(document)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Start over at the start node with fresh counters.
    pub fn restart(&mut self) -> Result<(), EngineError> {
        let loaded = self.loaded_mut()?;
        loaded.state = EngineState::new(loaded.graph.start());
        debug!("restarted at '{}'", loaded.state.current_node_id);
        Ok(())
    }

    pub fn graph(&self) -> Result<&StoryGraph, EngineError> {
        Ok(&self.loaded()?.graph)
    }

    pub fn state(&self) -> Result<&EngineState, EngineError> {
        Ok(&self.loaded()?.state)
    }

    pub fn current_node_id(&self) -> Result<&str, EngineError> {
        Ok(self.loaded()?.state.current_node_id.as_str())
    }

    pub fn current_text(&self) -> Result<&str, EngineError> {
        Ok(self.current_node()?.text.as_str())
    }

    /// Choice labels of the current node. Empty at a terminal node.
    pub fn current_options(&self) -> Result<&[String], EngineError> {
        Ok(self.current_node()?.options.as_slice())
    }

    pub fn needs_illustration(&self) -> Result<bool, EngineError> {
        Ok(self.current_node()?.illustration_ref().is_some())
    }

    pub fn current_illustration(&self) -> Result<Option<&str>, EngineError> {
        Ok(self.current_node()?.illustration_ref())
    }

    pub fn needs_audio(&self) -> Result<bool, EngineError> {
        Ok(self.current_node()?.audio_ref().is_some())
    }

    pub fn current_audio(&self) -> Result<Option<&str>, EngineError> {
        Ok(self.current_node()?.audio_ref())
    }

    /// True at the terminal sentinel or at any node with no transitions.
    pub fn is_game_over(&self) -> Result<bool, EngineError> {
        let loaded = self.loaded()?;
        pacing::is_game_over(&loaded.graph, &loaded.state)
    }

    pub fn current_scene(&self) -> Result<Scene<'_>, EngineError> {
        let node = self.current_node()?;
        Ok(Scene {
            node_id: &node.id,
            text: &node.text,
            options: &node.options,
            illustration: node.illustration_ref(),
        })
    }

    /// Apply the player's 1-based choice.
    ///
    /// On error the state is left exactly as it was.
    pub fn handle_choice(&mut self, choice: usize) -> Result<Transition, EngineError> {
        let loaded = self.loaded.as_mut().ok_or(EngineError::NotLoaded)?;
        let step = pacing::advance(&loaded.graph, &loaded.state, choice, &mut *self.rng)?;
        Self::commit(loaded, step)
    }

    /// Jump to a random-pool node without touching the counters. At an
    /// ending this is a `GameOver` no-op.
    pub fn handle_random_encounter(&mut self) -> Result<Transition, EngineError> {
        let loaded = self.loaded.as_mut().ok_or(EngineError::NotLoaded)?;
        let step = pacing::draw_random_encounter(&loaded.graph, &loaded.state, &mut *self.rng)?;
        Self::commit(loaded, step)
    }

    fn commit(loaded: &mut Loaded, step: Step) -> Result<Transition, EngineError> {
        let game_over = pacing::is_game_over(&loaded.graph, &step.state)?;
        let from = std::mem::replace(&mut loaded.state, step.state);
        debug!(
            "{:?}: '{}' -> '{}' (plot {}, encounters {}/{})",
            step.kind,
            from.current_node_id,
            loaded.state.current_node_id,
            loaded.state.plot_point_counter,
            loaded.state.encounter_counter,
            loaded.graph.quota()
        );
        Ok(Transition {
            kind: step.kind,
            from: from.current_node_id,
            to: loaded.state.current_node_id.clone(),
            game_over,
        })
    }

    fn loaded(&self) -> Result<&Loaded, EngineError> {
        self.loaded.as_ref().ok_or(EngineError::NotLoaded)
    }

    fn loaded_mut(&mut self) -> Result<&mut Loaded, EngineError> {
        self.loaded.as_mut().ok_or(EngineError::NotLoaded)
    }

    fn current_node(&self) -> Result<&Node, EngineError> {
        let loaded = self.loaded()?;
        pacing::current_node(&loaded.graph, &loaded.state)
    }
}

impl NarrativeEngineBuilder {
    pub fn story_path(mut self, path: impl AsRef<Path>) -> Self {
        self.story_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Override the encounter quota from the story file.
    pub fn encounter_quota(mut self, quota: u32) -> Self {
        self.quota = Some(quota);
        self
    }

    /// Provide a story directly (for testing without files).
    pub fn with_story(mut self, story: StoryDocument) -> Self {
        self.story = Some(story);
        self
    }

    /// Provide the random source directly. Takes precedence over `seed`.
    pub fn with_random_source(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    /// Build the engine. It is loaded if a story or story path was given.
    pub fn build(self) -> Result<NarrativeEngine, EngineError> {
        let rng: Box<dyn RandomSource> = match (self.rng, self.seed) {
            (Some(rng), _) => rng,
            (None, Some(seed)) => Box::new(random::seeded(seed)),
            (None, None) => Box::new(random::from_entropy()),
        };

        let mut engine = NarrativeEngine {
            loaded: None,
            rng,
            quota_override: self.quota,
        };

        if let Some(story) = self.story {
            engine.load(story)?;
        } else if let Some(ref path) = self.story_path {
            engine.load_from_ron(path)?;
        }

        Ok(engine)
    }
}

//! Encounter pacing — the choice-handling state machine.
//!
//! Every function here is pure over `(graph, state, random source)`: it
//! returns the next `EngineState` and never mutates the one it was given.
//!
//! Policy, evaluated against the current node:
//!
//! 1. Random encounter: count it and follow the node's own transition.
//!    When the count reaches the quota it resets to zero, the main plot
//!    is unlocked, and a main encounter is drawn instead of the declared
//!    target.
//! 2. Non-random node with the plot unlocked (or a story with no random
//!    pool at all): follow the chosen transition and count a plot point.
//! 3. Any other non-random node: the choice value is ignored and a random
//!    encounter is drawn.

use log::{debug, info};

use crate::core::engine::EngineError;
use crate::core::graph::StoryGraph;
use crate::core::random::RandomSource;
use crate::core::state::EngineState;
use crate::schema::node::Node;

/// What kind of move a choice produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Followed a main-plot transition.
    Plot,
    /// Finished a random encounter and followed its transition.
    EncounterResolved,
    /// The quota gate diverted the player into a random encounter.
    Diverted,
    /// The quota was met and a main encounter was drawn.
    Escalated,
    /// Already at an ending; nothing changed.
    GameOver,
}

/// The result of one state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub state: EngineState,
    pub kind: TransitionKind,
}

/// Look up the node under the cursor.
pub fn current_node<'a>(
    graph: &'a StoryGraph,
    state: &EngineState,
) -> Result<&'a Node, EngineError> {
    graph
        .node(&state.current_node_id)
        .ok_or_else(|| EngineError::InvalidCursor(state.current_node_id.clone()))
}

/// True at the sentinel id or at any node without transitions.
pub fn is_game_over(graph: &StoryGraph, state: &EngineState) -> Result<bool, EngineError> {
    if state.current_node_id == graph.terminal_sentinel() {
        return Ok(true);
    }
    Ok(current_node(graph, state)?.is_terminal())
}

/// Apply a 1-based choice to `state`.
pub fn advance(
    graph: &StoryGraph,
    state: &EngineState,
    choice: usize,
    rng: &mut dyn RandomSource,
) -> Result<Step, EngineError> {
    if is_game_over(graph, state)? {
        return Ok(Step {
            state: state.clone(),
            kind: TransitionKind::GameOver,
        });
    }

    let node = current_node(graph, state)?;
    let target = node.successor(choice).ok_or(EngineError::OutOfRange {
        choice,
        max: node.options.len(),
    })?;

    if graph.is_random(&node.id) {
        let count = state.encounter_counter + 1;
        if count >= graph.quota() {
            let unlocked = EngineState {
                encounter_counter: 0,
                plot_unlocked: true,
                ..state.clone()
            };
            return escalate(graph, &unlocked, rng);
        }
        debug!(
            "encounter '{}' resolved ({}/{}), -> '{}'",
            node.id,
            count,
            graph.quota(),
            target
        );
        let mut next = state.at(target);
        next.encounter_counter = count;
        return Ok(Step {
            state: next,
            kind: TransitionKind::EncounterResolved,
        });
    }

    if state.plot_unlocked || graph.random_pool().is_empty() {
        debug!("plot point: '{}' -> '{}'", node.id, target);
        let mut next = state.at(target);
        next.plot_point_counter += 1;
        next.encounter_counter = 0;
        next.plot_unlocked = false;
        return Ok(Step {
            state: next,
            kind: TransitionKind::Plot,
        });
    }

    debug!(
        "choice {} at '{}' gated ({}/{} encounters)",
        choice,
        node.id,
        state.encounter_counter,
        graph.quota()
    );
    let step = draw_random_encounter(graph, state, rng)?;
    Ok(Step {
        kind: TransitionKind::Diverted,
        ..step
    })
}

/// Move the cursor to a uniformly drawn random-pool node. Counters are
/// left as they are. An ending is never left.
pub fn draw_random_encounter(
    graph: &StoryGraph,
    state: &EngineState,
    rng: &mut dyn RandomSource,
) -> Result<Step, EngineError> {
    if is_game_over(graph, state)? {
        return Ok(Step {
            state: state.clone(),
            kind: TransitionKind::GameOver,
        });
    }

    let pool = graph.random_pool();
    if pool.is_empty() {
        return Err(EngineError::EmptyRandomPool);
    }
    let id = &pool[rng.pick(pool.len())];
    debug!("random encounter drawn: '{}'", id);
    Ok(Step {
        state: state.at(id),
        kind: TransitionKind::Diverted,
    })
}

/// Move the cursor to a uniformly drawn main encounter, or to the hub
/// when the story tags none.
pub fn escalate(
    graph: &StoryGraph,
    state: &EngineState,
    rng: &mut dyn RandomSource,
) -> Result<Step, EngineError> {
    let mains = graph.main_encounters();
    let id = if mains.is_empty() {
        graph.hub().ok_or(EngineError::NoEscalationTarget)?
    } else {
        mains[rng.pick(mains.len())].as_str()
    };
    info!("encounter quota met, escalating to '{}'", id);
    Ok(Step {
        state: state.at(id),
        kind: TransitionKind::Escalated,
    })
}

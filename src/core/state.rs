//! Engine state — the single mutable value of a playthrough.

/// Cursor and pacing counters. Transitions build a new value rather than
/// mutating in place, so a failed choice leaves the old state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineState {
    pub current_node_id: String,
    /// Main-plot transitions taken. Never decreases.
    pub plot_point_counter: u32,
    /// Random encounters resolved since the last main-plot advance.
    pub encounter_counter: u32,
    /// Set when the encounter quota is met; the next choice on a
    /// non-random node advances the main plot and clears it.
    pub plot_unlocked: bool,
}

impl EngineState {
    pub fn new(start: &str) -> Self {
        Self {
            current_node_id: start.to_string(),
            plot_point_counter: 0,
            encounter_counter: 0,
            plot_unlocked: false,
        }
    }

    /// Same counters, cursor moved to `id`.
    pub fn at(&self, id: &str) -> Self {
        Self {
            current_node_id: id.to_string(),
            ..self.clone()
        }
    }
}

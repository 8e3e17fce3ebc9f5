//! Story Engine — a branching interactive-fiction runtime.
//!
//! Holds a validated graph of narrative nodes, tracks the player's
//! position, and paces the main plot behind a quota of random side
//! encounters. Rendering, input, and audio are left to the caller.

pub mod core;
pub mod schema;

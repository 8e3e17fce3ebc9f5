pub mod engine;
pub mod graph;
pub mod pacing;
pub mod random;
pub mod session;
pub mod state;

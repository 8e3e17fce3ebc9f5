pub mod node;
pub mod story;

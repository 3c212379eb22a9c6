pub mod node;
pub mod graph;
pub mod registry;
pub mod executor;

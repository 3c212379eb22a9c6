pub mod error;
pub mod config;
pub mod runtime;
pub mod sweep;
pub mod nodes;
pub mod dsl;
pub mod compiler;

pub use error::GraphError;
pub use config::{SweepConfig, DepthOrder, ResultRetention};
pub use runtime::graph::{Graph, PortRef, Connection};
pub use runtime::executor::{Executor, SequentialExecutor, ExecutionRequest, RunHint, DepthMap};
pub use runtime::node::{Node, NodeDefinition, PortTable};
pub use runtime::registry::NodeRegistry;
pub use sweep::orchestrator::Orchestrator;
pub use sweep::record::ExecutionRecord;
pub use sweep::sequencer::InputCombinations;

use crate::dsl::GraphDescription;
use crate::runtime::graph::PortRef;
use crate::runtime::registry::NodeRegistry;
use crate::sweep::orchestrator::Orchestrator;
use anyhow::{Result, Context as AnyhowContext};
use serde_json::Value;
use tracing::debug;

/// Turns a `GraphDescription` into a configured `Orchestrator` through its
/// public construction API.
pub struct Compiler {
    registry: NodeRegistry,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self::with_registry(NodeRegistry::with_builtins())
    }

    pub fn with_registry(registry: NodeRegistry) -> Self {
        Self { registry }
    }

    pub fn compile(&self, description: GraphDescription) -> Result<Orchestrator> {
        self.compile_into(description, Orchestrator::new())
    }

    /// Same as `compile` but builds on a caller-supplied orchestrator, e.g. one
    /// with a custom executor.
    pub fn compile_into(&self, description: GraphDescription, mut graph: Orchestrator) -> Result<Orchestrator> {
        graph.set_config(description.config.clone());

        // 1. Nodes, built with the first value of every listed parameter
        for node in &description.nodes {
            let mut init = Value::Object(node.options.clone());
            for param in &node.params {
                if let (Some(obj), Some(first)) = (init.as_object_mut(), param.values.first()) {
                    obj.insert(param.name.clone(), first.clone());
                }
            }
            let instance = self.registry.create(&node.kind, &node.id, init)
                .with_context(|| format!("Failed to create node {} of kind {}", node.id, node.kind))?;
            graph.add_node(instance)?;

            for param in &node.params {
                graph.set_swept_parameter(&node.id, &param.name, param.values.clone())
                    .with_context(|| format!("Invalid parameter {}.{}", node.id, param.name))?;
            }
        }

        // 2. Declared ports
        for port in &description.inputs {
            graph.declare_input_port(&port.node, &port.port)?;
        }
        for port in &description.outputs {
            graph.declare_output_port(&port.node, &port.port)?;
        }

        // 3. Connections
        for conn in &description.connections {
            let from: PortRef = conn.from.parse()?;
            let to: PortRef = conn.to.parse()?;
            graph.connect(&from.node, &from.port, &to.node, &to.port)
                .with_context(|| format!("Failed to connect {} -> {}", conn.from, conn.to))?;
        }

        if let Some(combinations) = description.combinations {
            graph.set_combinations(combinations)?;
        }

        debug!(
            nodes = graph.size(),
            inputs = graph.input_ports().len(),
            outputs = graph.output_ports().len(),
            "Graph compiled"
        );
        Ok(graph)
    }
}

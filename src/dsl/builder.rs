use crate::dsl::{GraphDescription, NodeDescription, ParamDescription, PortDescription, ConnectionDescription};
use crate::config::SweepConfig;
use crate::sweep::sequencer::InputCombinations;
use serde_json::Value;

pub struct GraphBuilder {
    nodes: Vec<NodeDescription>,
    inputs: Vec<PortDescription>,
    outputs: Vec<PortDescription>,
    connections: Vec<ConnectionDescription>,
    combinations: Option<InputCombinations>,
    config: SweepConfig,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            connections: Vec::new(),
            combinations: None,
            config: SweepConfig::default(),
        }
    }

    /// Adds a node with no parameters or options.
    pub fn node(mut self, id: &str, kind: &str) -> Self {
        self.nodes.push(NodeDescription {
            id: id.to_string(),
            kind: kind.to_string(),
            params: Vec::new(),
            options: serde_json::Map::new(),
        });
        self
    }

    /// Starts a node that takes parameters or options; finish with `build()`.
    pub fn configure(self, id: &str, kind: &str) -> NodeBuilder {
        NodeBuilder {
            graph_builder: self,
            node: NodeDescription {
                id: id.to_string(),
                kind: kind.to_string(),
                params: Vec::new(),
                options: serde_json::Map::new(),
            },
        }
    }

    pub fn input(mut self, node: &str, port: &str) -> Self {
        self.inputs.push(PortDescription { node: node.to_string(), port: port.to_string() });
        self
    }

    pub fn output(mut self, node: &str, port: &str) -> Self {
        self.outputs.push(PortDescription { node: node.to_string(), port: port.to_string() });
        self
    }

    /// `from` and `to` are `node.port` references.
    pub fn connect(mut self, from: &str, to: &str) -> Self {
        self.connections.push(ConnectionDescription { from: from.to_string(), to: to.to_string() });
        self
    }

    pub fn combinations(mut self, combinations: impl Into<InputCombinations>) -> Self {
        self.combinations = Some(combinations.into());
        self
    }

    pub fn config(mut self, config: SweepConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> GraphDescription {
        GraphDescription {
            nodes: self.nodes,
            inputs: self.inputs,
            outputs: self.outputs,
            connections: self.connections,
            combinations: self.combinations,
            config: self.config,
        }
    }
}

pub struct NodeBuilder {
    graph_builder: GraphBuilder,
    node: NodeDescription,
}

impl NodeBuilder {
    /// Fixed parameter value (a one-value sweep).
    pub fn param(self, name: &str, value: impl Into<Value>) -> Self {
        self.sweep(name, vec![value.into()])
    }

    pub fn sweep(mut self, name: &str, values: Vec<Value>) -> Self {
        self.node.params.push(ParamDescription { name: name.to_string(), values });
        self
    }

    pub fn option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.node.options.insert(key.to_string(), value.into());
        self
    }

    pub fn build(mut self) -> GraphBuilder {
        self.graph_builder.nodes.push(self.node);
        self.graph_builder
    }
}

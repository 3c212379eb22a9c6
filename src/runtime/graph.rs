use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::error::GraphError;
use crate::runtime::node::Node;

pub type NodeId = String;

/// `(node_id, port_name)`; also used for `(node_id, parameter_name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortRef {
    pub node: NodeId,
    pub port: String,
}

impl PortRef {
    pub fn new(node: &str, port: &str) -> Self {
        Self {
            node: node.to_string(),
            port: port.to_string(),
        }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.port)
    }
}

impl FromStr for PortRef {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((node, port)) if !node.is_empty() && !port.is_empty() => Ok(Self::new(node, port)),
            _ => Err(GraphError::InvalidPortRef(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub from: PortRef,
    pub to: PortRef,
}

/// Node registry plus connection topology.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Box<dyn Node>>,
    index: HashMap<NodeId, usize>,
    connections: Vec<Connection>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Box<dyn Node>) -> Result<(), GraphError> {
        let id = node.id().to_string();
        if self.index.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        self.index.insert(id, self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Registration position of a node.
    pub fn position(&self, id: &str) -> Result<usize, GraphError> {
        self.index.get(id).copied().ok_or_else(|| GraphError::UnknownNode(id.to_string()))
    }

    pub fn node(&self, id: &str) -> Result<&dyn Node, GraphError> {
        let idx = self.position(id)?;
        Ok(self.nodes[idx].as_ref())
    }

    pub fn node_mut(&mut self, id: &str) -> Result<&mut dyn Node, GraphError> {
        let idx = self.position(id)?;
        Ok(self.nodes[idx].as_mut())
    }

    pub(crate) fn node_at_mut(&mut self, idx: usize) -> &mut dyn Node {
        self.nodes[idx].as_mut()
    }

    /// Node ids in registration order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id())
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connect(&mut self, from: PortRef, to: PortRef) -> Result<(), GraphError> {
        self.check_output(&from)?;
        self.check_input(&to)?;
        self.connections.push(Connection { from, to });
        Ok(())
    }

    pub fn check_input(&self, port: &PortRef) -> Result<(), GraphError> {
        self.node(&port.node)?.input(&port.port).map(|_| ())
    }

    pub fn check_output(&self, port: &PortRef) -> Result<(), GraphError> {
        self.node(&port.node)?.output(&port.port).map(|_| ())
    }

    pub fn check_param(&self, key: &PortRef) -> Result<(), GraphError> {
        self.node(&key.node)?.param(&key.port).map(|_| ())
    }

    pub fn input_value(&self, port: &PortRef) -> Result<&Value, GraphError> {
        self.node(&port.node)?.input(&port.port)
    }

    pub fn output_value(&self, port: &PortRef) -> Result<&Value, GraphError> {
        self.node(&port.node)?.output(&port.port)
    }

    pub fn set_input(&mut self, port: &PortRef, value: Value) -> Result<(), GraphError> {
        self.node_mut(&port.node)?.set_input(&port.port, value)
    }

    pub fn set_param(&mut self, key: &PortRef, value: Value) -> Result<(), GraphError> {
        self.node_mut(&key.node)?.set_param(&key.port, value)
    }

    /// Copies every upstream output wired into node `idx` onto its inputs.
    pub(crate) fn pull_inputs(&mut self, idx: usize) -> Result<(), GraphError> {
        let id = self.nodes[idx].id().to_string();
        let mut pulled = Vec::new();
        for conn in self.connections.iter().filter(|c| c.to.node == id) {
            pulled.push((conn.to.port.clone(), self.output_value(&conn.from)?.clone()));
        }
        let node = self.nodes[idx].as_mut();
        for (port, value) in pulled {
            node.set_input(&port, value)?;
        }
        Ok(())
    }

    /// Edges as `(upstream, downstream)` registration positions.
    pub(crate) fn edges(&self) -> Vec<(usize, usize)> {
        self.connections.iter()
            .filter_map(|c| Some((*self.index.get(&c.from.node)?, *self.index.get(&c.to.node)?)))
            .collect()
    }
}

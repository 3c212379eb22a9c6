pub mod builder;

use serde::{Serialize, Deserialize};
use serde_json::Value;
use crate::config::SweepConfig;
use crate::sweep::sequencer::InputCombinations;

/// Serialized description of a graph and its sweep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphDescription {
    pub nodes: Vec<NodeDescription>,
    #[serde(default)]
    pub inputs: Vec<PortDescription>,
    #[serde(default)]
    pub outputs: Vec<PortDescription>,
    #[serde(default)]
    pub connections: Vec<ConnectionDescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combinations: Option<InputCombinations>,
    #[serde(default)]
    pub config: SweepConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDescription {
    pub id: String,
    /// Registered node kind (e.g. "constant", "and")
    pub kind: String,
    /// Swept parameters; the first value of each is also the initial value.
    #[serde(default)]
    pub params: Vec<ParamDescription>,
    /// Construction options handed to the node factory as-is.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub options: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParamDescription {
    pub name: String,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortDescription {
    pub node: String,
    pub port: String,
}

/// Edge written as `node.port` strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionDescription {
    pub from: String,
    pub to: String,
}

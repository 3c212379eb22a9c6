use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Snapshot of one tick: outputs aligned to the declared output ports, inputs
/// aligned to the declared input ports, and every swept parameter's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub outputs: Vec<Value>,
    pub inputs: Vec<Value>,
    pub params: BTreeMap<String, Value>,
}

impl ExecutionRecord {
    /// Value the transient output buffer stores for this record: the sole
    /// output, an array for several, nothing when no output is declared.
    pub fn captured(&self) -> Option<Value> {
        match self.outputs.as_slice() {
            [] => None,
            [single] => Some(single.clone()),
            many => Some(Value::Array(many.to_vec())),
        }
    }
}

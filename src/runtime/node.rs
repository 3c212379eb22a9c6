use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Debug;
use anyhow::Result;
use crate::error::GraphError;

/// Named parameters and ports of one node.
#[derive(Debug, Clone, Default)]
pub struct PortTable {
    params: BTreeMap<String, Value>,
    inputs: BTreeMap<String, Value>,
    outputs: BTreeMap<String, Value>,
}

impl PortTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, name: &str, default: Value) -> Self {
        self.params.insert(name.to_string(), default);
        self
    }

    pub fn with_input(mut self, name: &str) -> Self {
        self.inputs.insert(name.to_string(), Value::Null);
        self
    }

    pub fn with_output(mut self, name: &str) -> Self {
        self.outputs.insert(name.to_string(), Value::Null);
        self
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn input(&self, name: &str) -> Option<&Value> {
        self.inputs.get(name)
    }

    pub fn output(&self, name: &str) -> Option<&Value> {
        self.outputs.get(name)
    }

    pub fn param_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.params.get_mut(name)
    }

    pub fn input_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.inputs.get_mut(name)
    }

    pub fn output_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.outputs.get_mut(name)
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.keys().map(String::as_str)
    }

    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.keys().map(String::as_str)
    }

    /// Writes an output slot. Unknown names are ignored so that `process`
    /// implementations stay infallible for their own fixed ports.
    pub fn emit(&mut self, name: &str, value: Value) {
        if let Some(slot) = self.outputs.get_mut(name) {
            *slot = value;
        }
    }
}

/// Runtime node interface.
///
/// Implementors only expose their `PortTable`; the checked accessors are
/// provided on top of it.
pub trait Node: Send + Sync + Debug {
    fn id(&self) -> &str;
    fn kind(&self) -> &str;
    fn ports(&self) -> &PortTable;
    fn ports_mut(&mut self) -> &mut PortTable;

    /// Computes outputs from the current inputs and parameters.
    fn process(&mut self) -> Result<()>;

    fn param(&self, name: &str) -> Result<&Value, GraphError> {
        self.ports().param(name).ok_or_else(|| GraphError::UnknownParameter {
            node: self.id().to_string(),
            param: name.to_string(),
        })
    }

    fn set_param(&mut self, name: &str, value: Value) -> Result<(), GraphError> {
        let node = self.id().to_string();
        match self.ports_mut().param_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(GraphError::UnknownParameter { node, param: name.to_string() }),
        }
    }

    fn input(&self, name: &str) -> Result<&Value, GraphError> {
        self.ports().input(name).ok_or_else(|| GraphError::UnknownInput {
            node: self.id().to_string(),
            port: name.to_string(),
        })
    }

    fn set_input(&mut self, name: &str, value: Value) -> Result<(), GraphError> {
        let node = self.id().to_string();
        match self.ports_mut().input_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(GraphError::UnknownInput { node, port: name.to_string() }),
        }
    }

    fn output(&self, name: &str) -> Result<&Value, GraphError> {
        self.ports().output(name).ok_or_else(|| GraphError::UnknownOutput {
            node: self.id().to_string(),
            port: name.to_string(),
        })
    }
}

/// Node factory, resolved by kind tag at graph-build time.
pub trait NodeDefinition: Send + Sync {
    fn name(&self) -> &str;
    fn validate(&self, params: &Value) -> Result<()>;
    /// `params` is an object of initial parameter values; missing entries keep
    /// the node's defaults.
    fn prepare(&self, id: &str, params: Value) -> Result<Box<dyn Node>>;
}

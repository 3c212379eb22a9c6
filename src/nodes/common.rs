use crate::runtime::node::{Node, NodeDefinition, PortTable};
use crate::nodes::apply_initial_params;
use serde_json::{Value, json};
use anyhow::{Result, anyhow};
use tracing::info;

// --- CONSTANT ---

/// Emits its `value` parameter on `out`.
#[derive(Debug)]
pub struct ConstantNode {
    id: String,
    ports: PortTable,
}

pub struct ConstantDefinition;

impl NodeDefinition for ConstantDefinition {
    fn name(&self) -> &str { "constant" }
    fn validate(&self, _params: &Value) -> Result<()> { Ok(()) }
    fn prepare(&self, id: &str, params: Value) -> Result<Box<dyn Node>> {
        let mut ports = PortTable::new()
            .with_param("value", Value::Null)
            .with_output("out");
        apply_initial_params(id, &mut ports, &params, &[])?;
        Ok(Box::new(ConstantNode { id: id.to_string(), ports }))
    }
}

impl Node for ConstantNode {
    fn id(&self) -> &str { &self.id }
    fn kind(&self) -> &str { "constant" }
    fn ports(&self) -> &PortTable { &self.ports }
    fn ports_mut(&mut self) -> &mut PortTable { &mut self.ports }

    fn process(&mut self) -> Result<()> {
        let value = self.ports.param("value").cloned().unwrap_or(Value::Null);
        self.ports.emit("out", value);
        Ok(())
    }
}

// --- PASSTHROUGH ---

#[derive(Debug)]
pub struct PassthroughNode {
    id: String,
    ports: PortTable,
}

pub struct PassthroughDefinition;

impl NodeDefinition for PassthroughDefinition {
    fn name(&self) -> &str { "passthrough" }
    fn validate(&self, _params: &Value) -> Result<()> { Ok(()) }
    fn prepare(&self, id: &str, params: Value) -> Result<Box<dyn Node>> {
        let mut ports = PortTable::new()
            .with_input("in")
            .with_output("out");
        apply_initial_params(id, &mut ports, &params, &[])?;
        Ok(Box::new(PassthroughNode { id: id.to_string(), ports }))
    }
}

impl Node for PassthroughNode {
    fn id(&self) -> &str { &self.id }
    fn kind(&self) -> &str { "passthrough" }
    fn ports(&self) -> &PortTable { &self.ports }
    fn ports_mut(&mut self) -> &mut PortTable { &mut self.ports }

    fn process(&mut self) -> Result<()> {
        let value = self.ports.input("in").cloned().unwrap_or(Value::Null);
        self.ports.emit("out", value);
        Ok(())
    }
}

// --- COUNTER ---

/// Counts how many times it was processed, starting from the `count` parameter.
#[derive(Debug)]
pub struct CounterNode {
    id: String,
    ports: PortTable,
    ticks: i64,
}

pub struct CounterDefinition;

impl NodeDefinition for CounterDefinition {
    fn name(&self) -> &str { "counter" }
    fn validate(&self, params: &Value) -> Result<()> {
        match params.get("count") {
            Some(v) if !v.is_i64() => Err(anyhow!("counter 'count' must be an integer, got {}", v)),
            _ => Ok(()),
        }
    }
    fn prepare(&self, id: &str, params: Value) -> Result<Box<dyn Node>> {
        let mut ports = PortTable::new()
            .with_param("count", json!(0))
            .with_input("input")
            .with_output("count");
        apply_initial_params(id, &mut ports, &params, &[])?;
        Ok(Box::new(CounterNode { id: id.to_string(), ports, ticks: 0 }))
    }
}

impl Node for CounterNode {
    fn id(&self) -> &str { &self.id }
    fn kind(&self) -> &str { "counter" }
    fn ports(&self) -> &PortTable { &self.ports }
    fn ports_mut(&mut self) -> &mut PortTable { &mut self.ports }

    fn process(&mut self) -> Result<()> {
        let seed = self.ports.param("count")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| anyhow!("counter {} has a non-integer 'count'", self.id))?;
        self.ticks += 1;
        self.ports.emit("count", json!(seed + self.ticks));
        Ok(())
    }
}

// --- LOG ---

/// Logs `in` and forwards it to `out`.
#[derive(Debug)]
pub struct LogNode {
    id: String,
    ports: PortTable,
}

pub struct LogDefinition;

impl NodeDefinition for LogDefinition {
    fn name(&self) -> &str { "log" }
    fn validate(&self, _params: &Value) -> Result<()> { Ok(()) }
    fn prepare(&self, id: &str, params: Value) -> Result<Box<dyn Node>> {
        let mut ports = PortTable::new()
            .with_param("label", Value::Null)
            .with_input("in")
            .with_output("out");
        apply_initial_params(id, &mut ports, &params, &[])?;
        Ok(Box::new(LogNode { id: id.to_string(), ports }))
    }
}

impl Node for LogNode {
    fn id(&self) -> &str { &self.id }
    fn kind(&self) -> &str { "log" }
    fn ports(&self) -> &PortTable { &self.ports }
    fn ports_mut(&mut self) -> &mut PortTable { &mut self.ports }

    fn process(&mut self) -> Result<()> {
        let value = self.ports.input("in").cloned().unwrap_or(Value::Null);
        match self.ports.param("label").and_then(|v| v.as_str()) {
            Some(label) => info!("[LOG] {}: {}", label, value),
            None => info!("[LOG] {}: {}", self.id, value),
        }
        self.ports.emit("out", value);
        Ok(())
    }
}

use crate::runtime::node::{Node, NodeDefinition, PortTable};
use crate::nodes::apply_initial_params;
use serde_json::{Value, json};
use anyhow::{Result, anyhow};
use evalexpr::{build_operator_tree, Node as EvalNode, ContextWithMutableVariables, HashMapContext, DefaultNumericTypes};

// --- AND ---

/// Logical AND of `in1` and `in2`. An unset input counts as `false`.
#[derive(Debug)]
pub struct AndNode {
    id: String,
    ports: PortTable,
}

pub struct AndDefinition;

impl NodeDefinition for AndDefinition {
    fn name(&self) -> &str { "and" }
    fn validate(&self, _params: &Value) -> Result<()> { Ok(()) }
    fn prepare(&self, id: &str, params: Value) -> Result<Box<dyn Node>> {
        let mut ports = PortTable::new()
            .with_input("in1")
            .with_input("in2")
            .with_output("out");
        apply_initial_params(id, &mut ports, &params, &[])?;
        Ok(Box::new(AndNode { id: id.to_string(), ports }))
    }
}

impl AndNode {
    fn operand(&self, port: &str) -> Result<bool> {
        match self.ports.input(port) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(anyhow!("and {}: input '{}' is not a boolean: {}", self.id, port, other)),
        }
    }
}

impl Node for AndNode {
    fn id(&self) -> &str { &self.id }
    fn kind(&self) -> &str { "and" }
    fn ports(&self) -> &PortTable { &self.ports }
    fn ports_mut(&mut self) -> &mut PortTable { &mut self.ports }

    fn process(&mut self) -> Result<()> {
        let result = self.operand("in1")? && self.operand("in2")?;
        self.ports.emit("out", json!(result));
        Ok(())
    }
}

// --- EXPRESSION ---

/// Evaluates the `expression` parameter over the node's inputs.
///
/// Input port names come from the `inputs` construction option, e.g.
/// `{"inputs": ["a", "b"], "expression": "a * b + 1"}`.
#[derive(Debug)]
pub struct ExpressionNode {
    id: String,
    ports: PortTable,
    inputs: Vec<String>,
    // Compiled form of the last seen expression text.
    compiled: Option<(String, EvalNode)>,
}

pub struct ExpressionDefinition;

impl NodeDefinition for ExpressionDefinition {
    fn name(&self) -> &str { "expression" }

    fn validate(&self, params: &Value) -> Result<()> {
        if let Some(inputs) = params.get("inputs") {
            let names = inputs.as_array().ok_or_else(|| anyhow!("'inputs' must be a list of port names"))?;
            if names.iter().any(|n| !n.is_string()) {
                return Err(anyhow!("'inputs' must be a list of port names"));
            }
        }
        if let Some(expr) = params.get("expression").and_then(|v| v.as_str()) {
            build_operator_tree::<DefaultNumericTypes>(expr)?;
        }
        Ok(())
    }

    fn prepare(&self, id: &str, params: Value) -> Result<Box<dyn Node>> {
        let inputs: Vec<String> = params.get("inputs")
            .and_then(|v| v.as_array())
            .map(|list| list.iter().filter_map(|n| n.as_str().map(str::to_string)).collect())
            .unwrap_or_default();

        let mut ports = PortTable::new()
            .with_param("expression", Value::Null)
            .with_output("out");
        for name in &inputs {
            ports = ports.with_input(name);
        }
        apply_initial_params(id, &mut ports, &params, &["inputs"])?;

        Ok(Box::new(ExpressionNode { id: id.to_string(), ports, inputs, compiled: None }))
    }
}

fn to_eval(value: &Value) -> Option<evalexpr::Value> {
    match value {
        Value::Null => Some(evalexpr::Value::Empty),
        Value::Bool(b) => Some(evalexpr::Value::Boolean(*b)),
        Value::String(s) => Some(evalexpr::Value::String(s.clone())),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() { Some(evalexpr::Value::Int(i)) }
            else { n.as_f64().map(evalexpr::Value::Float) }
        }
        Value::Array(items) => items.iter().map(to_eval).collect::<Option<Vec<_>>>().map(evalexpr::Value::Tuple),
        Value::Object(_) => None,
    }
}

fn from_eval(value: evalexpr::Value) -> Value {
    match value {
        evalexpr::Value::String(s) => Value::String(s),
        evalexpr::Value::Int(i) => json!(i),
        evalexpr::Value::Float(f) => json!(f),
        evalexpr::Value::Boolean(b) => Value::Bool(b),
        evalexpr::Value::Tuple(items) => Value::Array(items.into_iter().map(from_eval).collect()),
        _ => Value::Null,
    }
}

impl Node for ExpressionNode {
    fn id(&self) -> &str { &self.id }
    fn kind(&self) -> &str { "expression" }
    fn ports(&self) -> &PortTable { &self.ports }
    fn ports_mut(&mut self) -> &mut PortTable { &mut self.ports }

    fn process(&mut self) -> Result<()> {
        let text = self.ports.param("expression")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("expression {} has no 'expression' text", self.id))?
            .to_string();

        let stale = !matches!(&self.compiled, Some((src, _)) if *src == text);
        if stale {
            let tree = build_operator_tree::<DefaultNumericTypes>(&text)?;
            self.compiled = Some((text, tree));
        }

        let mut ctx = HashMapContext::<DefaultNumericTypes>::new();
        for name in &self.inputs {
            let raw = self.ports.input(name).unwrap_or(&Value::Null);
            let value = to_eval(raw)
                .ok_or_else(|| anyhow!("expression {}: input '{}' cannot be evaluated: {}", self.id, name, raw))?;
            ctx.set_value(name.clone(), value)?;
        }

        let (_, tree) = self.compiled.as_ref()
            .ok_or_else(|| anyhow!("expression {} failed to compile", self.id))?;
        let result = tree.eval_with_context(&ctx)?;
        self.ports.emit("out", from_eval(result));
        Ok(())
    }
}

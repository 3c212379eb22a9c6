use std::collections::HashMap;
use std::sync::Arc;
use serde_json::Value;
use anyhow::{Result, anyhow};
use crate::runtime::node::{Node, NodeDefinition};
use crate::nodes::common::{ConstantDefinition, PassthroughDefinition, CounterDefinition, LogDefinition};
use crate::nodes::logic::{AndDefinition, ExpressionDefinition};

/// Kind tag -> node factory table.
#[derive(Clone, Default)]
pub struct NodeRegistry {
    definitions: HashMap<String, Arc<dyn NodeDefinition>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ConstantDefinition));
        registry.register(Arc::new(PassthroughDefinition));
        registry.register(Arc::new(CounterDefinition));
        registry.register(Arc::new(LogDefinition));
        registry.register(Arc::new(AndDefinition));
        registry.register(Arc::new(ExpressionDefinition));
        registry
    }

    pub fn register(&mut self, definition: Arc<dyn NodeDefinition>) {
        self.definitions.insert(definition.name().to_string(), definition);
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.definitions.contains_key(kind)
    }

    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn create(&self, kind: &str, id: &str, params: Value) -> Result<Box<dyn Node>> {
        let def = self.definitions.get(kind)
            .ok_or_else(|| anyhow!("Node definition not found: {}", kind))?;
        def.validate(&params)?;
        def.prepare(id, params)
    }
}

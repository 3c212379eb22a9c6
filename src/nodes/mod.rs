pub mod common;
pub mod logic;

use anyhow::{Result, anyhow};
use serde_json::Value;
use crate::runtime::node::PortTable;

/// Copies initial parameter values from a `prepare` params object onto a port
/// table. Keys listed in `options` are construction settings, not parameters.
pub(crate) fn apply_initial_params(id: &str, ports: &mut PortTable, params: &Value, options: &[&str]) -> Result<()> {
    let obj = match params {
        Value::Null => return Ok(()),
        Value::Object(obj) => obj,
        other => return Err(anyhow!("Params for node {} must be an object, got {}", id, other)),
    };
    for (name, value) in obj {
        if options.contains(&name.as_str()) {
            continue;
        }
        let slot = ports.param_mut(name)
            .ok_or_else(|| anyhow!("Node {} has no parameter '{}'", id, name))?;
        *slot = value.clone();
    }
    Ok(())
}

//! Mixed-radix counter over parameter domains.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use crate::config::DepthOrder;
use crate::error::GraphError;
use crate::runtime::executor::DepthMap;
use crate::runtime::graph::{NodeId, PortRef};

#[derive(Debug, Clone)]
struct Domain {
    key: PortRef,
    values: Vec<Value>,
    index: usize,
}

impl Domain {
    fn current(&self) -> &Value {
        &self.values[self.index]
    }

    fn at_last(&self) -> bool {
        self.index + 1 == self.values.len()
    }
}

/// Walks the Cartesian product of all registered domains, one digit per
/// domain. `order[0]` is the least significant digit.
#[derive(Debug, Clone, Default)]
pub struct ParameterSweep {
    domains: Vec<Domain>,
    order: Vec<usize>,
}

impl ParameterSweep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the domain for `key` and returns its first value.
    /// A replaced domain keeps its registration position.
    pub fn register_domain(&mut self, key: PortRef, values: Vec<Value>) -> Result<&Value, GraphError> {
        if values.is_empty() {
            return Err(GraphError::EmptyDomain(key.to_string()));
        }
        let slot = match self.domains.iter().position(|d| d.key == key) {
            Some(slot) => {
                self.domains[slot].values = values;
                self.domains[slot].index = 0;
                slot
            }
            None => {
                self.domains.push(Domain { key, values, index: 0 });
                self.order.push(self.domains.len() - 1);
                self.domains.len() - 1
            }
        };
        Ok(self.domains[slot].current())
    }

    /// Ranks domains by the depth of their node, ties kept in registration
    /// order. Nodes absent from `depths` rank as depth 0.
    pub fn finalize_ordering(&mut self, depths: &DepthMap, direction: DepthOrder) {
        let ranks: Vec<usize> = self.domains.iter()
            .map(|d| match depths.get(&d.key.node) {
                Some(depth) => *depth,
                None => {
                    warn!(node = %d.key.node, "Swept node missing from depth map");
                    0
                }
            })
            .collect();
        let mut order: Vec<usize> = (0..self.domains.len()).collect();
        match direction {
            DepthOrder::Ascending => order.sort_by_key(|&i| ranks[i]),
            DepthOrder::Descending => order.sort_by_key(|&i| Reverse(ranks[i])),
        }
        self.order = order;
    }

    /// Moves to the next combination and returns the nodes whose parameter
    /// value changed. `None` once every combination has been produced; the
    /// state is then left untouched until `reset`.
    pub fn advance(&mut self) -> Option<Vec<NodeId>> {
        if self.domains.iter().all(Domain::at_last) {
            return None;
        }

        let mut changed: Vec<NodeId> = Vec::new();
        for &slot in &self.order {
            let domain = &mut self.domains[slot];
            let before = domain.index;
            domain.index += 1;
            let carry = domain.index == domain.values.len();
            if carry {
                domain.index = 0;
            }
            if domain.index != before && !changed.contains(&domain.key.node) {
                changed.push(domain.key.node.clone());
            }
            if !carry {
                break;
            }
        }
        Some(changed)
    }

    pub fn reset(&mut self) {
        for domain in &mut self.domains {
            domain.index = 0;
        }
    }

    /// `"node.param" -> value` for every registered domain.
    pub fn current_assignment(&self) -> BTreeMap<String, Value> {
        self.domains.iter()
            .map(|d| (d.key.to_string(), d.current().clone()))
            .collect()
    }

    /// Current value of every domain, in registration order.
    pub fn bindings(&self) -> Vec<(PortRef, Value)> {
        self.domains.iter()
            .map(|d| (d.key.clone(), d.current().clone()))
            .collect()
    }

    /// Keys in digit order, least significant first.
    pub fn digit_order(&self) -> Vec<&PortRef> {
        self.order.iter().map(|&i| &self.domains[i].key).collect()
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Number of combinations in one full sweep (1 with no domains).
    pub fn combinations(&self) -> usize {
        self.domains.iter().map(|d| d.values.len()).product()
    }
}

use std::collections::VecDeque;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::error::GraphError;
use crate::runtime::graph::{Graph, PortRef};

/// One or more full input assignments. A flat array is one tuple, except
/// on a single declared port where it queues each element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputCombinations {
    List(Vec<Vec<Value>>),
    Tuple(Vec<Value>),
    Scalar(Value),
}

impl From<Value> for InputCombinations {
    fn from(value: Value) -> Self {
        InputCombinations::Scalar(value)
    }
}

impl From<Vec<Value>> for InputCombinations {
    fn from(values: Vec<Value>) -> Self {
        InputCombinations::Tuple(values)
    }
}

impl From<Vec<Vec<Value>>> for InputCombinations {
    fn from(list: Vec<Vec<Value>>) -> Self {
        InputCombinations::List(list)
    }
}

impl InputCombinations {
    /// With a single declared port a flat array is a queue of values, one
    /// assignment per element.
    fn normalize(self, ports: usize) -> Vec<Vec<Value>> {
        match self {
            InputCombinations::List(list) => list,
            InputCombinations::Tuple(values) if ports == 1 => values.into_iter().map(|v| vec![v]).collect(),
            InputCombinations::Tuple(values) => vec![values],
            InputCombinations::Scalar(value) => vec![vec![value]],
        }
    }
}

/// Declared graph inputs plus the queue of assignments still to try.
#[derive(Debug, Clone, Default)]
pub struct InputSequencer {
    ports: Vec<PortRef>,
    current: Vec<Option<Value>>,
    pending: VecDeque<Vec<Value>>,
}

impl InputSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_port(&mut self, port: PortRef) {
        self.ports.push(port);
        self.current.push(None);
    }

    pub fn ports(&self) -> &[PortRef] {
        &self.ports
    }

    /// Number of declared input ports.
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Assignments still queued behind the current one.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Replaces the queue and applies its first assignment. Every assignment
    /// is shape-checked before anything changes.
    pub fn set_combinations(&mut self, combinations: InputCombinations) -> Result<(), GraphError> {
        if self.ports.is_empty() {
            return Err(GraphError::NoInputDeclared);
        }
        let list = combinations.normalize(self.ports.len());
        if list.is_empty() {
            return Err(GraphError::EmptyCombinations);
        }
        if let Some(bad) = list.iter().find(|c| c.len() != self.ports.len()) {
            return Err(GraphError::ArityMismatch { expected: self.ports.len(), got: bad.len() });
        }
        self.pending = list.into();
        self.advance_to_next();
        Ok(())
    }

    /// Applies the next queued assignment; `false` when the queue is empty.
    pub fn advance_to_next(&mut self) -> bool {
        match self.pending.pop_front() {
            Some(combination) => {
                self.current = combination.into_iter().map(Some).collect();
                true
            }
            None => false,
        }
    }

    /// Binds a single declared slot, leaving the queue alone.
    pub fn set_slot(&mut self, index: usize, value: Value) -> Result<(), GraphError> {
        let declared = self.ports.len();
        let slot = self.current.get_mut(index)
            .ok_or(GraphError::InputSlotOutOfRange { index, declared })?;
        *slot = Some(value);
        Ok(())
    }

    /// Bound slots as `(port, value)` pairs, in declaration order.
    pub fn bindings(&self) -> Vec<(PortRef, Value)> {
        self.ports.iter()
            .zip(&self.current)
            .filter_map(|(port, value)| value.as_ref().map(|v| (port.clone(), v.clone())))
            .collect()
    }

    /// Live value of each declared port, in declaration order.
    pub fn current_values(&self, graph: &Graph) -> Result<Vec<Value>, GraphError> {
        self.ports.iter()
            .map(|port| graph.input_value(port).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_ports() -> InputSequencer {
        let mut seq = InputSequencer::new();
        seq.declare_port(PortRef::new("and", "in1"));
        seq.declare_port(PortRef::new("and", "in2"));
        seq
    }

    #[test]
    fn test_requires_declared_ports() {
        let mut seq = InputSequencer::new();
        let err = seq.set_combinations(json!(true).into()).unwrap_err();
        assert!(matches!(err, GraphError::NoInputDeclared));
    }

    #[test]
    fn test_first_combination_is_applied_immediately() {
        let mut seq = two_ports();
        seq.set_combinations(vec![
            vec![json!(true), json!(false)],
            vec![json!(true), json!(true)],
        ].into()).unwrap();

        assert_eq!(seq.remaining(), 1);
        assert_eq!(seq.bindings(), vec![
            (PortRef::new("and", "in1"), json!(true)),
            (PortRef::new("and", "in2"), json!(false)),
        ]);

        assert!(seq.advance_to_next());
        assert_eq!(seq.bindings()[1].1, json!(true));
        assert!(!seq.advance_to_next());
        // the last assignment stays bound after exhaustion
        assert_eq!(seq.bindings()[1].1, json!(true));
    }

    #[test]
    fn test_scalar_needs_exactly_one_port() {
        let mut seq = two_ports();
        let err = seq.set_combinations(json!(10).into()).unwrap_err();
        assert!(matches!(err, GraphError::ArityMismatch { expected: 2, got: 1 }));

        let mut single = InputSequencer::new();
        single.declare_port(PortRef::new("pt", "in"));
        single.set_combinations(json!(10).into()).unwrap();
        assert_eq!(single.bindings(), vec![(PortRef::new("pt", "in"), json!(10))]);
    }

    #[test]
    fn test_flat_array_queues_values_for_single_port() {
        let mut single = InputSequencer::new();
        single.declare_port(PortRef::new("pt", "in"));
        let flat: InputCombinations = serde_json::from_value(json!([10, 20, 30])).unwrap();
        single.set_combinations(flat).unwrap();

        assert_eq!(single.bindings(), vec![(PortRef::new("pt", "in"), json!(10))]);
        assert_eq!(single.remaining(), 2);
        assert!(single.advance_to_next());
        assert_eq!(single.bindings()[0].1, json!(20));

        // two ports still read a flat array as one tuple
        let mut seq = two_ports();
        seq.set_combinations(vec![json!(1), json!(2)].into()).unwrap();
        assert_eq!(seq.remaining(), 0);
    }

    #[test]
    fn test_bad_shape_leaves_queue_untouched() {
        let mut seq = two_ports();
        seq.set_combinations(vec![vec![json!(1), json!(2)], vec![json!(3), json!(4)]].into()).unwrap();
        let err = seq.set_combinations(vec![vec![json!(1), json!(2)], vec![json!(3)]].into()).unwrap_err();
        assert!(matches!(err, GraphError::ArityMismatch { expected: 2, got: 1 }));
        assert_eq!(seq.remaining(), 1);
        assert_eq!(seq.bindings()[0].1, json!(1));
    }

    #[test]
    fn test_set_slot() {
        let mut seq = two_ports();
        assert!(seq.bindings().is_empty());
        seq.set_slot(1, json!(true)).unwrap();
        assert_eq!(seq.bindings(), vec![(PortRef::new("and", "in2"), json!(true))]);
        assert!(matches!(
            seq.set_slot(2, json!(true)),
            Err(GraphError::InputSlotOutOfRange { index: 2, declared: 2 })
        ));
    }

    #[test]
    fn test_untagged_deserialization() {
        let list: InputCombinations = serde_json::from_value(json!([[1, 2], [3, 4]])).unwrap();
        assert_eq!(list, InputCombinations::List(vec![vec![json!(1), json!(2)], vec![json!(3), json!(4)]]));
        let tuple: InputCombinations = serde_json::from_value(json!([1, 2])).unwrap();
        assert_eq!(tuple, InputCombinations::Tuple(vec![json!(1), json!(2)]));
        let scalar: InputCombinations = serde_json::from_value(json!(7)).unwrap();
        assert_eq!(scalar, InputCombinations::Scalar(json!(7)));
    }
}

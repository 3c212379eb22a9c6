use std::collections::{BinaryHeap, HashMap, HashSet};
use std::cmp::Reverse;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, trace};
use crate::error::GraphError;
use crate::runtime::graph::{Graph, NodeId, PortRef};

/// `node_id -> topological distance from the sources`.
pub type DepthMap = HashMap<NodeId, usize>;

/// Which nodes the executor is asked to (re)process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunHint {
    Full,
    Changed(Vec<NodeId>),
}

/// Everything one tick needs: the hint plus the explicit assignment in effect.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub hint: RunHint,
    /// `(node, parameter)` -> value, for every swept parameter.
    pub parameters: Vec<(PortRef, Value)>,
    /// Declared input port -> value, for every bound input slot.
    pub inputs: Vec<(PortRef, Value)>,
}

impl ExecutionRequest {
    /// Writes the assignment onto the graph's nodes.
    pub fn bind(&self, graph: &mut Graph) -> Result<(), GraphError> {
        for (key, value) in &self.parameters {
            graph.set_param(key, value.clone())?;
        }
        for (port, value) in &self.inputs {
            graph.set_input(port, value.clone())?;
        }
        Ok(())
    }
}

/// Runs a wired graph. Incremental optimisation is the executor's business;
/// callers only forward hints.
#[async_trait]
pub trait Executor: Send {
    fn depth_map(&self, graph: &Graph) -> Result<DepthMap, GraphError>;
    async fn execute(&mut self, graph: &mut Graph, request: &ExecutionRequest) -> Result<(), GraphError>;
}

/// Processes nodes one after another in topological order.
#[derive(Debug, Default)]
pub struct SequentialExecutor;

impl SequentialExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Kahn's algorithm; ready nodes are taken in registration order.
    pub fn topological_order(graph: &Graph) -> Result<Vec<usize>, GraphError> {
        let edges = graph.edges();
        let mut in_degree = vec![0usize; graph.len()];
        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); graph.len()];
        for &(from, to) in &edges {
            in_degree[to] += 1;
            outgoing[from].push(to);
        }

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree.iter()
            .enumerate()
            .filter(|&(_, d)| *d == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(graph.len());
        while let Some(Reverse(idx)) = ready.pop() {
            order.push(idx);
            for &next in &outgoing[idx] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if order.len() != graph.len() {
            let ids: Vec<&str> = graph.node_ids().collect();
            let stuck = in_degree.iter()
                .enumerate()
                .filter(|&(_, d)| *d > 0)
                .map(|(i, _)| ids[i].to_string())
                .collect();
            return Err(GraphError::Cycle(stuck));
        }
        Ok(order)
    }

    /// Nodes to process for `hint`, as a membership mask over registration positions.
    fn dirty_set(graph: &Graph, order: &[usize], hint: &RunHint) -> Vec<bool> {
        let changed: HashSet<&str> = match hint {
            RunHint::Full => return vec![true; graph.len()],
            RunHint::Changed(ids) => ids.iter().map(String::as_str).collect(),
        };
        let ids: Vec<&str> = graph.node_ids().collect();
        let edges = graph.edges();
        let mut dirty = vec![false; graph.len()];
        for &idx in order {
            dirty[idx] = changed.contains(ids[idx])
                || edges.iter().any(|&(from, to)| to == idx && dirty[from]);
        }
        dirty
    }
}

#[async_trait]
impl Executor for SequentialExecutor {
    fn depth_map(&self, graph: &Graph) -> Result<DepthMap, GraphError> {
        let order = Self::topological_order(graph)?;
        let edges = graph.edges();
        let mut depth = vec![0usize; graph.len()];
        for &idx in &order {
            for &(from, to) in &edges {
                if from == idx {
                    depth[to] = depth[to].max(depth[idx] + 1);
                }
            }
        }
        Ok(graph.node_ids()
            .zip(depth)
            .map(|(id, d)| (id.to_string(), d))
            .collect())
    }

    async fn execute(&mut self, graph: &mut Graph, request: &ExecutionRequest) -> Result<(), GraphError> {
        request.bind(graph)?;

        let order = Self::topological_order(graph)?;
        let dirty = Self::dirty_set(graph, &order, &request.hint);
        debug!(hint = ?request.hint, scheduled = dirty.iter().filter(|d| **d).count(), "Executing graph");

        for idx in order {
            if !dirty[idx] {
                continue;
            }
            graph.pull_inputs(idx)?;
            let node = graph.node_at_mut(idx);
            trace!(node = node.id(), kind = node.kind(), "Processing node");
            if let Err(source) = node.process() {
                return Err(GraphError::NodeFailed { node: node.id().to_string(), source });
            }
        }
        Ok(())
    }
}

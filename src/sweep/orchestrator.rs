use serde_json::Value;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;
use crate::config::{ResultRetention, SweepConfig};
use crate::error::GraphError;
use crate::runtime::executor::{DepthMap, ExecutionRequest, Executor, RunHint, SequentialExecutor};
use crate::runtime::graph::{Graph, PortRef};
use crate::runtime::node::Node;
use crate::sweep::enumerator::ParameterSweep;
use crate::sweep::record::ExecutionRecord;
use crate::sweep::sequencer::{InputCombinations, InputSequencer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Wired graph: the executor supplies depths and receives change hints.
    Connected,
    /// No connections: every node runs every tick.
    Isolated,
}

/// Owns a graph and sweeps it over every declared input assignment times
/// every parameter combination, one executor call per combination.
pub struct Orchestrator {
    graph: Graph,
    executor: Box<dyn Executor>,
    inputs: InputSequencer,
    outputs: Vec<PortRef>,
    sweep: ParameterSweep,
    config: SweepConfig,
    output_buffer: Vec<Value>,
    results: Vec<ExecutionRecord>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("graph", &self.graph)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("sweep", &self.sweep)
            .field("config", &self.config)
            .field("output_buffer", &self.output_buffer)
            .field("results", &self.results)
            .finish_non_exhaustive()
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            executor: Box::new(SequentialExecutor::new()),
            inputs: InputSequencer::new(),
            outputs: Vec::new(),
            sweep: ParameterSweep::new(),
            config: SweepConfig::default(),
            output_buffer: Vec::new(),
            results: Vec::new(),
        }
    }

    pub fn with_executor(mut self, executor: impl Executor + 'static) -> Self {
        self.executor = Box::new(executor);
        self
    }

    pub fn with_config(mut self, config: SweepConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SweepConfig) {
        self.config = config;
    }

    // --- graph construction ---

    pub fn add_node(&mut self, node: Box<dyn Node>) -> Result<(), GraphError> {
        debug!(node = node.id(), kind = node.kind(), "Adding node");
        self.graph.add_node(node)
    }

    pub fn connect(&mut self, from_node: &str, from_port: &str, to_node: &str, to_port: &str) -> Result<(), GraphError> {
        self.graph.connect(PortRef::new(from_node, from_port), PortRef::new(to_node, to_port))
    }

    pub fn declare_input_port(&mut self, node: &str, port: &str) -> Result<(), GraphError> {
        let port = PortRef::new(node, port);
        self.graph.check_input(&port)?;
        self.inputs.declare_port(port);
        Ok(())
    }

    pub fn declare_output_port(&mut self, node: &str, port: &str) -> Result<(), GraphError> {
        let port = PortRef::new(node, port);
        self.graph.check_output(&port)?;
        self.outputs.push(port);
        Ok(())
    }

    pub fn input_ports(&self) -> &[PortRef] {
        self.inputs.ports()
    }

    pub fn output_ports(&self) -> &[PortRef] {
        &self.outputs
    }

    /// Drops every declared input port along with any queued assignment.
    pub fn clear_input_ports(&mut self) {
        self.inputs = InputSequencer::new();
    }

    pub fn set_swept_parameter(&mut self, node: &str, param: &str, values: Vec<Value>) -> Result<(), GraphError> {
        let key = PortRef::new(node, param);
        self.graph.check_param(&key)?;
        let first = self.sweep.register_domain(key.clone(), values)?.clone();
        self.graph.set_param(&key, first)
    }

    // --- inputs ---

    pub fn set_combinations(&mut self, combinations: impl Into<InputCombinations>) -> Result<(), GraphError> {
        self.inputs.set_combinations(combinations.into())?;
        self.mirror_inputs()
    }

    /// Shorthand for graphs with exactly one declared input: an array queues
    /// each element as its own assignment, anything else binds the port.
    pub fn set_input(&mut self, value: Value) -> Result<(), GraphError> {
        if self.inputs.len() != 1 {
            return Err(GraphError::SingleInputRequired(self.inputs.len()));
        }
        match value {
            Value::Array(items) => {
                let list: Vec<Vec<Value>> = items.into_iter().map(|v| vec![v]).collect();
                self.set_combinations(list)
            }
            other => self.set_input_slot(0, other),
        }
    }

    pub fn set_input_slot(&mut self, index: usize, value: Value) -> Result<(), GraphError> {
        self.inputs.set_slot(index, value)?;
        self.mirror_inputs()
    }

    fn mirror_inputs(&mut self) -> Result<(), GraphError> {
        for (port, value) in self.inputs.bindings() {
            self.graph.set_input(&port, value)?;
        }
        Ok(())
    }

    // --- accessors ---

    /// Number of registered nodes.
    pub fn size(&self) -> usize {
        self.graph.len()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn sweep(&self) -> &ParameterSweep {
        &self.sweep
    }

    /// Outputs captured by the last `run()`: `None` if nothing was captured,
    /// the value itself after a single tick, an array otherwise.
    pub fn output(&self) -> Result<Option<Value>, GraphError> {
        if self.outputs.is_empty() {
            return Err(GraphError::NoOutputDeclared);
        }
        Ok(match self.output_buffer.as_slice() {
            [] => None,
            [single] => Some(single.clone()),
            many => Some(Value::Array(many.to_vec())),
        })
    }

    pub fn result(&self) -> &[ExecutionRecord] {
        &self.results
    }

    // --- execution ---

    pub async fn run(&mut self) -> Result<(), GraphError> {
        let mode = if !self.graph.connections().is_empty() {
            Mode::Connected
        } else if !self.graph.is_empty() {
            Mode::Isolated
        } else {
            debug!("Graph has no nodes, nothing to run");
            return Ok(());
        };

        let sweep_id = Uuid::new_v4();
        self.run_sweep(mode)
            .instrument(info_span!("sweep", %sweep_id))
            .await
    }

    async fn run_sweep(&mut self, mode: Mode) -> Result<(), GraphError> {
        self.output_buffer.clear();
        if self.config.retention == ResultRetention::PerRun {
            self.results.clear();
        }

        let depths: DepthMap = match mode {
            Mode::Connected => self.executor.depth_map(&self.graph)?,
            Mode::Isolated => self.graph.node_ids().map(|id| (id.to_string(), 0)).collect(),
        };
        // a previous run may have stopped mid-sweep
        self.rewind_sweep()?;
        self.sweep.finalize_ordering(&depths, self.config.depth_order);

        info!(
            nodes = self.graph.len(),
            swept = self.sweep.len(),
            per_input = self.sweep.combinations(),
            queued_inputs = self.inputs.remaining() + 1,
            "Sweep started"
        );

        let first_record = self.results.len();
        let mut hint = RunHint::Full;
        loop {
            let request = ExecutionRequest {
                hint,
                parameters: self.sweep.bindings(),
                inputs: self.inputs.bindings(),
            };
            self.executor.execute(&mut self.graph, &request).await?;

            let record = self.capture()?;
            if let Some(value) = record.captured() {
                self.output_buffer.push(value);
            }
            self.results.push(record);

            hint = match self.sweep.advance() {
                Some(changed) if mode == Mode::Connected => RunHint::Changed(changed),
                Some(_) => RunHint::Full,
                None => {
                    self.rewind_sweep()?;
                    if !self.inputs.advance_to_next() {
                        break;
                    }
                    debug!(remaining = self.inputs.remaining(), "Next input combination");
                    RunHint::Full
                }
            };
        }

        info!(records = self.results.len() - first_record, "Sweep finished");
        Ok(())
    }

    /// Puts every domain back on its first value, on the nodes as well.
    fn rewind_sweep(&mut self) -> Result<(), GraphError> {
        self.sweep.reset();
        for (key, value) in self.sweep.bindings() {
            self.graph.set_param(&key, value)?;
        }
        Ok(())
    }

    fn capture(&self) -> Result<ExecutionRecord, GraphError> {
        let outputs = self.outputs.iter()
            .map(|port| self.graph.output_value(port).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ExecutionRecord {
            outputs,
            inputs: self.inputs.current_values(&self.graph)?,
            params: self.sweep.current_assignment(),
        })
    }
}

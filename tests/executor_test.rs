use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use serde_json::{json, Value};
use sweepgraph::config::{DepthOrder, SweepConfig};
use sweepgraph::error::GraphError;
use sweepgraph::runtime::executor::{DepthMap, ExecutionRequest, Executor, RunHint, SequentialExecutor};
use sweepgraph::runtime::graph::{Graph, PortRef};
use sweepgraph::runtime::node::Node;
use sweepgraph::runtime::registry::NodeRegistry;
use sweepgraph::sweep::orchestrator::Orchestrator;

fn node(kind: &str, id: &str, params: Value) -> Box<dyn Node> {
    NodeRegistry::with_builtins()
        .create(kind, id, params)
        .expect("Failed to create node")
}

fn port(s: &str) -> PortRef {
    s.parse().expect("Invalid port reference")
}

/// Forwards to the sequential executor and keeps every hint it was given.
#[derive(Default)]
struct RecordingExecutor {
    inner: SequentialExecutor,
    hints: Arc<Mutex<Vec<RunHint>>>,
}

#[async_trait]
impl Executor for RecordingExecutor {
    fn depth_map(&self, graph: &Graph) -> Result<DepthMap, GraphError> {
        self.inner.depth_map(graph)
    }

    async fn execute(&mut self, graph: &mut Graph, request: &ExecutionRequest) -> Result<(), GraphError> {
        self.hints.lock().unwrap().push(request.hint.clone());
        self.inner.execute(graph, request).await
    }
}

fn changed(ids: &[&str]) -> RunHint {
    RunHint::Changed(ids.iter().map(|s| s.to_string()).collect())
}

#[test]
fn test_topological_order_prefers_registration_order() {
    let mut graph = Graph::new();
    graph.add_node(node("passthrough", "a", Value::Null)).unwrap();
    graph.add_node(node("constant", "b", Value::Null)).unwrap();
    graph.add_node(node("constant", "c", Value::Null)).unwrap();
    graph.connect(port("c.out"), port("a.in")).unwrap();

    let order = SequentialExecutor::topological_order(&graph).unwrap();
    assert_eq!(order, vec![1, 2, 0]);
}

#[test]
fn test_depth_map() {
    let mut graph = Graph::new();
    graph.add_node(node("constant", "const", Value::Null)).unwrap();
    graph.add_node(node("passthrough", "pt", Value::Null)).unwrap();
    graph.add_node(node("passthrough", "pt2", Value::Null)).unwrap();
    graph.add_node(node("counter", "cnt", Value::Null)).unwrap();
    graph.connect(port("const.out"), port("pt.in")).unwrap();
    graph.connect(port("pt.out"), port("pt2.in")).unwrap();

    let depths = SequentialExecutor::new().depth_map(&graph).unwrap();
    assert_eq!(depths["const"], 0);
    assert_eq!(depths["pt"], 1);
    assert_eq!(depths["pt2"], 2);
    assert_eq!(depths["cnt"], 0);
}

#[test]
fn test_depth_is_longest_path() {
    let mut graph = Graph::new();
    graph.add_node(node("constant", "const", Value::Null)).unwrap();
    graph.add_node(node("passthrough", "pt", Value::Null)).unwrap();
    graph.add_node(node("and", "and", Value::Null)).unwrap();
    graph.connect(port("const.out"), port("pt.in")).unwrap();
    graph.connect(port("const.out"), port("and.in1")).unwrap();
    graph.connect(port("pt.out"), port("and.in2")).unwrap();

    let depths = SequentialExecutor::new().depth_map(&graph).unwrap();
    assert_eq!(depths["and"], 2);
}

#[tokio::test]
async fn test_cycle_is_rejected() {
    let mut graph = Orchestrator::new();
    graph.add_node(node("and", "a", Value::Null)).unwrap();
    graph.add_node(node("and", "b", Value::Null)).unwrap();
    graph.connect("a", "out", "b", "in1").unwrap();
    graph.connect("b", "out", "a", "in1").unwrap();

    let err = graph.run().await.unwrap_err();
    match err {
        GraphError::Cycle(mut nodes) => {
            nodes.sort();
            assert_eq!(nodes, vec!["a".to_string(), "b".to_string()]);
        }
        other => panic!("Expected a cycle, got {other:?}"),
    }
    assert!(graph.result().is_empty());
}

#[tokio::test]
async fn test_changed_hint_skips_clean_branches() {
    let mut graph = Graph::new();
    graph.add_node(node("constant", "const1", json!({"value": 1}))).unwrap();
    graph.add_node(node("constant", "const2", json!({"value": 2}))).unwrap();
    graph.add_node(node("counter", "cnt1", Value::Null)).unwrap();
    graph.add_node(node("counter", "cnt2", Value::Null)).unwrap();
    graph.connect(port("const1.out"), port("cnt1.input")).unwrap();
    graph.connect(port("const2.out"), port("cnt2.input")).unwrap();

    let mut executor = SequentialExecutor::new();
    let full = ExecutionRequest { hint: RunHint::Full, parameters: vec![], inputs: vec![] };
    executor.execute(&mut graph, &full).await.unwrap();

    let partial = ExecutionRequest {
        hint: changed(&["const1"]),
        parameters: vec![(port("const1.value"), json!(5))],
        inputs: vec![],
    };
    executor.execute(&mut graph, &partial).await.unwrap();

    assert_eq!(graph.output_value(&port("cnt1.count")).unwrap(), &json!(2));
    assert_eq!(graph.output_value(&port("cnt2.count")).unwrap(), &json!(1));
    assert_eq!(graph.input_value(&port("cnt1.input")).unwrap(), &json!(5));
}

#[tokio::test]
async fn test_request_binds_assignment() {
    let mut graph = Graph::new();
    graph.add_node(node("passthrough", "pt", Value::Null)).unwrap();

    let request = ExecutionRequest {
        hint: RunHint::Full,
        parameters: vec![],
        inputs: vec![(port("pt.in"), json!("hello"))],
    };
    SequentialExecutor::new().execute(&mut graph, &request).await.unwrap();
    assert_eq!(graph.output_value(&port("pt.out")).unwrap(), &json!("hello"));

    let bad = ExecutionRequest {
        hint: RunHint::Full,
        parameters: vec![(port("pt.missing"), json!(1))],
        inputs: vec![],
    };
    let err = SequentialExecutor::new().execute(&mut graph, &bad).await.unwrap_err();
    assert!(matches!(err, GraphError::UnknownParameter { .. }));
}

fn expression_chain(order: DepthOrder, hints: Arc<Mutex<Vec<RunHint>>>) -> Orchestrator {
    let executor = RecordingExecutor { inner: SequentialExecutor::new(), hints };
    let mut graph = Orchestrator::new()
        .with_executor(executor)
        .with_config(SweepConfig::default().depth_order(order));
    graph.add_node(node("constant", "c", Value::Null)).unwrap();
    graph.add_node(node("expression", "e", json!({"inputs": ["x"], "expression": "x"}))).unwrap();
    graph.connect("c", "out", "e", "x").unwrap();
    graph.declare_output_port("e", "out").unwrap();
    graph.set_swept_parameter("c", "value", vec![json!(1), json!(2)]).unwrap();
    graph.set_swept_parameter("e", "expression", vec![json!("x + 1"), json!("x * 10")]).unwrap();
    graph
}

#[tokio::test]
async fn test_ascending_depth_order_hints() {
    let hints = Arc::new(Mutex::new(Vec::new()));
    let mut graph = expression_chain(DepthOrder::Ascending, hints.clone());
    graph.run().await.unwrap();

    assert_eq!(graph.output().unwrap(), Some(json!([2, 3, 10, 20])));
    assert_eq!(*hints.lock().unwrap(), vec![
        RunHint::Full,
        changed(&["c"]),
        changed(&["c", "e"]),
        changed(&["c"]),
    ]);
}

#[tokio::test]
async fn test_descending_depth_order_hints() {
    let hints = Arc::new(Mutex::new(Vec::new()));
    let mut graph = expression_chain(DepthOrder::Descending, hints.clone());
    graph.run().await.unwrap();

    assert_eq!(graph.output().unwrap(), Some(json!([2, 10, 3, 20])));
    assert_eq!(*hints.lock().unwrap(), vec![
        RunHint::Full,
        changed(&["e"]),
        changed(&["e", "c"]),
        changed(&["e"]),
    ]);
}

#[tokio::test]
async fn test_input_advance_sends_full_hint() {
    let hints = Arc::new(Mutex::new(Vec::new()));
    let executor = RecordingExecutor { inner: SequentialExecutor::new(), hints: hints.clone() };
    let mut graph = Orchestrator::new().with_executor(executor);
    graph.add_node(node("constant", "c", Value::Null)).unwrap();
    graph.add_node(node("and", "and", Value::Null)).unwrap();
    graph.connect("c", "out", "and", "in1").unwrap();
    graph.declare_input_port("and", "in2").unwrap();
    graph.declare_output_port("and", "out").unwrap();
    graph.set_swept_parameter("c", "value", vec![json!(true), json!(false)]).unwrap();
    graph.set_input(json!([true, false])).unwrap();
    graph.run().await.unwrap();

    assert_eq!(graph.output().unwrap(), Some(json!([true, false, false, false])));
    assert_eq!(*hints.lock().unwrap(), vec![
        RunHint::Full,
        changed(&["c"]),
        RunHint::Full,
        changed(&["c"]),
    ]);
}

#[tokio::test]
async fn test_isolated_nodes_always_get_full_hint() {
    let hints = Arc::new(Mutex::new(Vec::new()));
    let executor = RecordingExecutor { inner: SequentialExecutor::new(), hints: hints.clone() };
    let mut graph = Orchestrator::new().with_executor(executor);
    graph.add_node(node("constant", "c", Value::Null)).unwrap();
    graph.declare_output_port("c", "out").unwrap();
    graph.set_swept_parameter("c", "value", vec![json!(1), json!(2), json!(3)]).unwrap();
    graph.run().await.unwrap();

    assert_eq!(graph.output().unwrap(), Some(json!([1, 2, 3])));
    assert!(hints.lock().unwrap().iter().all(|h| *h == RunHint::Full));
}

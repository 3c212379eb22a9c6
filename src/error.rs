use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    // --- lookup ---
    #[error("node not found: {0}")]
    UnknownNode(String),

    #[error("duplicate node id: {0}")]
    DuplicateNode(String),

    #[error("node '{node}' has no input port '{port}'")]
    UnknownInput { node: String, port: String },

    #[error("node '{node}' has no output port '{port}'")]
    UnknownOutput { node: String, port: String },

    #[error("node '{node}' has no parameter '{param}'")]
    UnknownParameter { node: String, param: String },

    // --- configuration ---
    #[error("no output was declared for this graph")]
    NoOutputDeclared,

    #[error("no input was declared for this graph")]
    NoInputDeclared,

    #[error("`input` can only be used if exactly 1 input port is declared ({0} declared)")]
    SingleInputRequired(usize),

    #[error("input combination has {got} values but {expected} input ports are declared")]
    ArityMismatch { expected: usize, got: usize },

    #[error("input slot {index} is out of range ({declared} input ports declared)")]
    InputSlotOutOfRange { index: usize, declared: usize },

    #[error("no input combination was given")]
    EmptyCombinations,

    #[error("swept parameter '{0}' has no values")]
    EmptyDomain(String),

    #[error("invalid port reference '{0}', expected 'node.port'")]
    InvalidPortRef(String),

    // --- execution ---
    #[error("cycle detected between nodes: {}", .0.join(", "))]
    Cycle(Vec<String>),

    #[error("node '{node}' failed: {source}")]
    NodeFailed {
        node: String,
        #[source]
        source: anyhow::Error,
    },
}

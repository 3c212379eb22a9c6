use anyhow::{Result, Context as AnyhowContext};
use std::fs;
use std::path::Path;
use crate::dsl::GraphDescription;

/// Reads a graph description from a YAML (or JSON) file.
pub fn load_graph_from_file(file_path: impl AsRef<Path>) -> Result<GraphDescription> {
    let file_path = file_path.as_ref();
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read graph file from {}", file_path.display()))?;

    parse_graph(&content)
        .with_context(|| format!("Failed to deserialize graph description from {}", file_path.display()))
}

/// JSON is accepted too since it parses as YAML.
pub fn parse_graph(content: &str) -> Result<GraphDescription> {
    let description: GraphDescription = serde_yaml::from_str(content)?;
    Ok(description)
}

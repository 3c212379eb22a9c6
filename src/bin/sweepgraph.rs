use clap::{Parser, Subcommand};
use sweepgraph::compiler::{loader, core::Compiler};
use sweepgraph::config::DepthOrder;
use sweepgraph::sweep::sequencer::InputCombinations;
use std::path::PathBuf;
use anyhow::{Result, Context};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Run a processing graph over every input and parameter combination", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep a graph description and print one JSON record per tick
    Run {
        /// Path to the graph YAML/JSON file
        #[arg(long, short)]
        file: PathBuf,

        /// Input combinations as JSON, overriding the file (e.g. '[[true, false], [true, true]]', or '[10, 20]' for a single input)
        #[arg(long, short = 'I', value_parser = parse_combinations)]
        inputs: Option<InputCombinations>,

        /// Which parameters change fastest: ascending (upstream) or descending (downstream)
        #[arg(long)]
        depth_order: Option<DepthOrder>,

        /// Print the records as one pretty JSON array instead of JSON lines
        #[arg(long)]
        pretty: bool,
    },
    /// List the node kinds known to the built-in registry
    Kinds,
}

fn parse_combinations(s: &str) -> Result<InputCombinations, String> {
    serde_json::from_str(s).map_err(|e| format!("invalid input combinations `{}`: {}", s, e))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file, inputs, depth_order, pretty } => {
            info!("Loading graph from: {:?}", file);
            let description = loader::load_graph_from_file(&file)?;

            let compiler = Compiler::new();
            let mut graph = compiler.compile(description)?;

            if let Some(order) = depth_order {
                let config = graph.config().clone().depth_order(order);
                graph.set_config(config);
            }
            if let Some(combinations) = inputs {
                graph.set_combinations(combinations)?;
            }

            graph.run().await.context("Sweep aborted")?;
            info!("Captured {} records", graph.result().len());

            if pretty {
                println!("{}", serde_json::to_string_pretty(graph.result())?);
            } else {
                for record in graph.result() {
                    println!("{}", serde_json::to_string(record)?);
                }
            }
        }
        Commands::Kinds => {
            let registry = sweepgraph::NodeRegistry::with_builtins();
            for kind in registry.kinds() {
                println!("{}", kind);
            }
        }
    }

    Ok(())
}

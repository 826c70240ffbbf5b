mod config;

use config::CliConfig;
use stateflow_engine::{GraphEngine, State, ToolRegistry};
use stateflow_review::fields;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Source reviewed when no input file is given on the command line.
const SAMPLE_CODE: &str = "\
def load_config(path):
    # TODO: validate the schema before returning
    with open(path) as handle:
        return parse(handle.read())

def parse(text):
    return dict(line.split('=', 1) for line in text.splitlines() if line)
";

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = CliConfig::from_env().expect("failed to load configuration");
    tracing::info!(max_steps = config.engine.max_steps, "Loaded configuration");

    let code = match std::env::args().nth(1) {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .unwrap_or_else(|e| panic!("failed to read {path}: {e}")),
        None => SAMPLE_CODE.to_string(),
    };

    let mut registry = ToolRegistry::new();
    stateflow_review::register_nodes(&mut registry);
    let engine = GraphEngine::new(Arc::new(registry)).with_max_steps(config.engine.max_steps);

    let (nodes, edges, start) = stateflow_review::sample_graph();
    let graph_id = engine
        .create_graph(nodes, edges, start)
        .await
        .expect("failed to create review graph");

    let mut state = State::new();
    state.set(fields::CODE_TEXT, code);
    state.set(fields::QUALITY_SCORE, 0.0);

    let outcome = engine
        .run_graph(graph_id, state)
        .await
        .expect("failed to run review graph");

    println!("run {} finished: {:?}", outcome.run_id, outcome.status);
    println!();
    println!("execution log:");
    for (step, entry) in outcome.execution_log.iter().enumerate() {
        let next = entry
            .next
            .as_ref()
            .map_or("<end>", |node_id| node_id.as_str());
        match &entry.note {
            Some(note) => println!("  {step:>3}  {} -> {next}  ({note})", entry.node_id),
            None => println!("  {step:>3}  {} -> {next}", entry.node_id),
        }
    }
    println!();
    println!(
        "final state:\n{}",
        serde_json::to_string_pretty(&outcome.final_state).expect("state is serializable")
    );
}

//! The graph engine: validation, the step loop, and run queries.
//!
//! The engine exposes three operations:
//! 1. `create_graph` validates a definition (structure plus eager tool
//!    resolution) and stores it
//! 2. `run_graph` drives a run from the start node to a terminal state,
//!    one awaited step at a time
//! 3. `get_run_state` returns a consistent snapshot of any run, including
//!    one that is still in flight
//!
//! Each run executes sequentially with no internal parallelism; distinct
//! runs are independent and may be driven concurrently. After every step the
//! engine publishes a full snapshot to the run store, so queries never
//! observe a partially-recorded step.

use crate::error::EngineError;
use crate::graph::GraphDefinition;
use crate::node::{Node, NodeContext, NodeId, Transition};
use crate::registry::ToolRegistry;
use crate::run::{RunOutcome, RunState};
use crate::state::State;
use crate::store::{GraphStore, MemoryGraphStore, MemoryRunStore, RunStore};
use std::collections::HashMap;
use std::sync::Arc;
use stateflow_core::{GraphId, RunId};

/// Default runaway-loop guard: the most node invocations a run may make.
pub const DEFAULT_MAX_STEPS: u32 = 100;

/// Orchestrates graph execution over a tool registry and a pair of stores.
pub struct GraphEngine<G = MemoryGraphStore, R = MemoryRunStore> {
    registry: Arc<ToolRegistry>,
    graphs: G,
    runs: R,
    max_steps: u32,
}

impl GraphEngine {
    /// Creates an engine with in-memory graph and run stores.
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self::with_stores(registry, MemoryGraphStore::new(), MemoryRunStore::new())
    }
}

impl<G: GraphStore, R: RunStore> GraphEngine<G, R> {
    /// Creates an engine over the given stores.
    #[must_use]
    pub fn with_stores(registry: Arc<ToolRegistry>, graphs: G, runs: R) -> Self {
        Self {
            registry,
            graphs,
            runs,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Sets the maximum number of node invocations per run.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Validates and stores a graph definition, returning its assigned id.
    ///
    /// Tool resolution is eager: every node's function name must already be
    /// registered. The registry is read-only after startup, so a graph that
    /// was accepted can always resolve its functions later.
    ///
    /// # Errors
    ///
    /// Returns an error if the definition is structurally invalid or
    /// references an unregistered function; nothing is stored in that case.
    pub async fn create_graph(
        &self,
        nodes: Vec<Node>,
        edges: HashMap<NodeId, NodeId>,
        start_node_id: NodeId,
    ) -> Result<GraphId, EngineError> {
        let graph = GraphDefinition::new(nodes, edges, start_node_id)?;

        for node in graph.nodes() {
            if !self.registry.contains(&node.fn_name) {
                return Err(EngineError::UnknownTool {
                    node_id: node.id.clone(),
                    fn_name: node.fn_name.clone(),
                });
            }
        }

        let graph_id = graph.id;
        tracing::info!(
            graph_id = %graph_id,
            nodes = graph.node_count(),
            "graph created"
        );
        self.graphs.put(graph).await?;
        Ok(graph_id)
    }

    /// Runs a graph to a terminal state over an owned copy of the initial
    /// state and returns the terminal snapshot.
    ///
    /// Runtime failures (a failing node function, a branch to an unknown
    /// node, the step guard) terminate only this run: its record transitions
    /// to `Failed` with the error in its final log entry, and the snapshot is
    /// still returned as `Ok`.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph id is unknown or the backing store
    /// fails.
    pub async fn run_graph(
        &self,
        graph_id: GraphId,
        initial_state: State,
    ) -> Result<RunOutcome, EngineError> {
        let graph = self
            .graphs
            .get(graph_id)
            .await?
            .ok_or(EngineError::GraphNotFound { graph_id })?;

        let mut run = RunState::new(
            RunId::new(),
            graph_id,
            initial_state,
            graph.start_node_id().clone(),
        );
        let run_id = run.run_id;
        self.runs.put(run.clone()).await?;
        tracing::info!(run_id = %run_id, graph_id = %graph_id, "run started");

        loop {
            let Some(current) = run.current_node_id.clone() else {
                run.complete();
                tracing::info!(run_id = %run_id, steps = run.step_count, "run completed");
                break;
            };

            if run.step_count >= self.max_steps {
                let error = EngineError::MaxStepsExceeded {
                    limit: self.max_steps,
                };
                tracing::warn!(run_id = %run_id, node_id = %current, "run failed: {error}");
                run.fail(current, error.to_string());
                break;
            }

            // Node presence and tool resolution were validated at creation;
            // a branch override can still route to an unknown node.
            let Some(node) = graph.node(&current) else {
                let error = format!("branched to unknown node '{current}'");
                tracing::warn!(run_id = %run_id, "run failed: {error}");
                run.fail(current, error);
                break;
            };

            let function = match self.registry.resolve(&node.fn_name) {
                Ok(function) => function,
                Err(error) => {
                    tracing::warn!(run_id = %run_id, node_id = %current, "run failed: {error}");
                    run.fail(current, error.to_string());
                    break;
                }
            };

            tracing::debug!(
                run_id = %run_id,
                node_id = %current,
                fn_name = %node.fn_name,
                step = run.step_count,
                "executing node"
            );

            let context = NodeContext::new(&current, &graph);
            match function.call(&mut run.state, context).await {
                Ok(transition) => {
                    let (next, note) = match transition {
                        Transition::Continue => (graph.edge_from(&current).cloned(), None),
                        Transition::Goto(target) if target.is_end() => (None, None),
                        Transition::Goto(target) => {
                            let note = format!("branched to '{target}'");
                            (Some(target), Some(note))
                        }
                        Transition::End => (None, None),
                    };
                    tracing::debug!(
                        run_id = %run_id,
                        node_id = %current,
                        next = next.as_ref().map(|n| n.as_str()).unwrap_or("<end>"),
                        "step recorded"
                    );
                    run.record_step(current, next, note);
                }
                Err(source) => {
                    let error = EngineError::Node {
                        node_id: current.clone(),
                        source,
                    };
                    tracing::warn!(run_id = %run_id, node_id = %current, "run failed: {error}");
                    run.fail(current, error.to_string());
                    break;
                }
            }

            // Publish a snapshot so concurrent queries see the latest step.
            self.runs.put(run.clone()).await?;
        }

        self.runs.put(run.clone()).await?;
        Ok(RunOutcome::from(run))
    }

    /// Returns a consistent snapshot of a run, in-flight or terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the run id is unknown or the backing store fails.
    pub async fn get_run_state(&self, run_id: RunId) -> Result<RunState, EngineError> {
        self.runs
            .get(run_id)
            .await?
            .ok_or(EngineError::RunNotFound { run_id })
    }

    /// Returns the configured step limit.
    #[must_use]
    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }
}

//! Graph execution core for the stateflow workflow engine.
//!
//! This crate provides:
//!
//! - **Graph Model**: nodes keyed by caller-chosen string ids, a static edge
//!   map from node to successor, and a designated start node
//! - **Node Functions**: invocable steps registered by name in a
//!   [`ToolRegistry`], mutating a shared [`State`] and returning an explicit
//!   routing [`Transition`]
//! - **Execution**: the [`GraphEngine`] step loop with branch resolution,
//!   loop-back support, and a runaway-step guard
//! - **Run Tracking**: per-run status, execution log, and state snapshots
//!   queryable at any time, including mid-run

pub mod engine;
pub mod error;
pub mod graph;
pub mod node;
pub mod registry;
pub mod run;
pub mod state;
pub mod store;

pub use engine::{DEFAULT_MAX_STEPS, GraphEngine};
pub use error::{EngineError, GraphError, NodeError, StoreError};
pub use graph::GraphDefinition;
pub use node::{END_MARKER, Node, NodeContext, NodeFunction, NodeId, Transition};
pub use registry::{ToolRegistry, UnknownToolError};
pub use run::{LogEntry, RunOutcome, RunState, RunStatus};
pub use state::State;
pub use store::{GraphStore, MemoryGraphStore, MemoryRunStore, RunStore};

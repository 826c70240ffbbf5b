//! Error types for the engine crate.
//!
//! The taxonomy separates structural errors from runtime ones:
//! - `GraphError`: malformed graph definitions, rejected before storage
//! - `NodeError`: a node function itself failed
//! - `StoreError`: the graph/run backing store failed
//! - `EngineError`: the engine-level view of all of the above, plus unknown
//!   identifiers and the runaway-step guard
//!
//! Structural errors abort the operation that detected them with no side
//! effects. Runtime errors during a run fail only that run; the run stays
//! queryable in its failed terminal state.

use crate::node::NodeId;
use stateflow_core::{GraphId, RunId};
use std::fmt;

/// Errors from graph definition validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Two nodes share the same id.
    DuplicateNodeId { node_id: NodeId },
    /// A node uses the reserved terminal marker as its id.
    ReservedNodeId { node_id: NodeId },
    /// The start node id is not among the graph's nodes.
    StartNodeNotFound { node_id: NodeId },
    /// An edge source is not a known node id.
    UnknownEdgeSource { node_id: NodeId },
    /// An edge target is neither a known node id nor the terminal marker.
    UnknownEdgeTarget { source: NodeId, target: NodeId },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateNodeId { node_id } => {
                write!(f, "duplicate node id: {node_id}")
            }
            Self::ReservedNodeId { node_id } => {
                write!(f, "node id '{node_id}' is reserved as the terminal marker")
            }
            Self::StartNodeNotFound { node_id } => {
                write!(f, "start node '{node_id}' is not in the graph")
            }
            Self::UnknownEdgeSource { node_id } => {
                write!(f, "edge source '{node_id}' is not in the graph")
            }
            Self::UnknownEdgeTarget { source, target } => {
                write!(
                    f,
                    "edge from '{source}' targets unknown node '{target}'"
                )
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// Errors raised by node function implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// A state field the node requires is absent.
    MissingField { field: String },
    /// A state field is present but unusable.
    InvalidField { field: String, reason: String },
    /// The node failed for a domain-specific reason.
    Failed { reason: String },
}

impl NodeError {
    /// Convenience constructor for a domain-specific failure.
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => {
                write!(f, "required state field '{field}' is missing")
            }
            Self::InvalidField { field, reason } => {
                write!(f, "state field '{field}' is invalid: {reason}")
            }
            Self::Failed { reason } => write!(f, "node failed: {reason}"),
        }
    }
}

impl std::error::Error for NodeError {}

/// Errors from graph/run store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Failed to store an entry.
    PutFailed { message: String },
    /// Failed to load an entry.
    GetFailed { message: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PutFailed { message } => write!(f, "store put failed: {message}"),
            Self::GetFailed { message } => write!(f, "store get failed: {message}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Engine-level errors for the three public operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The submitted graph definition is malformed.
    InvalidGraph(GraphError),
    /// A node references a function name with no registered implementation.
    UnknownTool { node_id: NodeId, fn_name: String },
    /// No graph is stored under the given id.
    GraphNotFound { graph_id: GraphId },
    /// No run is stored under the given id.
    RunNotFound { run_id: RunId },
    /// The runaway-loop guard tripped.
    MaxStepsExceeded { limit: u32 },
    /// A node function failed during a run.
    Node { node_id: NodeId, source: NodeError },
    /// The backing store failed.
    Store(StoreError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGraph(e) => write!(f, "invalid graph: {e}"),
            Self::UnknownTool { node_id, fn_name } => {
                write!(f, "node '{node_id}' references unregistered function '{fn_name}'")
            }
            Self::GraphNotFound { graph_id } => write!(f, "graph not found: {graph_id}"),
            Self::RunNotFound { run_id } => write!(f, "run not found: {run_id}"),
            Self::MaxStepsExceeded { limit } => {
                write!(f, "maximum step count exceeded ({limit})")
            }
            Self::Node { node_id, source } => {
                write!(f, "node '{node_id}' failed: {source}")
            }
            Self::Store(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidGraph(e) => Some(e),
            Self::Node { source, .. } => Some(source),
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GraphError> for EngineError {
    fn from(e: GraphError) -> Self {
        Self::InvalidGraph(e)
    }
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

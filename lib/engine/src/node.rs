//! Workflow node types and the node function contract.
//!
//! Nodes are the building blocks of a graph. Each node has:
//! - An id, unique within its graph, chosen by the caller
//! - The name of a registered function that implements its behavior
//!
//! Node behavior is expressed through the [`NodeFunction`] trait: a function
//! mutates the run's [`State`] in place and returns a [`Transition`] telling
//! the engine where to go next.

use crate::error::NodeError;
use crate::graph::GraphDefinition;
use crate::state::State;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The reserved node id that marks "no successor" in an edge map.
pub const END_MARKER: &str = "__end__";

/// A caller-chosen identifier for a node within a graph.
///
/// Node ids are plain strings ("extract", "check", ...) scoped to a single
/// graph. The id [`END_MARKER`] is reserved as the terminal marker: valid as
/// an edge target, never as a node id, edge source, or start node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Creates a node id from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the terminal marker id.
    #[must_use]
    pub fn end() -> Self {
        Self(END_MARKER.to_string())
    }

    /// Returns true if this id is the terminal marker.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.0 == END_MARKER
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single step in a workflow graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// The node's id, unique within its graph.
    pub id: NodeId,
    /// The name of the registered function implementing this node.
    pub fn_name: String,
}

impl Node {
    /// Creates a new node binding an id to a registered function name.
    #[must_use]
    pub fn new(id: impl Into<NodeId>, fn_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fn_name: fn_name.into(),
        }
    }
}

/// The routing decision returned by a node function.
///
/// This is the sole branching and looping primitive: `Continue` follows the
/// graph's static edge, `Goto` overrides it (a target earlier in the graph is
/// a loop-back), and `End` terminates the run regardless of the edge map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Follow the static edge declared for the current node.
    Continue,
    /// Route to the given node instead of the static successor.
    Goto(NodeId),
    /// Terminate the run.
    End,
}

/// Read-only graph context passed to a node function invocation.
///
/// Gives branching nodes enough visibility to make routing decisions without
/// handing them mutable access to the graph or the run table.
#[derive(Debug, Clone, Copy)]
pub struct NodeContext<'a> {
    node_id: &'a NodeId,
    graph: &'a GraphDefinition,
}

impl<'a> NodeContext<'a> {
    /// Creates a context for the given node within a graph.
    #[must_use]
    pub fn new(node_id: &'a NodeId, graph: &'a GraphDefinition) -> Self {
        Self { node_id, graph }
    }

    /// Returns the id of the node being executed.
    #[must_use]
    pub fn node_id(&self) -> &NodeId {
        self.node_id
    }

    /// Returns the graph definition being executed.
    #[must_use]
    pub fn graph(&self) -> &GraphDefinition {
        self.graph
    }

    /// Returns the current node's static successor, if it has one.
    #[must_use]
    pub fn static_next(&self) -> Option<&NodeId> {
        self.graph.edge_from(self.node_id)
    }
}

/// Trait for invocable node behavior.
///
/// Implementations mutate the run's state in place and return a routing
/// decision. They must not assume anything about the state's schema beyond
/// the fields they themselves read and write.
#[async_trait]
pub trait NodeFunction: Send + Sync {
    /// Executes this node against the current run state.
    ///
    /// # Errors
    ///
    /// Returns an error if the node cannot complete; the engine fails the
    /// run and records the error in its log.
    async fn call(&self, state: &mut State, ctx: NodeContext<'_>) -> Result<Transition, NodeError>;
}

impl fmt::Debug for dyn NodeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<dyn NodeFunction>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_end_marker() {
        assert!(NodeId::end().is_end());
        assert!(NodeId::new("__end__").is_end());
        assert!(!NodeId::new("extract").is_end());
    }

    #[test]
    fn node_id_display() {
        let id = NodeId::new("check");
        assert_eq!(id.to_string(), "check");
        assert_eq!(id.as_str(), "check");
    }

    #[test]
    fn node_creation() {
        let node = Node::new("extract", "extract_functions");
        assert_eq!(node.id, NodeId::new("extract"));
        assert_eq!(node.fn_name, "extract_functions");
    }

    #[test]
    fn node_id_serde_is_transparent() {
        let id = NodeId::new("suggest");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"suggest\"");
        let parsed: NodeId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, parsed);
    }
}

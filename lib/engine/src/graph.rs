//! Graph definition and construction-time validation.
//!
//! A graph definition is the static, immutable description of a workflow:
//! an ordered set of nodes, an edge map from node id to successor id, and a
//! designated start node. Validation happens at construction; a definition
//! that exists is structurally sound.

use crate::error::GraphError;
use crate::node::{Node, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use stateflow_core::GraphId;

/// An immutable, validated workflow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDefinition {
    /// Unique identifier assigned at creation.
    pub id: GraphId,
    nodes: Vec<Node>,
    edges: HashMap<NodeId, NodeId>,
    start_node_id: NodeId,
    /// Map from node id to position in `nodes` for O(1) lookup.
    #[serde(skip)]
    node_index_map: HashMap<NodeId, usize>,
}

impl GraphDefinition {
    /// Validates and creates a graph definition, assigning it a fresh id.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A node id is duplicated or uses the reserved terminal marker
    /// - The start node is not among the nodes
    /// - An edge source is not a known node id
    /// - An edge target is neither a known node id nor the terminal marker
    pub fn new(
        nodes: Vec<Node>,
        edges: HashMap<NodeId, NodeId>,
        start_node_id: NodeId,
    ) -> Result<Self, GraphError> {
        let mut node_index_map = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            if node.id.is_end() {
                return Err(GraphError::ReservedNodeId {
                    node_id: node.id.clone(),
                });
            }
            if node_index_map.insert(node.id.clone(), index).is_some() {
                return Err(GraphError::DuplicateNodeId {
                    node_id: node.id.clone(),
                });
            }
        }

        if !node_index_map.contains_key(&start_node_id) {
            return Err(GraphError::StartNodeNotFound {
                node_id: start_node_id,
            });
        }

        for (source, target) in &edges {
            if !node_index_map.contains_key(source) {
                return Err(GraphError::UnknownEdgeSource {
                    node_id: source.clone(),
                });
            }
            if !target.is_end() && !node_index_map.contains_key(target) {
                return Err(GraphError::UnknownEdgeTarget {
                    source: source.clone(),
                    target: target.clone(),
                });
            }
        }

        Ok(Self {
            id: GraphId::new(),
            nodes,
            edges,
            start_node_id,
            node_index_map,
        })
    }

    /// Returns a node by its id.
    #[must_use]
    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        let index = self.node_index_map.get(node_id)?;
        self.nodes.get(*index)
    }

    /// Returns all nodes in their declared order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Returns the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the static successor of a node, if one is declared.
    ///
    /// An edge to the terminal marker reads as "no successor".
    #[must_use]
    pub fn edge_from(&self, node_id: &NodeId) -> Option<&NodeId> {
        self.edges.get(node_id).filter(|target| !target.is_end())
    }

    /// Returns the designated start node id.
    #[must_use]
    pub fn start_node_id(&self) -> &NodeId {
        &self.start_node_id
    }

    /// Rebuilds the node index map after deserialization.
    pub fn rebuild_index_map(&mut self) {
        self.node_index_map.clear();
        for (index, node) in self.nodes.iter().enumerate() {
            self.node_index_map.insert(node.id.clone(), index);
        }
    }
}

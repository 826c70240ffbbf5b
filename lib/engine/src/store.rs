//! Storage traits for graphs and runs, with in-memory implementations.
//!
//! Graphs and runs live behind minimal put/get abstractions so a durable
//! backing store could be substituted without touching the execution loop.
//! The in-memory stores are process-wide and volatile: contents are lost on
//! restart, which is explicitly in scope for this engine.

use crate::error::StoreError;
use crate::graph::GraphDefinition;
use crate::run::RunState;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use stateflow_core::{GraphId, RunId};
use tokio::sync::RwLock;

/// Storage for immutable graph definitions, keyed by graph id.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Stores a graph definition under its id.
    async fn put(&self, graph: GraphDefinition) -> Result<(), StoreError>;

    /// Loads a graph definition by id.
    async fn get(&self, graph_id: GraphId) -> Result<Option<GraphDefinition>, StoreError>;
}

/// Storage for run records, keyed by run id.
///
/// `put` replaces the whole record atomically, so a concurrent `get` always
/// observes a complete snapshot and never a half-written entry.
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Stores or replaces a run record under its id.
    async fn put(&self, run: RunState) -> Result<(), StoreError>;

    /// Loads a run record by id.
    async fn get(&self, run_id: RunId) -> Result<Option<RunState>, StoreError>;
}

#[async_trait]
impl<S: GraphStore + ?Sized> GraphStore for Arc<S> {
    async fn put(&self, graph: GraphDefinition) -> Result<(), StoreError> {
        S::put(self, graph).await
    }

    async fn get(&self, graph_id: GraphId) -> Result<Option<GraphDefinition>, StoreError> {
        S::get(self, graph_id).await
    }
}

#[async_trait]
impl<S: RunStore + ?Sized> RunStore for Arc<S> {
    async fn put(&self, run: RunState) -> Result<(), StoreError> {
        S::put(self, run).await
    }

    async fn get(&self, run_id: RunId) -> Result<Option<RunState>, StoreError> {
        S::get(self, run_id).await
    }
}

/// In-memory graph store guarded by a read-write lock.
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    graphs: RwLock<HashMap<GraphId, GraphDefinition>>,
}

impl MemoryGraphStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn put(&self, graph: GraphDefinition) -> Result<(), StoreError> {
        self.graphs.write().await.insert(graph.id, graph);
        Ok(())
    }

    async fn get(&self, graph_id: GraphId) -> Result<Option<GraphDefinition>, StoreError> {
        Ok(self.graphs.read().await.get(&graph_id).cloned())
    }
}

/// In-memory run store guarded by a read-write lock.
#[derive(Debug, Default)]
pub struct MemoryRunStore {
    runs: RwLock<HashMap<RunId, RunState>>,
}

impl MemoryRunStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns snapshots of all stored run records, unordered.
    pub async fn list(&self) -> Vec<RunState> {
        self.runs.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl RunStore for MemoryRunStore {
    async fn put(&self, run: RunState) -> Result<(), StoreError> {
        self.runs.write().await.insert(run.run_id, run);
        Ok(())
    }

    async fn get(&self, run_id: RunId) -> Result<Option<RunState>, StoreError> {
        Ok(self.runs.read().await.get(&run_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeId};
    use crate::state::State;

    fn sample_graph() -> GraphDefinition {
        GraphDefinition::new(
            vec![Node::new("only", "noop")],
            HashMap::new(),
            NodeId::new("only"),
        )
        .expect("valid graph")
    }

    #[tokio::test]
    async fn graph_store_put_and_get() {
        let store = MemoryGraphStore::new();
        let graph = sample_graph();
        let graph_id = graph.id;

        store.put(graph).await.unwrap();
        let loaded = store.get(graph_id).await.unwrap();
        assert!(loaded.is_some());
        assert_eq!(loaded.unwrap().id, graph_id);
    }

    #[tokio::test]
    async fn graph_store_get_missing() {
        let store = MemoryGraphStore::new();
        assert!(store.get(GraphId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn run_store_put_replaces() {
        let store = MemoryRunStore::new();
        let mut run = RunState::new(
            RunId::new(),
            GraphId::new(),
            State::new(),
            NodeId::new("only"),
        );
        let run_id = run.run_id;

        store.put(run.clone()).await.unwrap();
        run.record_step(NodeId::new("only"), None, None);
        store.put(run.clone()).await.unwrap();

        let loaded = store.get(run_id).await.unwrap().unwrap();
        assert_eq!(loaded.step_count, 1);
        assert_eq!(loaded.execution_log.len(), 1);
    }

    #[tokio::test]
    async fn run_store_lists_stored_records() {
        let store = MemoryRunStore::new();
        assert!(store.list().await.is_empty());

        let run = RunState::new(
            RunId::new(),
            GraphId::new(),
            State::new(),
            NodeId::new("only"),
        );
        store.put(run.clone()).await.unwrap();

        let listed = store.list().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].run_id, run.run_id);
    }

    #[tokio::test]
    async fn shared_store_delegates_through_arc() {
        let store = Arc::new(MemoryGraphStore::new());
        let graph = sample_graph();
        let graph_id = graph.id;

        GraphStore::put(&store, graph).await.unwrap();
        assert!(store.get(graph_id).await.unwrap().is_some());
    }
}

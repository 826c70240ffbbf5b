//! Registry binding symbolic function names to node implementations.
//!
//! The registry is populated once at process startup and treated as
//! read-only by the engine thereafter: build it with `register`, then share
//! it behind an `Arc`. There is no removal operation.

use crate::node::NodeFunction;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Error returned when resolving an unregistered function name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownToolError {
    /// The name that failed to resolve.
    pub name: String,
}

impl fmt::Display for UnknownToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "function '{}' is not registered", self.name)
    }
}

impl std::error::Error for UnknownToolError {}

/// Maps symbolic function names to invocable node implementations.
#[derive(Default)]
pub struct ToolRegistry {
    functions: HashMap<String, Arc<dyn NodeFunction>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a name to a node function.
    ///
    /// Re-registration under an existing name overwrites the previous
    /// binding (last write wins, no error).
    pub fn register(&mut self, name: impl Into<String>, function: Arc<dyn NodeFunction>) {
        let name = name.into();
        tracing::debug!(name = %name, "registering node function");
        if self.functions.insert(name.clone(), function).is_some() {
            tracing::warn!(name = %name, "overwrote existing node function");
        }
    }

    /// Resolves a name to its bound function.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not registered.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn NodeFunction>, UnknownToolError> {
        self.functions
            .get(name)
            .cloned()
            .ok_or_else(|| UnknownToolError {
                name: name.to_string(),
            })
    }

    /// Returns true if the name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Returns the registered names, unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Returns the number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns true if no functions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NodeError;
    use crate::node::{NodeContext, Transition};
    use crate::state::State;
    use async_trait::async_trait;

    struct MarkerNode {
        field: &'static str,
    }

    #[async_trait]
    impl NodeFunction for MarkerNode {
        async fn call(
            &self,
            state: &mut State,
            _ctx: NodeContext<'_>,
        ) -> Result<Transition, NodeError> {
            state.set(self.field, true);
            Ok(Transition::Continue)
        }
    }

    #[test]
    fn register_and_resolve() {
        let mut registry = ToolRegistry::new();
        registry.register("mark", Arc::new(MarkerNode { field: "marked" }));

        assert!(registry.contains("mark"));
        assert_eq!(registry.len(), 1);
        assert!(registry.resolve("mark").is_ok());
    }

    #[test]
    fn resolve_unknown_name_fails() {
        let registry = ToolRegistry::new();
        let err = registry.resolve("missing").unwrap_err();
        assert_eq!(err.name, "missing");
        assert!(err.to_string().contains("missing"));
    }

    #[tokio::test]
    async fn reregistration_overwrites() {
        let mut registry = ToolRegistry::new();
        registry.register("mark", Arc::new(MarkerNode { field: "first" }));
        registry.register("mark", Arc::new(MarkerNode { field: "second" }));
        assert_eq!(registry.len(), 1);

        // The later binding wins.
        let function = registry.resolve("mark").unwrap();
        let graph = crate::graph::GraphDefinition::new(
            vec![crate::node::Node::new("only", "mark")],
            std::collections::HashMap::new(),
            crate::node::NodeId::new("only"),
        )
        .unwrap();
        let node_id = crate::node::NodeId::new("only");
        let mut state = State::new();
        function
            .call(&mut state, NodeContext::new(&node_id, &graph))
            .await
            .unwrap();
        assert_eq!(state.get_bool("second"), Some(true));
        assert!(!state.contains("first"));
    }
}

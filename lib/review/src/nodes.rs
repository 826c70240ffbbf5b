//! Node functions for the code-review workflow.
//!
//! Five nodes operate on the shared run state:
//! 1. `extract_functions` splits the source text into function records
//! 2. `check_complexity` scores overall quality
//! 3. `detect_issues` flags TODO markers and over-long functions
//! 4. `suggest_improvements` renders suggestions and loops back to the
//!    complexity check while quality is below the threshold
//! 5. `finalize` stamps the state as reviewed
//!
//! The quality score combines a complexity baseline with a bonus per
//! completed refinement pass, so the loop-back converges instead of
//! spinning until the engine's step guard trips.

use crate::analysis::{FunctionRecord, Issue, complexity, find_issues, split_functions, suggestion_for};
use crate::fields;
use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::sync::Arc;
use stateflow_engine::{
    Node, NodeContext, NodeError, NodeFunction, NodeId, State, ToolRegistry, Transition,
};

/// Quality score at or above which the review stops refining.
pub const QUALITY_THRESHOLD: f64 = 0.9;

/// Quality bonus granted per completed refinement pass.
const REFINEMENT_BONUS: f64 = 0.15;

fn set_metadata(state: &mut State, field: &str, value: impl Into<JsonValue>) {
    let mut metadata: Map<String, JsonValue> = state
        .get_object(fields::METADATA)
        .cloned()
        .unwrap_or_default();
    metadata.insert(field.to_string(), value.into());
    state.set(fields::METADATA, JsonValue::Object(metadata));
}

fn metadata_u64(state: &State, field: &str) -> u64 {
    state
        .get_object(fields::METADATA)
        .and_then(|metadata| metadata.get(field))
        .and_then(JsonValue::as_u64)
        .unwrap_or(0)
}

fn functions_from(state: &State) -> Result<Vec<FunctionRecord>, NodeError> {
    let value = state
        .get(fields::FUNCTIONS)
        .ok_or_else(|| NodeError::MissingField {
            field: fields::FUNCTIONS.to_string(),
        })?;
    serde_json::from_value(value.clone()).map_err(|e| NodeError::InvalidField {
        field: fields::FUNCTIONS.to_string(),
        reason: e.to_string(),
    })
}

fn issues_from(state: &State) -> Result<Vec<Issue>, NodeError> {
    let value = state
        .get(fields::ISSUES)
        .ok_or_else(|| NodeError::MissingField {
            field: fields::ISSUES.to_string(),
        })?;
    serde_json::from_value(value.clone()).map_err(|e| NodeError::InvalidField {
        field: fields::ISSUES.to_string(),
        reason: e.to_string(),
    })
}

fn to_json<T: serde::Serialize>(field: &str, value: &T) -> Result<JsonValue, NodeError> {
    serde_json::to_value(value).map_err(|e| NodeError::InvalidField {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

/// Splits `code_text` into function records.
pub struct ExtractFunctions;

#[async_trait]
impl NodeFunction for ExtractFunctions {
    async fn call(&self, state: &mut State, _ctx: NodeContext<'_>) -> Result<Transition, NodeError> {
        let code = state
            .get_str(fields::CODE_TEXT)
            .ok_or_else(|| NodeError::MissingField {
                field: fields::CODE_TEXT.to_string(),
            })?
            .to_string();

        let functions = split_functions(&code);
        tracing::debug!(count = functions.len(), "extracted functions");

        set_metadata(state, "extracted", functions.len());
        state.set(fields::FUNCTIONS, to_json(fields::FUNCTIONS, &functions)?);
        Ok(Transition::Continue)
    }
}

/// Scores overall quality from per-function complexity plus the
/// refinement bonus.
pub struct CheckComplexity;

#[async_trait]
impl NodeFunction for CheckComplexity {
    async fn call(&self, state: &mut State, _ctx: NodeContext<'_>) -> Result<Transition, NodeError> {
        let functions = functions_from(state)?;

        let baseline = if functions.is_empty() {
            0.0
        } else {
            let total: f64 = functions
                .iter()
                .map(|function| 1.0 - complexity(&function.body))
                .sum();
            total / functions.len() as f64
        };

        let passes = metadata_u64(state, "refine_passes");
        let quality = (baseline + REFINEMENT_BONUS * passes as f64).min(1.0);
        tracing::debug!(baseline, passes, quality, "scored quality");

        state.set(fields::QUALITY_SCORE, quality);
        set_metadata(state, "checked", true);
        Ok(Transition::Continue)
    }
}

/// Flags TODO markers and over-long functions.
pub struct DetectIssues;

#[async_trait]
impl NodeFunction for DetectIssues {
    async fn call(&self, state: &mut State, _ctx: NodeContext<'_>) -> Result<Transition, NodeError> {
        let functions = functions_from(state)?;

        let issues: Vec<Issue> = functions.iter().flat_map(find_issues).collect();
        tracing::debug!(count = issues.len(), "detected issues");

        set_metadata(state, "issues_found", issues.len());
        state.set(fields::ISSUES, to_json(fields::ISSUES, &issues)?);
        Ok(Transition::Continue)
    }
}

/// Renders suggestions and loops back to the complexity check while the
/// quality score is below [`QUALITY_THRESHOLD`].
pub struct SuggestImprovements {
    loop_target: NodeId,
}

impl SuggestImprovements {
    /// Creates the node with the id of the node to loop back to.
    #[must_use]
    pub fn new(loop_target: NodeId) -> Self {
        Self { loop_target }
    }
}

#[async_trait]
impl NodeFunction for SuggestImprovements {
    async fn call(&self, state: &mut State, _ctx: NodeContext<'_>) -> Result<Transition, NodeError> {
        let issues = issues_from(state)?;

        let mut suggestions = state
            .get_array(fields::SUGGESTIONS)
            .cloned()
            .unwrap_or_default();
        suggestions.extend(issues.iter().map(|issue| JsonValue::from(suggestion_for(issue))));
        state.set(fields::SUGGESTIONS, suggestions);

        let passes = metadata_u64(state, "refine_passes") + 1;
        set_metadata(state, "refine_passes", passes);

        let quality = state.get_f64(fields::QUALITY_SCORE).unwrap_or(0.0);
        if quality < QUALITY_THRESHOLD {
            tracing::debug!(quality, passes, "quality below threshold, refining");
            Ok(Transition::Goto(self.loop_target.clone()))
        } else {
            Ok(Transition::Continue)
        }
    }
}

/// Stamps the state as reviewed.
pub struct Finalize;

#[async_trait]
impl NodeFunction for Finalize {
    async fn call(&self, state: &mut State, _ctx: NodeContext<'_>) -> Result<Transition, NodeError> {
        set_metadata(state, "finalized", true);
        Ok(Transition::Continue)
    }
}

/// Registers the five review node functions under their canonical names.
pub fn register_nodes(registry: &mut ToolRegistry) {
    registry.register("extract_functions", Arc::new(ExtractFunctions));
    registry.register("check_complexity", Arc::new(CheckComplexity));
    registry.register("detect_issues", Arc::new(DetectIssues));
    registry.register(
        "suggest_improvements",
        Arc::new(SuggestImprovements::new(NodeId::new("check"))),
    );
    registry.register("finalize", Arc::new(Finalize));
}

/// Returns the canonical five-node review graph:
/// `extract -> check -> detect -> suggest -> end`.
#[must_use]
pub fn sample_graph() -> (Vec<Node>, HashMap<NodeId, NodeId>, NodeId) {
    let nodes = vec![
        Node::new("extract", "extract_functions"),
        Node::new("check", "check_complexity"),
        Node::new("detect", "detect_issues"),
        Node::new("suggest", "suggest_improvements"),
        Node::new("end", "finalize"),
    ];
    let edges = HashMap::from([
        (NodeId::new("extract"), NodeId::new("check")),
        (NodeId::new("check"), NodeId::new("detect")),
        (NodeId::new("detect"), NodeId::new("suggest")),
        (NodeId::new("suggest"), NodeId::new("end")),
    ]);
    (nodes, edges, NodeId::new("extract"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stateflow_engine::{GraphEngine, RunStatus};

    fn review_engine() -> GraphEngine {
        let mut registry = ToolRegistry::new();
        register_nodes(&mut registry);
        GraphEngine::new(Arc::new(registry))
    }

    fn initial_state(code: &str) -> State {
        let mut state = State::new();
        state.set(fields::CODE_TEXT, code);
        state.set(fields::QUALITY_SCORE, 0.0);
        state
    }

    #[tokio::test]
    async fn clean_code_completes_in_one_pass() {
        let engine = review_engine();
        let (nodes, edges, start) = sample_graph();
        let graph_id = engine.create_graph(nodes, edges, start).await.unwrap();

        let outcome = engine
            .run_graph(graph_id, initial_state("def foo(): pass"))
            .await
            .unwrap();

        assert_eq!(outcome.status, RunStatus::Completed);
        let visited: Vec<_> = outcome
            .execution_log
            .iter()
            .map(|entry| entry.node_id.as_str())
            .collect();
        assert_eq!(visited, ["extract", "check", "detect", "suggest", "end"]);

        let metadata = outcome.final_state.get_object(fields::METADATA).unwrap();
        assert_eq!(metadata.get("finalized"), Some(&JsonValue::Bool(true)));
        assert_eq!(metadata.get("extracted").and_then(JsonValue::as_u64), Some(1));
        assert!(outcome.final_state.get_f64(fields::QUALITY_SCORE).unwrap() >= QUALITY_THRESHOLD);
    }

    #[tokio::test]
    async fn middling_code_loops_back_until_quality_converges() {
        let engine = review_engine();
        let (nodes, edges, start) = sample_graph();
        let graph_id = engine.create_graph(nodes, edges, start).await.unwrap();

        // A body long enough to score poorly, short enough to converge
        // through refinement passes before the step guard.
        let mut code = String::from("def work(items):\n");
        for _ in 0..5 {
            code.push_str("    total = total + 1\n");
        }
        code.push_str("    # TODO: tune the accumulator\n");

        let outcome = engine
            .run_graph(graph_id, initial_state(&code))
            .await
            .unwrap();

        assert_eq!(outcome.status, RunStatus::Completed);

        let check_visits = outcome
            .execution_log
            .iter()
            .filter(|entry| entry.node_id.as_str() == "check")
            .count();
        assert!(check_visits >= 2, "expected loop-back, saw {check_visits} check visits");

        let metadata = outcome.final_state.get_object(fields::METADATA).unwrap();
        assert!(metadata.get("refine_passes").and_then(JsonValue::as_u64).unwrap() >= 2);
        assert!(!outcome.final_state.get_array(fields::SUGGESTIONS).unwrap().is_empty());
        assert!(outcome.final_state.get_f64(fields::QUALITY_SCORE).unwrap() >= QUALITY_THRESHOLD);
    }

    #[tokio::test]
    async fn missing_code_text_fails_the_run() {
        let engine = review_engine();
        let (nodes, edges, start) = sample_graph();
        let graph_id = engine.create_graph(nodes, edges, start).await.unwrap();

        let outcome = engine.run_graph(graph_id, State::new()).await.unwrap();

        assert_eq!(outcome.status, RunStatus::Failed);
        let last = outcome.execution_log.last().unwrap();
        assert!(last.note.as_deref().unwrap().contains(fields::CODE_TEXT));
    }

    #[tokio::test]
    async fn issues_survive_into_suggestions() {
        let engine = review_engine();
        let (nodes, edges, start) = sample_graph();
        let graph_id = engine.create_graph(nodes, edges, start).await.unwrap();

        // Short body keeps quality high, so the TODO is reported exactly once.
        let code = "def quick():\n    # TODO: later\n";
        let outcome = engine
            .run_graph(graph_id, initial_state(code))
            .await
            .unwrap();

        assert_eq!(outcome.status, RunStatus::Completed);
        let suggestions = outcome.final_state.get_array(fields::SUGGESTIONS).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].as_str().unwrap().contains("todo_marker"));
        let metadata = outcome.final_state.get_object(fields::METADATA).unwrap();
        assert_eq!(metadata.get("issues_found").and_then(JsonValue::as_u64), Some(1));
    }
}

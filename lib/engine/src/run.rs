//! Run tracking: status, execution log, and the per-run state record.
//!
//! A [`RunState`] is the mutable record of one execution. The engine owns it
//! for the run's duration, publishes a snapshot to the run store after every
//! step, and finalizes it exactly once; after that it is never mutated again
//! but remains queryable for the process lifetime.

use crate::node::NodeId;
use crate::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stateflow_core::{GraphId, RunId};

/// The overall status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The run is actively executing.
    Running,
    /// The run reached a terminal node and finished successfully.
    Completed,
    /// The run was terminated by an error or the step guard.
    Failed,
}

impl RunStatus {
    /// Returns true if this is a terminal status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// One entry in a run's execution log.
///
/// A successful step records the node that executed and the next node the
/// engine resolved (static edge or branch override). A failed run carries one
/// final entry whose note holds the error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// The node this entry refers to.
    pub node_id: NodeId,
    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,
    /// The resolved next node, if any.
    pub next: Option<NodeId>,
    /// Branch decision or error detail, if any.
    pub note: Option<String>,
}

/// The mutable record of a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    /// Unique identifier for this run.
    pub run_id: RunId,
    /// The graph being executed.
    pub graph_id: GraphId,
    /// The run's state, mutated in place by each step.
    pub state: State,
    /// Current status.
    pub status: RunStatus,
    /// The node about to execute (or executing), if the run is live.
    pub current_node_id: Option<NodeId>,
    /// Ordered log of executed steps.
    pub execution_log: Vec<LogEntry>,
    /// Number of node invocations so far.
    pub step_count: u32,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run reached a terminal status.
    pub finished_at: Option<DateTime<Utc>>,
    /// Error message, if failed.
    pub error: Option<String>,
}

impl RunState {
    /// Creates a new running record positioned at the graph's start node.
    #[must_use]
    pub fn new(run_id: RunId, graph_id: GraphId, state: State, start_node_id: NodeId) -> Self {
        Self {
            run_id,
            graph_id,
            state,
            status: RunStatus::Running,
            current_node_id: Some(start_node_id),
            execution_log: Vec::new(),
            step_count: 0,
            started_at: Utc::now(),
            finished_at: None,
            error: None,
        }
    }

    /// Records a completed step and advances to the resolved next node.
    pub fn record_step(&mut self, node_id: NodeId, next: Option<NodeId>, note: Option<String>) {
        self.execution_log.push(LogEntry {
            node_id,
            timestamp: Utc::now(),
            next: next.clone(),
            note,
        });
        self.step_count += 1;
        self.current_node_id = next;
    }

    /// Finalizes the run as completed.
    pub fn complete(&mut self) {
        self.status = RunStatus::Completed;
        self.current_node_id = None;
        self.finished_at = Some(Utc::now());
    }

    /// Finalizes the run as failed, appending the error as the final entry.
    ///
    /// The current node pointer is left at the node where the failure
    /// occurred.
    pub fn fail(&mut self, node_id: NodeId, error: String) {
        self.execution_log.push(LogEntry {
            node_id: node_id.clone(),
            timestamp: Utc::now(),
            next: None,
            note: Some(error.clone()),
        });
        self.status = RunStatus::Failed;
        self.current_node_id = Some(node_id);
        self.error = Some(error);
        self.finished_at = Some(Utc::now());
    }

    /// Returns the duration of the run, if it has finished.
    #[must_use]
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }
}

/// The terminal snapshot returned by a completed or failed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// The run's identifier, for later queries.
    pub run_id: RunId,
    /// Terminal status (completed or failed).
    pub status: RunStatus,
    /// The state as it stood when the run terminated.
    pub final_state: State,
    /// The full execution log.
    pub execution_log: Vec<LogEntry>,
}

impl From<RunState> for RunOutcome {
    fn from(run: RunState) -> Self {
        Self {
            run_id: run.run_id,
            status: run.status,
            final_state: run.state,
            execution_log: run.execution_log,
        }
    }
}

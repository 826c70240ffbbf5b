//! Sample code-review workflow for the stateflow engine.
//!
//! This crate is ordinary domain logic registered into the engine, not part
//! of the engine itself. It provides:
//!
//! - **Analysis**: function extraction, complexity scoring, and issue
//!   detection over a blob of source text
//! - **Nodes**: five node functions wiring the analysis into a graph, with a
//!   quality-gated loop-back from suggestion generation to the complexity
//!   check
//! - **Sample Graph**: the canonical `extract -> check -> detect -> suggest
//!   -> end` chain

pub mod analysis;
pub mod nodes;

pub use analysis::{FunctionRecord, Issue};
pub use nodes::{QUALITY_THRESHOLD, register_nodes, sample_graph};

/// Names of the state fields the review nodes read and write.
pub mod fields {
    /// Raw source text to review (input, required).
    pub const CODE_TEXT: &str = "code_text";
    /// Extracted function records.
    pub const FUNCTIONS: &str = "functions";
    /// Detected issues.
    pub const ISSUES: &str = "issues";
    /// Generated improvement suggestions.
    pub const SUGGESTIONS: &str = "suggestions";
    /// Overall quality score in `[0, 1]`.
    pub const QUALITY_SCORE: &str = "quality_score";
    /// Bookkeeping written by the nodes (counts, flags, pass counter).
    pub const METADATA: &str = "metadata";
}

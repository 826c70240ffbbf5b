//! Code analysis helpers backing the review nodes.
//!
//! These are plain functions over extracted source text; the nodes in
//! [`crate::nodes`] thread their results through the run state.

use serde::{Deserialize, Serialize};

/// Body length (in characters) at which a function counts as maximally
/// complex.
const COMPLEXITY_SATURATION: f64 = 200.0;

/// Body line count beyond which a function is flagged as too long.
const LONG_FUNCTION_LINES: usize = 50;

/// An extracted function: its name and raw body text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    /// The function's name.
    pub name: String,
    /// The function's body, excluding the header line.
    pub body: String,
}

/// A detected issue within one function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// The function the issue was found in.
    pub function: String,
    /// Issue category ("todo_marker", "long_function").
    pub kind: String,
    /// Human-readable detail.
    pub detail: String,
}

/// Splits source text into function records.
///
/// A line whose trimmed form starts with `def ` opens a new function; the
/// lines up to the next header form its body. Text with no headers falls
/// back to a single record covering the whole input.
#[must_use]
pub fn split_functions(code: &str) -> Vec<FunctionRecord> {
    let mut functions = Vec::new();
    let mut current: Option<String> = None;
    let mut body_lines: Vec<&str> = Vec::new();

    for line in code.lines() {
        let trimmed = line.trim_start();
        if let Some(header) = trimmed.strip_prefix("def ") {
            if let Some(name) = current.take() {
                functions.push(FunctionRecord {
                    name,
                    body: body_lines.join("\n"),
                });
            }
            let name = header
                .split('(')
                .next()
                .unwrap_or(header)
                .trim()
                .to_string();
            current = Some(name);
            body_lines.clear();
        } else if current.is_some() {
            body_lines.push(line);
        }
    }

    if let Some(name) = current {
        functions.push(FunctionRecord {
            name,
            body: body_lines.join("\n"),
        });
    }

    if functions.is_empty() {
        functions.push(FunctionRecord {
            name: "top_level".to_string(),
            body: code.to_string(),
        });
    }

    functions
}

/// Estimates a function's complexity in `[0, 1]` from its body length.
#[must_use]
pub fn complexity(body: &str) -> f64 {
    (body.len() as f64 / COMPLEXITY_SATURATION).min(1.0)
}

/// Finds issues in a single function.
#[must_use]
pub fn find_issues(function: &FunctionRecord) -> Vec<Issue> {
    let mut issues = Vec::new();

    if function.body.contains("TODO") || function.body.contains("FIXME") {
        issues.push(Issue {
            function: function.name.clone(),
            kind: "todo_marker".to_string(),
            detail: "contains a TODO/FIXME comment".to_string(),
        });
    }

    if function.body.lines().count() > LONG_FUNCTION_LINES {
        issues.push(Issue {
            function: function.name.clone(),
            kind: "long_function".to_string(),
            detail: format!("body exceeds {LONG_FUNCTION_LINES} lines"),
        });
    }

    issues
}

/// Renders one improvement suggestion for an issue.
#[must_use]
pub fn suggestion_for(issue: &Issue) -> String {
    format!(
        "address {} in '{}': {}",
        issue.kind, issue.function, issue.detail
    )
}

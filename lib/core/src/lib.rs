//! Shared types for the stateflow workflow engine.
//!
//! This crate provides the strongly-typed identifiers used throughout the
//! workspace. Domain types and errors live in the crates that own them.

pub mod id;

pub use id::{GraphId, ParseIdError, RunId};

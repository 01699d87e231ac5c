//! Error types for planner domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing planner domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlannerDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// The section name is empty after trimming.
    #[error("section name must not be empty")]
    EmptySectionName,

    /// A time of day did not match `HH:MM` or `HH:MM:SS`.
    #[error("invalid time of day '{0}', expected HH:MM or HH:MM:SS")]
    InvalidTimeOfDay(String),
}

/// Error returned while parsing enumerated values from their wire form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseValueError {
    /// Name of the value being parsed.
    pub kind: &'static str,
    /// Rejected input.
    pub value: String,
}

impl ParseValueError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

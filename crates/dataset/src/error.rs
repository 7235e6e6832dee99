use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::schema::{Role, MIN_MESSAGES};

/// Every kind of defect the validator can report. The display text is the
/// description shown to the data author.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ValidationIssue {
    // file level
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Error reading file: {0}")]
    Unreadable(String),

    // record level
    #[error("Empty line")]
    EmptyLine,
    #[error("Invalid JSON - {0}")]
    InvalidJson(String),
    #[error("Record must be a JSON object")]
    RecordNotObject,
    #[error("Missing '{0}' field")]
    MissingField(&'static str),
    #[error("'messages' must be a list")]
    MessagesNotList,
    #[error("Must have at least {} messages (user and assistant)", MIN_MESSAGES)]
    TooFewMessages { found: usize },
    #[error("Missing '{0}' message")]
    MissingRole(Role),

    // message level
    #[error("Message must be a dictionary")]
    MessageNotObject,
    #[error("Invalid role '{0}'")]
    InvalidRole(String),
    #[error("Content must be a string")]
    ContentNotString,
    #[error("Content cannot be empty")]
    EmptyContent,
}

/// One diagnostic, in encounter order. `line` is 1-based; file-level
/// diagnostics use line 0.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub line: usize,
    pub message_index: Option<usize>,
    pub issue: ValidationIssue,
}

impl ValidationError {
    pub fn file(issue: ValidationIssue) -> Self {
        Self { line: 0, message_index: None, issue }
    }

    pub fn line(line: usize, issue: ValidationIssue) -> Self {
        Self { line, message_index: None, issue }
    }

    pub fn message(line: usize, index: usize, issue: ValidationIssue) -> Self {
        Self { line, message_index: Some(index), issue }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.message_index) {
            (0, _) => write!(f, "{}", self.issue),
            (line, None) => write!(f, "Line {line}: {}", self.issue),
            (line, Some(idx)) => write!(f, "Line {line}, Message {idx}: {}", self.issue),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("cost per 1k tokens must be a finite, non-negative number (got {0})")]
    InvalidCostRate(f64),
    #[error("duplicate rate threshold must be within 0.0..=1.0 (got {0})")]
    InvalidDuplicateThreshold(f32),
}

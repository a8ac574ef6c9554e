//! Error types for Trapwatch.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for automation
//! - Remediation suggestions for humans
//!
//! Errors only arise at the input and configuration boundary. The rate
//! engine itself never fails: sparse or empty data produce neutral values.
//!
//! # Agent-Facing Output
//!
//! Errors serialize to structured JSON:
//! ```json
//! {
//!   "code": 11,
//!   "category": "input",
//!   "message": "observation obs-7 has negative count -3",
//!   "recoverable": true,
//!   "context": { "observation_id": "obs-7" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for Trapwatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Observation input shape errors.
    Input,
    /// Configuration file errors.
    Config,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for Trapwatch.
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (10-19)
    #[error("invalid observation input: {0}")]
    InvalidInput(String),

    #[error("observation {id} has negative count {count}")]
    NegativeCount { id: String, count: i64 },

    #[error("observation {id} has unparseable date {value:?}")]
    InvalidDate { id: String, value: String },

    #[error("observations {first} and {second} share the calendar day {date}")]
    DuplicateDate {
        first: String,
        second: String,
        date: String,
    },

    #[error("observation id must not be blank (entry {index})")]
    BlankId { index: usize },

    #[error("baseline observation {id} must have count 0, got {count}")]
    BaselineWithCount { id: String, count: i64 },

    // Configuration errors (20-29)
    #[error("configuration error: {0}")]
    Config(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Input errors
    /// - 20-29: Configuration errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidInput(_) => 10,
            Error::NegativeCount { .. } => 11,
            Error::InvalidDate { .. } => 12,
            Error::DuplicateDate { .. } => 13,
            Error::BlankId { .. } => 14,
            Error::BaselineWithCount { .. } => 15,
            Error::Config(_) => 20,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidInput(_)
            | Error::NegativeCount { .. }
            | Error::InvalidDate { .. }
            | Error::DuplicateDate { .. }
            | Error::BlankId { .. }
            | Error::BaselineWithCount { .. } => ErrorCategory::Input,

            Error::Config(_) => ErrorCategory::Config,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable by fixing
    /// the input or environment and retrying.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::InvalidInput(_)
            | Error::NegativeCount { .. }
            | Error::InvalidDate { .. }
            | Error::DuplicateDate { .. }
            | Error::BlankId { .. }
            | Error::BaselineWithCount { .. } => true,
            Error::Config(_) => true,
            Error::Io(_) => true,
            Error::Json(_) => true,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => {
                "Check the observation file against 'trapwatch schema TrapRecord'."
            }
            Error::NegativeCount { .. } => {
                "Counts are insects newly caught since the previous check and cannot be negative."
            }
            Error::InvalidDate { .. } => "Dates must be calendar days in YYYY-MM-DD form.",
            Error::DuplicateDate { .. } => {
                "A trap may record at most one observation per calendar day. Merge the entries upstream."
            }
            Error::BlankId { .. } => "Every observation needs the identifier assigned by the record store.",
            Error::BaselineWithCount { .. } => {
                "Baseline (trap setup/reset) observations carry no catch. Record the catch as a separate check."
            }
            Error::Config(_) => "Run 'trapwatch config show' to see which configuration is in effect.",
            Error::Io(_) => "Check that the file exists and is readable, then retry.",
            Error::Json(_) => "Invalid JSON in file. Check syntax with 'jq . <file>'.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "Invalid Observation Input",
            Error::NegativeCount { .. } => "Negative Observation Count",
            Error::InvalidDate { .. } => "Invalid Observation Date",
            Error::DuplicateDate { .. } => "Duplicate Observation Day",
            Error::BlankId { .. } => "Missing Observation Id",
            Error::BaselineWithCount { .. } => "Baseline With Catch",
            Error::Config(_) => "Configuration Error",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }

    /// Format for human consumption: headline, reason, and fix.
    pub fn to_human(&self) -> String {
        format!(
            "✗ {}\n  Reason: {}\n  Fix: {}",
            self.headline(),
            self,
            self.remediation()
        )
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (e.g., observation id).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::NegativeCount { id, count } | Error::BaselineWithCount { id, count } => {
                context.insert("observation_id".to_string(), serde_json::json!(id));
                context.insert("count".to_string(), serde_json::json!(count));
            }
            Error::InvalidDate { id, value } => {
                context.insert("observation_id".to_string(), serde_json::json!(id));
                context.insert("value".to_string(), serde_json::json!(value));
            }
            Error::DuplicateDate {
                first,
                second,
                date,
            } => {
                context.insert("observation_ids".to_string(), serde_json::json!([first, second]));
                context.insert("date".to_string(), serde_json::json!(date));
            }
            Error::BlankId { index } => {
                context.insert("index".to_string(), serde_json::json!(index));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_grouped_by_category() {
        let input = Error::NegativeCount {
            id: "obs-1".to_string(),
            count: -2,
        };
        assert_eq!(input.code(), 11);
        assert_eq!(input.category(), ErrorCategory::Input);

        let config = Error::Config("bad".to_string());
        assert_eq!(config.code(), 20);
        assert_eq!(config.category(), ErrorCategory::Config);

        let io = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.code(), 60);
        assert_eq!(io.category(), ErrorCategory::Io);
    }

    #[test]
    fn test_structured_error_context() {
        let err = Error::DuplicateDate {
            first: "a".to_string(),
            second: "b".to_string(),
            date: "2026-05-01".to_string(),
        };
        let structured = StructuredError::from(&err);
        assert_eq!(structured.code, 13);
        assert!(structured.recoverable);
        assert_eq!(structured.context["date"], serde_json::json!("2026-05-01"));
        assert_eq!(
            structured.context["observation_ids"],
            serde_json::json!(["a", "b"])
        );
    }

    #[test]
    fn test_structured_error_json() {
        let err = Error::BlankId { index: 3 };
        let json = StructuredError::from(&err).with_context("file", "traps.json").to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["category"], "input");
        assert_eq!(value["context"]["index"], 3);
        assert_eq!(value["context"]["file"], "traps.json");
    }

    #[test]
    fn test_human_format() {
        let err = Error::Config("window_days must be positive".to_string());
        let human = err.to_human();
        assert!(human.starts_with("✗ Configuration Error"));
        assert!(human.contains("Reason: configuration error: window_days must be positive"));
        assert!(human.contains("Fix: Run 'trapwatch config show'"));
    }

    #[test]
    fn test_json_error_covers_deserialization() {
        let source = serde_json::from_str::<u32>("1.5").unwrap_err();
        let err = Error::from(source);
        let message = err.to_string();
        assert!(message.starts_with("JSON error: invalid type: floating point"));
        assert!(!message.contains("serialization"));
        assert_eq!(err.code(), 61);
    }
}

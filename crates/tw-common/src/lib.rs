//! Trapwatch common types, IDs, and errors.
//!
//! This crate provides foundational types shared across the workspace:
//! - Identity newtypes for observations, traps, and CLI runs
//! - The raw observation input model with boundary validation
//! - Pest type identifiers
//! - Common error types with stable codes
//! - Output format specifications

pub mod error;
pub mod id;
pub mod observation;
pub mod output;

pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use id::{ObservationId, PestType, RunId, TrapId};
pub use observation::{parse_calendar_day, Observation, ObservationBatch, RawObservation, TrapRecord};
pub use output::OutputFormat;

/// Schema version for input and report documents.
pub const SCHEMA_VERSION: &str = "1.0.0";

//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::monitor::{MonitorConfig, MAX_WINDOW_DAYS};

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

impl From<ValidationError> for tw_common::Error {
    fn from(err: ValidationError) -> Self {
        tw_common::Error::Config(err.to_string())
    }
}

/// Validate monitor configuration semantically.
pub fn validate_monitor(config: &MonitorConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    if config.window_days == 0 || config.window_days > MAX_WINDOW_DAYS {
        return Err(ValidationError::InvalidValue {
            field: "window_days".to_string(),
            message: format!(
                "Must be in [1, {}], got {}",
                MAX_WINDOW_DAYS, config.window_days
            ),
        });
    }

    if config.pest_thresholds.default_threshold == 0 {
        return Err(ValidationError::InvalidValue {
            field: "pest_thresholds.default_threshold".to_string(),
            message: "Must be positive, got 0".to_string(),
        });
    }

    let mut seen = std::collections::BTreeMap::new();
    for (name, threshold) in &config.pest_thresholds.by_pest {
        let normalized = tw_common::PestType::new(name);
        if normalized.as_str().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "pest_thresholds.by_pest".to_string(),
                message: "Pest names must not be blank".to_string(),
            });
        }
        if *threshold == 0 {
            return Err(ValidationError::InvalidValue {
                field: format!("pest_thresholds.by_pest.{}", name),
                message: "Must be positive, got 0".to_string(),
            });
        }
        if let Some(previous) = seen.insert(normalized.clone(), name) {
            return Err(ValidationError::SemanticError(format!(
                "Pest thresholds {:?} and {:?} both normalize to {}",
                previous, name, normalized
            )));
        }
    }

    Ok(())
}

//! Exit codes for the trapwatch CLI.
//!
//! Scripts read the outcome from the code without parsing output.
//!
//! Exit code ranges:
//! - 0-2: risk outcome of the assessed traps (worst level)
//! - 10-19: user/input errors (fixable by the caller)
//! - 20-29: internal and I/O errors

use tw_common::{Error, ErrorCategory};

use crate::risk::RiskLevel;

/// Stable process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Every assessed trap is safe (or the command has no risk outcome).
    Safe = 0,
    /// Worst level is warning.
    Warning = 1,
    /// Worst level is danger.
    Danger = 2,

    /// Invalid arguments.
    ArgsError = 10,
    /// Observation input failed boundary validation.
    InputError = 11,
    /// Configuration could not be loaded or is invalid.
    ConfigError = 12,

    /// Internal error (bug).
    InternalError = 20,
    /// I/O error reading input or writing output.
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Codes 0-2 carry a risk outcome, not a failure.
    pub fn is_operational(self) -> bool {
        (self as i32) < 10
    }

    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }

    /// Name for JSON output.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Safe => "OK_SAFE",
            ExitCode::Warning => "OK_WARNING",
            ExitCode::Danger => "OK_DANGER",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::InputError => "ERR_INPUT",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }

    /// Exit code for a failed command. Malformed JSON input counts as an
    /// input error, not I/O.
    pub fn for_error(err: &Error) -> Self {
        if matches!(err, Error::Json(_)) {
            return ExitCode::InputError;
        }
        match err.category() {
            ErrorCategory::Input => ExitCode::InputError,
            ErrorCategory::Config => ExitCode::ConfigError,
            ErrorCategory::Io => ExitCode::IoError,
        }
    }
}

impl From<RiskLevel> for ExitCode {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Safe => ExitCode::Safe,
            RiskLevel::Warning => ExitCode::Warning,
            RiskLevel::Danger => ExitCode::Danger,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_levels_map_to_operational_codes() {
        assert_eq!(ExitCode::from(RiskLevel::Safe).as_i32(), 0);
        assert_eq!(ExitCode::from(RiskLevel::Warning).as_i32(), 1);
        assert_eq!(ExitCode::from(RiskLevel::Danger).as_i32(), 2);
        assert!(ExitCode::Danger.is_operational());
        assert!(!ExitCode::Danger.is_error());
    }

    #[test]
    fn errors_map_by_category() {
        let input = Error::NegativeCount {
            id: "o1".into(),
            count: -1,
        };
        assert_eq!(ExitCode::for_error(&input), ExitCode::InputError);
        assert_eq!(
            ExitCode::for_error(&Error::Config("bad".into())),
            ExitCode::ConfigError
        );
        let io = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(ExitCode::for_error(&io), ExitCode::IoError);
        assert!(ExitCode::IoError.is_error());

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(ExitCode::for_error(&Error::Json(json)), ExitCode::InputError);
    }

    #[test]
    fn display_includes_name_and_code() {
        assert_eq!(ExitCode::ConfigError.to_string(), "ERR_CONFIG (12)");
    }
}

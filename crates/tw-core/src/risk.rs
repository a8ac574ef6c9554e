//! Risk classification.
//!
//! Two modes coexist:
//! - Rate-based (primary): average insects/day against fixed thresholds.
//! - Count-based (legacy): an absolute count against a per-pest threshold.
//!
//! Both are pure functions recomputed on every call. Alert dispatch is an
//! external concern; see `alerting` for the notify decision.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Rates at or above this are at least `warning` (insects/day).
pub const RATE_WARNING_THRESHOLD: f64 = 1.0;

/// Rates strictly above this are `danger` (insects/day).
pub const RATE_DANGER_THRESHOLD: f64 = 2.0;

/// Legacy mode: percentage of threshold at which `warning` starts.
pub const COUNT_WARNING_PERCENT: f64 = 80.0;

/// Discrete risk level. Ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Warning,
    Danger,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Safe => write!(f, "safe"),
            RiskLevel::Warning => write!(f, "warning"),
            RiskLevel::Danger => write!(f, "danger"),
        }
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "safe" | "low" => Ok(RiskLevel::Safe),
            "warning" | "warn" => Ok(RiskLevel::Warning),
            "danger" | "high" => Ok(RiskLevel::Danger),
            _ => Err(format!("unknown risk level: {}", s)),
        }
    }
}

/// Which classifier produced an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMode {
    Rate,
    Threshold,
}

/// A classified risk with grower-facing messaging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub mode: ClassificationMode,
    /// Input relative to the danger threshold (rate mode) or the pest
    /// threshold (count mode), in percent.
    pub percentage: f64,
    pub message: String,
    pub action_message: String,
    /// Whether a UI banner should render.
    pub should_show_warning: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u32>,
}

/// Classify an average daily rate.
///
/// `r > 2` is danger, `1 <= r <= 2` warning, `r < 1` safe. The upper
/// boundary belongs to warning. Negative or NaN input is treated as 0.
pub fn classify_by_rate(avg_rate: f64) -> RiskAssessment {
    let rate = if avg_rate.is_nan() || avg_rate < 0.0 {
        0.0
    } else {
        avg_rate
    };

    let level = if rate > RATE_DANGER_THRESHOLD {
        RiskLevel::Danger
    } else if rate >= RATE_WARNING_THRESHOLD {
        RiskLevel::Warning
    } else {
        RiskLevel::Safe
    };

    let (message, action_message) = match level {
        RiskLevel::Danger => (
            format!("High pest activity: {:.2} insects/day", rate),
            "The action window is now. Apply control measures and re-check the trap within 2-3 days."
                .to_string(),
        ),
        RiskLevel::Warning => (
            format!("Pest activity rising: {:.2} insects/day", rate),
            "Activity is rising. Prepare control measures and check traps more often.".to_string(),
        ),
        RiskLevel::Safe => (
            format!("Pest activity low: {:.2} insects/day", rate),
            "Continue regular monitoring.".to_string(),
        ),
    };

    RiskAssessment {
        level,
        mode: ClassificationMode::Rate,
        percentage: rate * 100.0 / RATE_DANGER_THRESHOLD,
        message,
        action_message,
        should_show_warning: level != RiskLevel::Safe,
        rate: Some(rate),
        count: None,
        threshold: None,
    }
}

/// Classify an absolute count against a pest threshold (legacy mode).
///
/// `count >= threshold` is danger, `>= 80%` warning, else safe. A zero
/// threshold cannot be expressed as a percentage; it reports 100% and
/// classifies as danger, since any count reaches it. Configuration
/// validation rejects zero thresholds before they get here.
pub fn classify_by_threshold(count: u32, threshold: u32) -> RiskAssessment {
    let percentage = if threshold == 0 {
        100.0
    } else {
        f64::from(count) * 100.0 / f64::from(threshold)
    };

    let level = if count >= threshold {
        RiskLevel::Danger
    } else if percentage >= COUNT_WARNING_PERCENT {
        RiskLevel::Warning
    } else {
        RiskLevel::Safe
    };

    let (message, action_message) = match level {
        RiskLevel::Danger => (
            format!(
                "Threshold reached: {} of {} ({:.0}%)",
                count, threshold, percentage
            ),
            "The count has reached the action threshold. Apply control measures now.".to_string(),
        ),
        RiskLevel::Warning => (
            format!(
                "Approaching threshold: {} of {} ({:.0}%)",
                count, threshold, percentage
            ),
            "The count is close to the action threshold. Prepare control measures.".to_string(),
        ),
        RiskLevel::Safe => (
            format!("Below threshold: {} of {} ({:.0}%)", count, threshold, percentage),
            "Continue regular monitoring.".to_string(),
        ),
    };

    RiskAssessment {
        level,
        mode: ClassificationMode::Threshold,
        percentage,
        message,
        action_message,
        should_show_warning: percentage >= COUNT_WARNING_PERCENT,
        rate: None,
        count: Some(count),
        threshold: Some(threshold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_boundaries() {
        assert_eq!(classify_by_rate(0.5).level, RiskLevel::Safe);
        assert_eq!(classify_by_rate(0.999).level, RiskLevel::Safe);
        assert_eq!(classify_by_rate(1.0).level, RiskLevel::Warning);
        assert_eq!(classify_by_rate(2.0).level, RiskLevel::Warning);
        assert_eq!(classify_by_rate(2.01).level, RiskLevel::Danger);
    }

    #[test]
    fn rate_percentage_relative_to_danger() {
        assert!((classify_by_rate(1.0).percentage - 50.0).abs() < 1e-9);
        assert!((classify_by_rate(3.0).percentage - 150.0).abs() < 1e-9);
        assert_eq!(classify_by_rate(0.0).percentage, 0.0);
    }

    #[test]
    fn rate_messages_are_level_specific() {
        let danger = classify_by_rate(4.0);
        assert!(danger.message.contains("4.00 insects/day"));
        assert!(danger.action_message.contains("action window is now"));
        assert!(danger.should_show_warning);

        let warning = classify_by_rate(1.5);
        assert!(warning.action_message.contains("Prepare control measures"));

        let safe = classify_by_rate(0.2);
        assert_eq!(safe.action_message, "Continue regular monitoring.");
        assert!(!safe.should_show_warning);
    }

    #[test]
    fn rate_sanitizes_bad_input() {
        assert_eq!(classify_by_rate(f64::NAN).level, RiskLevel::Safe);
        assert_eq!(classify_by_rate(-3.0).rate, Some(0.0));
    }

    #[test]
    fn threshold_boundaries() {
        let warn = classify_by_threshold(8, 10);
        assert_eq!(warn.percentage, 80.0);
        assert!(warn.should_show_warning);
        assert_eq!(warn.level, RiskLevel::Warning);

        assert_eq!(classify_by_threshold(10, 10).level, RiskLevel::Danger);
        assert_eq!(classify_by_threshold(15, 10).level, RiskLevel::Danger);

        let safe = classify_by_threshold(7, 10);
        assert_eq!(safe.level, RiskLevel::Safe);
        assert!(!safe.should_show_warning);
    }

    #[test]
    fn threshold_zero() {
        let a = classify_by_threshold(0, 0);
        assert_eq!(a.level, RiskLevel::Danger);
        assert_eq!(a.percentage, 100.0);
    }

    #[test]
    fn level_ordering_and_parse() {
        assert!(RiskLevel::Safe < RiskLevel::Warning);
        assert!(RiskLevel::Warning < RiskLevel::Danger);
        assert_eq!("Danger".parse::<RiskLevel>().unwrap(), RiskLevel::Danger);
        assert_eq!("warn".parse::<RiskLevel>().unwrap(), RiskLevel::Warning);
        assert!("red".parse::<RiskLevel>().is_err());
        assert_eq!(serde_json::to_string(&RiskLevel::Safe).unwrap(), "\"safe\"");
    }
}

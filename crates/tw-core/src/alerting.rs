//! Notification decisions.
//!
//! Whether a risk change should trigger an alert. Dispatch (e-mail, push)
//! is out of scope; callers act on [`NotificationDecision::notify`]. The
//! previous level is caller-supplied since nothing is persisted here.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tw_config::NotificationPolicy;

use crate::risk::RiskLevel;

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// Current level is safe.
    BelowAlertLevel,
    /// Level rose, or there was no previous level.
    Escalated,
    /// Same non-safe level as before.
    Repeated,
    /// Level fell but is still above safe.
    Deescalated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NotificationDecision {
    pub notify: bool,
    pub previous: Option<RiskLevel>,
    pub current: RiskLevel,
    pub reason: DecisionReason,
}

/// Decide whether moving from `previous` to `current` warrants an alert.
pub fn decide_notification(
    previous: Option<RiskLevel>,
    current: RiskLevel,
    policy: &NotificationPolicy,
) -> NotificationDecision {
    let (notify, reason) = if current == RiskLevel::Safe {
        (false, DecisionReason::BelowAlertLevel)
    } else {
        match previous {
            None => (true, DecisionReason::Escalated),
            Some(prev) if current > prev => (true, DecisionReason::Escalated),
            Some(prev) if current < prev => (false, DecisionReason::Deescalated),
            Some(_) => {
                let renotify = match current {
                    RiskLevel::Danger => policy.renotify_on_repeat_danger,
                    _ => policy.renotify_on_repeat_warning,
                };
                (renotify, DecisionReason::Repeated)
            }
        }
    };

    tracing::trace!(
        previous = ?previous,
        %current,
        notify,
        reason = ?reason,
        "notification decided"
    );

    NotificationDecision {
        notify,
        previous,
        current,
        reason,
    }
}

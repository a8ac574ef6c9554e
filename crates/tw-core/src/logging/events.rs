//! Structured event vocabulary.
//!
//! Every CLI-level event carries the invocation's `run_id` and a stage so
//! JSONL logs from one run can be correlated.

use serde::{Deserialize, Serialize};
use tw_common::{RunId, TrapId};

/// Processing stages of one `trapwatch` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration.
    Init,
    /// Reading and validating observation input.
    Load,
    /// Rate computation and window averaging.
    Rate,
    /// Risk classification and notification decisions.
    Assess,
    /// Rendering the payload.
    Report,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Load => "load",
            Stage::Rate => "rate",
            Stage::Assess => "assess",
            Stage::Report => "report",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names.
pub mod event_names {
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    pub const INPUT_LOADED: &str = "input.loaded";

    pub const ENGINE_RATED: &str = "engine.rated";
    pub const ENGINE_WINDOW_AVERAGED: &str = "engine.window_averaged";

    pub const RISK_CLASSIFIED: &str = "risk.classified";
    pub const ALERT_DECIDED: &str = "alert.decided";

    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
    pub const CONFIG_ERROR: &str = "config.error";

    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Correlation identifiers attached to every event of a run.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: RunId,
    pub trap_id: Option<TrapId>,
}

impl LogContext {
    pub fn new(run_id: RunId) -> Self {
        LogContext {
            run_id,
            trap_id: None,
        }
    }

    /// Narrow the context to a single trap.
    pub fn for_trap(&self, trap_id: &TrapId) -> Self {
        LogContext {
            run_id: self.run_id.clone(),
            trap_id: Some(trap_id.clone()),
        }
    }

    /// Trap id for a log field; empty outside a trap scope.
    pub fn trap(&self) -> &str {
        self.trap_id.as_ref().map(TrapId::as_str).unwrap_or("")
    }
}

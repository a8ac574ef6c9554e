//! Payload rendering for CLI commands.
//!
//! Every command produces a serializable payload; this module turns it
//! into the requested [`OutputFormat`]. JSON is the stable machine
//! contract, Markdown and summary are for people.

pub mod markdown;

use serde::Serialize;
use tw_common::{OutputFormat, Result};

use crate::assess::FarmAssessment;
use crate::engine::DailyRatePoint;
use crate::risk::RiskAssessment;

/// A payload that knows how to render itself for people.
pub trait Render: Serialize {
    fn markdown(&self) -> String;
    fn summary(&self) -> String;
}

/// Render `payload` in `format`. `Exitcode` renders nothing.
pub fn render<T: Render>(payload: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(payload)?;
            out.push('\n');
            out
        }
        OutputFormat::Md => payload.markdown(),
        OutputFormat::Summary => payload.summary(),
        OutputFormat::Exitcode => String::new(),
    })
}

fn level_badge(level: crate::risk::RiskLevel) -> &'static str {
    match level {
        crate::risk::RiskLevel::Safe => "[SAFE]",
        crate::risk::RiskLevel::Warning => "[WARN]",
        crate::risk::RiskLevel::Danger => "[DANGER]",
    }
}

impl Render for FarmAssessment {
    fn markdown(&self) -> String {
        markdown::farm(self)
    }

    fn summary(&self) -> String {
        let mut out = String::new();
        for trap in &self.traps {
            out.push_str(&format!(
                "{:<8} {} avg {:.2}/day over {}d{}\n",
                level_badge(trap.level()),
                trap.trap_id,
                trap.window.average_rate,
                trap.window.days,
                if trap.notification.notify { " (notify)" } else { "" },
            ));
        }
        out.push_str(&format!(
            "{} trap(s) as of {}, worst {}, {} to notify\n",
            self.traps.len(),
            self.today,
            self.worst_level,
            self.notify_count
        ));
        out
    }
}

impl Render for RiskAssessment {
    fn markdown(&self) -> String {
        markdown::risk(self)
    }

    fn summary(&self) -> String {
        format!("{} {}\n", level_badge(self.level), self.message)
    }
}

/// A daily series for one trap.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesReport {
    pub trap_id: tw_common::TrapId,
    pub points: Vec<DailyRatePoint>,
}

impl Render for SeriesReport {
    fn markdown(&self) -> String {
        markdown::series(self)
    }

    fn summary(&self) -> String {
        let observed = self.points.iter().filter(|p| p.is_observation_day).count();
        let peak = self.points.iter().map(|p| p.rate).fold(0.0_f64, f64::max);
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => format!(
                "{}: {} day(s) {}..{}, {} observation day(s), peak {:.2}/day\n",
                self.trap_id,
                self.points.len(),
                first.date,
                last.date,
                observed,
                peak
            ),
            _ => format!("{}: no observations\n", self.trap_id),
        }
    }
}

impl Render for Vec<SeriesReport> {
    fn markdown(&self) -> String {
        self.iter().map(Render::markdown).collect::<Vec<_>>().join("\n")
    }

    fn summary(&self) -> String {
        self.iter().map(Render::summary).collect()
    }
}

//! Markdown renderers.

use std::fmt::Write;

use super::SeriesReport;
use crate::assess::FarmAssessment;
use crate::risk::RiskAssessment;

pub fn farm(farm: &FarmAssessment) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Trap assessment ({})", farm.today);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Worst level: **{}**. Window: {} day(s). Traps to notify: {}.",
        farm.worst_level, farm.window_days, farm.notify_count
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "| Trap | Pest | Avg rate (/day) | Level | Latest count | Notify |"
    );
    let _ = writeln!(out, "|---|---|---:|---|---|---|");
    for trap in &farm.traps {
        let pest = trap
            .pest_type
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        let latest = trap
            .latest_count
            .as_ref()
            .map(|l| {
                format!(
                    "{} ({:.0}%, {})",
                    l.assessment.count.unwrap_or(0),
                    l.assessment.percentage,
                    l.assessment.level
                )
            })
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "| {} | {} | {:.2} | {} | {} | {} |",
            trap.trap_id,
            pest,
            trap.window.average_rate,
            trap.level(),
            latest,
            if trap.notification.notify { "yes" } else { "no" }
        );
    }

    let flagged: Vec<_> = farm
        .traps
        .iter()
        .filter(|t| t.rate_risk.should_show_warning)
        .collect();
    if !flagged.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Actions");
        let _ = writeln!(out);
        for trap in flagged {
            let _ = writeln!(
                out,
                "- **{}**: {} {}",
                trap.trap_id, trap.rate_risk.message, trap.rate_risk.action_message
            );
        }
    }
    out
}

pub fn risk(assessment: &RiskAssessment) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "**{}**: {}", assessment.level, assessment.message);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", assessment.action_message);
    out
}

pub fn series(report: &SeriesReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## Daily rates: {}", report.trap_id);
    let _ = writeln!(out);
    let _ = writeln!(out, "| Date | Rate (/day) | Count | Days since previous |");
    let _ = writeln!(out, "|---|---:|---:|---:|");
    for point in &report.points {
        let count = point
            .count
            .map(|c| c.to_string())
            .unwrap_or_default();
        let dsp = point
            .days_since_previous
            .map(|d| d.to_string())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "| {} | {:.2} | {} | {} |",
            point.date, point.rate, count, dsp
        );
    }
    out
}

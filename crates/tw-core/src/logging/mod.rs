//! Structured logging for trapwatch.
//!
//! Dual-mode output:
//! - Human-readable console lines for interactive use
//! - JSON lines for pipelines and log collectors
//!
//! stdout is reserved for command payloads; all log output goes to
//! stderr. CLI-level events carry the run's correlation id via
//! [`LogContext`] and a stable event name from [`event_names`].

pub mod config;
pub mod events;

pub use config::{LogConfig, LogFormat, LogLevel};
pub use events::{event_names, LogContext, Stage};

use std::io::IsTerminal;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// Returns false if a subscriber was already installed (tests, embedding
/// applications); the existing one is left in place.
pub fn init_logging(config: &LogConfig) -> bool {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(config.level).into())
        .parse_lossy("");

    match config.format {
        LogFormat::Human => {
            let builder = fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal());
            if config.timestamps {
                builder.try_init().is_ok()
            } else {
                builder.without_time().try_init().is_ok()
            }
        }
        LogFormat::Jsonl => {
            let builder = fmt()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_env_filter(filter)
                .with_writer(std::io::stderr);
            if config.timestamps {
                builder.try_init().is_ok()
            } else {
                builder.without_time().try_init().is_ok()
            }
        }
    }
}

/// Emit a structured event with the run context attached.
///
/// ```ignore
/// log_event!(ctx, INFO, event_names::INPUT_LOADED, Stage::Load, "loaded input",
///     traps = 3);
/// ```
#[macro_export]
macro_rules! log_event {
    ($ctx:expr, INFO, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::info!(
            event = $event,
            run_id = %$ctx.run_id,
            trap_id = $ctx.trap(),
            stage = %$stage,
            $($key = $val,)*
            "{}", $msg
        )
    };
    ($ctx:expr, DEBUG, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::debug!(
            event = $event,
            run_id = %$ctx.run_id,
            trap_id = $ctx.trap(),
            stage = %$stage,
            $($key = $val,)*
            "{}", $msg
        )
    };
    ($ctx:expr, WARN, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::warn!(
            event = $event,
            run_id = %$ctx.run_id,
            trap_id = $ctx.trap(),
            stage = %$stage,
            $($key = $val,)*
            "{}", $msg
        )
    };
    ($ctx:expr, ERROR, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::error!(
            event = $event,
            run_id = %$ctx.run_id,
            trap_id = $ctx.trap(),
            stage = %$stage,
            $($key = $val,)*
            "{}", $msg
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_common::RunId;

    #[test]
    fn second_init_is_a_no_op() {
        let config = LogConfig::default().with_overrides(Some(LogLevel::Off), None);
        init_logging(&config);
        assert!(!init_logging(&config));
    }

    #[test]
    fn macro_expands_for_all_levels() {
        let ctx = LogContext::new(RunId::new());
        log_event!(ctx, INFO, event_names::RUN_STARTED, Stage::Init, "start");
        log_event!(ctx, DEBUG, event_names::ENGINE_RATED, Stage::Rate, "rated", observations = 3);
        log_event!(ctx, WARN, event_names::CONFIG_DEFAULT_USED, Stage::Init, "defaults");
        log_event!(ctx, ERROR, event_names::INTERNAL_ERROR, Stage::Report, "boom", code = 20);
    }
}

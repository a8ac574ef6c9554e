//! Trapwatch - pest trap observation rate and risk engine
//!
//! Entry point for the `trapwatch` CLI:
//! - Assess traps from observation records (rate-based risk, notify decision)
//! - Expand gap-free daily rate series for charting
//! - Classify a rate or a count directly
//! - Validate input and inspect configuration

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand};
use serde::Serialize;
use tw_common::{
    parse_calendar_day, ObservationBatch, OutputFormat, PestType, RunId, StructuredError, TrapId,
    SCHEMA_VERSION,
};
use tw_config::{load_config, ConfigSnapshot, LoadedConfig, MonitorConfig, ValidationError};
use tw_core::assess::{assess_farm, AssessOptions};
use tw_core::clock::{Clock, FixedClock, SystemClock};
use tw_core::engine::{compute_rates, expand_last_n_days, expand_to_daily_rates};
use tw_core::exit_codes::ExitCode;
use tw_core::log_event;
use tw_core::logging::{event_names, init_logging, LogConfig, LogContext, LogFormat, LogLevel, Stage};
use tw_core::output::{render, Render, SeriesReport};
use tw_core::risk::{classify_by_rate, classify_by_threshold, RiskLevel};
use tw_core::schema::{available_schemas, generate_all_schemas, generate_schema};

/// Pest trap monitoring: daily rates, windowed averages and risk levels
#[derive(Parser)]
#[command(name = "trapwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to monitor.json (overrides TRAPWATCH_CONFIG and config dirs)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Evaluate as of this calendar day instead of today (UTC)
    #[arg(long, global = true, value_parser = parse_day_arg)]
    today: Option<NaiveDate>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log line format on stderr (human or jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Omit timestamps from log lines
    #[arg(long, global = true)]
    no_log_timestamps: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess every trap in an observation file
    Assess(AssessArgs),

    /// Expand observations into a gap-free daily rate series
    Series(SeriesArgs),

    /// Classify a rate or a count directly
    Classify {
        #[command(subcommand)]
        command: ClassifyCommands,
    },

    /// Validate an observation file without assessing it
    Check(InputArgs),

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Print JSON Schemas for input, config and report types
    Schema(SchemaArgs),

    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Observation JSON file (one trap record or an array); `-` for stdin
    input: PathBuf,
}

#[derive(Args, Debug)]
struct AssessArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Averaging window in days (defaults to the configured window)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=365))]
    window: Option<u32>,

    /// Include the daily rate series for each trap
    #[arg(long)]
    series: bool,

    /// Limit the series to observations from the last N days
    #[arg(long, requires = "series")]
    series_days: Option<u32>,

    /// Previous level of a trap, as TRAP=LEVEL (repeatable)
    #[arg(long = "previous", value_parser = parse_previous_arg)]
    previous: Vec<(TrapId, RiskLevel)>,

    /// Previous level for traps not named by --previous
    #[arg(long)]
    previous_default: Option<RiskLevel>,
}

#[derive(Args, Debug)]
struct SeriesArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Only expand this trap
    #[arg(long)]
    trap: Option<String>,

    /// Only include observations from the last N days
    #[arg(long)]
    last_days: Option<u32>,
}

#[derive(Subcommand, Debug)]
enum ClassifyCommands {
    /// Classify an average rate in insects/day
    Rate {
        #[arg(allow_negative_numbers = true)]
        rate: f64,
    },
    /// Classify an absolute count against a threshold (legacy mode)
    Count {
        count: u32,

        /// Threshold to compare against (defaults to the pest's configured threshold)
        #[arg(long)]
        threshold: Option<u32>,

        /// Pest type used to look up the configured threshold
        #[arg(long)]
        pest: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective configuration and where it came from
    Show,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Type name to print
    name: Option<String>,

    /// List available type names
    #[arg(long, conflicts_with = "name")]
    list: bool,

    /// Print every schema keyed by type name
    #[arg(long, conflicts_with_all = ["name", "list"])]
    all: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Args(String),

    #[error(transparent)]
    Run(#[from] tw_common::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::Run(err.into())
    }
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Args(_) => ExitCode::ArgsError,
            CliError::Run(err) => ExitCode::for_error(err),
            CliError::Internal(_) => ExitCode::InternalError,
        }
    }
}

type CmdResult = Result<ExitCode, CliError>;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Safe
            };
            std::process::exit(code.as_i32());
        }
    };

    let cli_level = if cli.global.quiet {
        Some(LogLevel::Error)
    } else {
        match cli.global.verbose {
            0 => None,
            n => Some((0..n).fold(LogLevel::default(), |level, _| level.more_verbose())),
        }
    };
    init_logging(
        &LogConfig::from_env(cli_level, cli.global.log_format)
            .with_timestamps(!cli.global.no_log_timestamps),
    );

    let ctx = LogContext::new(RunId::new());
    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_STARTED,
        Stage::Init,
        "trapwatch started",
        version = env!("CARGO_PKG_VERSION")
    );

    let result = match &cli.command {
        Commands::Assess(args) => run_assess(&cli.global, &ctx, args),
        Commands::Series(args) => run_series(&cli.global, &ctx, args),
        Commands::Classify { command } => run_classify(&cli.global, &ctx, command),
        Commands::Check(args) => run_check(&cli.global, &ctx, args),
        Commands::Config { command } => match command {
            ConfigCommands::Show => run_config_show(&cli.global, &ctx),
        },
        Commands::Schema(args) => run_schema(args),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "trapwatch", &mut std::io::stdout());
            Ok(ExitCode::Safe)
        }
        Commands::Version => run_version(&cli.global),
    };

    let code = match result {
        Ok(code) => code,
        Err(err) => {
            let code = err.exit_code();
            report_error(&cli.global, &ctx, &err, code);
            code
        }
    };

    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_FINISHED,
        Stage::Report,
        "trapwatch finished",
        exit_code = code.as_i32()
    );
    std::process::exit(code.as_i32());
}

fn report_error(global: &GlobalOpts, ctx: &LogContext, err: &CliError, code: ExitCode) {
    match err {
        CliError::Args(message) => {
            eprintln!("error: {}", message);
        }
        CliError::Run(inner) => {
            if code == ExitCode::ConfigError {
                log_event!(ctx, ERROR, event_names::CONFIG_ERROR, Stage::Init, inner.to_string());
            }
            if global.format.is_machine() {
                let structured = StructuredError::from(inner).with_context("exit_code", code.as_i32());
                eprintln!("{}", structured.to_json());
            } else {
                eprintln!("{}", inner.to_human());
            }
        }
        CliError::Internal(message) => {
            log_event!(
                ctx,
                ERROR,
                event_names::INTERNAL_ERROR,
                Stage::Report,
                "internal error",
                error = message.as_str()
            );
            eprintln!("internal error: {}", message);
        }
    }
}

fn parse_day_arg(value: &str) -> Result<NaiveDate, String> {
    parse_calendar_day(value).ok_or_else(|| format!("expected YYYY-MM-DD, got {:?}", value))
}

fn parse_previous_arg(value: &str) -> Result<(TrapId, RiskLevel), String> {
    let (trap, level) = value
        .split_once('=')
        .ok_or_else(|| format!("expected TRAP=LEVEL, got {:?}", value))?;
    let trap = trap.trim();
    if trap.is_empty() {
        return Err("trap id must not be blank".to_string());
    }
    Ok((TrapId::new(trap), level.parse()?))
}

/// Read "today" once for the whole invocation.
fn today(global: &GlobalOpts) -> NaiveDate {
    match global.today {
        Some(day) => FixedClock(day).today(),
        None => SystemClock.today(),
    }
}

fn load(global: &GlobalOpts, ctx: &LogContext) -> Result<LoadedConfig, CliError> {
    let loaded = load_config(global.config.as_deref())?;
    if loaded.is_default() {
        log_event!(
            ctx,
            DEBUG,
            event_names::CONFIG_DEFAULT_USED,
            Stage::Init,
            "no monitor.json found; using built-in defaults"
        );
    } else {
        let path = loaded
            .paths
            .monitor
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        log_event!(
            ctx,
            INFO,
            event_names::CONFIG_LOADED,
            Stage::Init,
            "configuration loaded",
            path = path.as_str(),
            source = tracing::field::display(&loaded.paths.source)
        );
    }
    Ok(loaded)
}

fn read_batches(ctx: &LogContext, input: &Path) -> Result<Vec<ObservationBatch>, CliError> {
    let batches = if input == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(tw_common::Error::from)?;
        ObservationBatch::parse_json(&content)?
    } else {
        ObservationBatch::from_file(input)?
    };

    let observations: usize = batches.iter().map(|b| b.observations.len()).sum();
    log_event!(
        ctx,
        INFO,
        event_names::INPUT_LOADED,
        Stage::Load,
        "observation input validated",
        traps = batches.len(),
        observations = observations
    );
    Ok(batches)
}

fn emit<T: Render>(payload: &T, format: OutputFormat) -> Result<(), CliError> {
    let out = render(payload, format)
        .map_err(|e| CliError::Internal(format!("failed to render output: {}", e)))?;
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(out.as_bytes())
        .and_then(|_| stdout.flush())
        .map_err(tw_common::Error::from)?;
    Ok(())
}

fn run_assess(global: &GlobalOpts, ctx: &LogContext, args: &AssessArgs) -> CmdResult {
    let loaded = load(global, ctx)?;
    let batches = read_batches(ctx, &args.input.input)?;
    let today = today(global);

    let options = AssessOptions {
        window_days: args.window,
        include_series: args.series,
        series_last_days: args.series_days,
        previous_levels: args.previous.iter().cloned().collect::<BTreeMap<_, _>>(),
        default_previous_level: args.previous_default,
    };
    let farm = assess_farm(&batches, &loaded.config, &options, today);

    for trap in &farm.traps {
        let trap_ctx = ctx.for_trap(&trap.trap_id);
        log_event!(
            trap_ctx,
            DEBUG,
            event_names::ENGINE_WINDOW_AVERAGED,
            Stage::Rate,
            "window averaged",
            average_rate = trap.window.average_rate,
            covered_days = trap.window.covered_days
        );
        log_event!(
            trap_ctx,
            INFO,
            event_names::RISK_CLASSIFIED,
            Stage::Assess,
            trap.rate_risk.message.as_str(),
            level = tracing::field::display(trap.level())
        );
        log_event!(
            trap_ctx,
            DEBUG,
            event_names::ALERT_DECIDED,
            Stage::Assess,
            "notification decided",
            notify = trap.notification.notify,
            reason = tracing::field::debug(trap.notification.reason)
        );
    }

    emit(&farm, global.format)?;
    Ok(ExitCode::from(farm.worst_level))
}

fn run_series(global: &GlobalOpts, ctx: &LogContext, args: &SeriesArgs) -> CmdResult {
    let batches = read_batches(ctx, &args.input.input)?;
    let today = today(global);

    let selected: Vec<&ObservationBatch> = match &args.trap {
        Some(trap) => {
            let found: Vec<_> = batches
                .iter()
                .filter(|b| b.trap_id.as_str() == trap.trim())
                .collect();
            if found.is_empty() {
                return Err(CliError::Args(format!("no trap named {:?} in input", trap)));
            }
            found
        }
        None => batches.iter().collect(),
    };

    let reports: Vec<SeriesReport> = selected
        .into_iter()
        .map(|batch| {
            let rated = compute_rates(&batch.observations);
            let trap_ctx = ctx.for_trap(&batch.trap_id);
            log_event!(
                trap_ctx,
                DEBUG,
                event_names::ENGINE_RATED,
                Stage::Rate,
                "observations rated",
                observations = rated.len()
            );
            let points = match args.last_days {
                Some(n) => expand_last_n_days(&rated, n, today),
                None => expand_to_daily_rates(&rated),
            };
            SeriesReport {
                trap_id: batch.trap_id.clone(),
                points,
            }
        })
        .collect();

    emit(&reports, global.format)?;
    Ok(ExitCode::Safe)
}

fn run_classify(global: &GlobalOpts, ctx: &LogContext, command: &ClassifyCommands) -> CmdResult {
    let assessment = match command {
        ClassifyCommands::Rate { rate } => {
            if !rate.is_finite() || *rate < 0.0 {
                return Err(CliError::Args(format!(
                    "rate must be a finite non-negative number, got {}",
                    rate
                )));
            }
            classify_by_rate(*rate)
        }
        ClassifyCommands::Count {
            count,
            threshold,
            pest,
        } => {
            let threshold = match threshold {
                Some(0) => return Err(CliError::Args("threshold must be positive".to_string())),
                Some(t) => *t,
                None => {
                    let loaded = load(global, ctx)?;
                    let pest = pest.as_deref().map(PestType::new);
                    loaded.config.pest_thresholds.threshold_for(pest.as_ref())
                }
            };
            classify_by_threshold(*count, threshold)
        }
    };

    log_event!(
        ctx,
        INFO,
        event_names::RISK_CLASSIFIED,
        Stage::Assess,
        assessment.message.as_str(),
        level = tracing::field::display(assessment.level)
    );
    emit(&assessment, global.format)?;
    Ok(ExitCode::from(assessment.level))
}

#[derive(Debug, Serialize)]
struct CheckReport {
    valid: bool,
    traps: Vec<CheckedTrap>,
}

#[derive(Debug, Serialize)]
struct CheckedTrap {
    trap_id: TrapId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pest_type: Option<PestType>,
    observations: usize,
    baselines: usize,
    first_date: Option<NaiveDate>,
    last_date: Option<NaiveDate>,
}

impl Render for CheckReport {
    fn markdown(&self) -> String {
        let mut out = String::from("| Trap | Observations | Baselines | First | Last |\n|---|---:|---:|---|---|\n");
        for trap in &self.traps {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                trap.trap_id,
                trap.observations,
                trap.baselines,
                trap.first_date.map(|d| d.to_string()).unwrap_or_default(),
                trap.last_date.map(|d| d.to_string()).unwrap_or_default(),
            ));
        }
        out
    }

    fn summary(&self) -> String {
        let observations: usize = self.traps.iter().map(|t| t.observations).sum();
        format!(
            "ok: {} trap(s), {} observation(s)\n",
            self.traps.len(),
            observations
        )
    }
}

fn run_check(global: &GlobalOpts, ctx: &LogContext, args: &InputArgs) -> CmdResult {
    let batches = read_batches(ctx, &args.input)?;
    let traps = batches
        .iter()
        .map(|b| CheckedTrap {
            trap_id: b.trap_id.clone(),
            pest_type: b.pest_type.clone(),
            observations: b.observations.len(),
            baselines: b.observations.iter().filter(|o| o.is_baseline).count(),
            first_date: b.observations.iter().map(|o| o.date).min(),
            last_date: b.observations.iter().map(|o| o.date).max(),
        })
        .collect();
    emit(&CheckReport { valid: true, traps }, global.format)?;
    Ok(ExitCode::Safe)
}

#[derive(Debug, Serialize)]
struct ConfigReport {
    snapshot: ConfigSnapshot,
    config: MonitorConfig,
}

impl Render for ConfigReport {
    fn markdown(&self) -> String {
        let mut out = format!(
            "Source: {}\n\nWindow: {} day(s)\n\nDefault threshold: {}\n\n| Pest | Threshold |\n|---|---:|\n",
            self.snapshot.config_source,
            self.config.window_days,
            self.config.pest_thresholds.default_threshold
        );
        for (pest, threshold) in &self.config.pest_thresholds.by_pest {
            out.push_str(&format!("| {} | {} |\n", pest, threshold));
        }
        out
    }

    fn summary(&self) -> String {
        format!(
            "{} ({}), window {}d\n",
            self.snapshot.config_source,
            self.snapshot.config_path.as_deref().unwrap_or("no file"),
            self.config.window_days
        )
    }
}

fn run_config_show(global: &GlobalOpts, ctx: &LogContext) -> CmdResult {
    let loaded = load(global, ctx)?;
    let report = ConfigReport {
        snapshot: loaded.snapshot(),
        config: loaded.config,
    };
    emit(&report, global.format)?;
    Ok(ExitCode::Safe)
}

fn run_schema(args: &SchemaArgs) -> CmdResult {
    let value = if args.list {
        let listing: BTreeMap<&str, &str> = available_schemas().into_iter().collect();
        serde_json::to_value(listing).map_err(tw_common::Error::from)?
    } else if args.all {
        serde_json::to_value(generate_all_schemas()).map_err(tw_common::Error::from)?
    } else {
        let Some(name) = args.name.as_deref() else {
            return Err(CliError::Args(
                "pass a type name, --list or --all".to_string(),
            ));
        };
        generate_schema(name)
            .ok_or_else(|| CliError::Args(format!("unknown schema type: {}", name)))?
    };

    let out = serde_json::to_string_pretty(&value).map_err(tw_common::Error::from)?;
    println!("{}", out);
    Ok(ExitCode::Safe)
}

fn run_version(global: &GlobalOpts) -> CmdResult {
    match global.format {
        OutputFormat::Json => {
            let info = serde_json::json!({
                "name": "trapwatch",
                "version": env!("CARGO_PKG_VERSION"),
                "schema_version": SCHEMA_VERSION,
                "config_schema_version": tw_config::CONFIG_SCHEMA_VERSION,
            });
            println!("{}", info);
        }
        _ => println!("trapwatch {}", env!("CARGO_PKG_VERSION")),
    }
    Ok(ExitCode::Safe)
}

//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_bar_adapter::CsvBarAdapter;
use crate::adapters::csv_sink_adapter::CsvSinkAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::validate_pipeline_config;
use crate::domain::error::TrendcastError;
use crate::domain::events::{Combine, EntryPolicy, EventKind};
use crate::domain::pipeline::{parse_tickers, run_batch, PipelineConfig};
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "trendcast", about = "Daily-bar trend classifier and signal scanner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the pipeline over the configured tickers
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Override the configured ticker list
        #[arg(long)]
        tickers: Option<String>,
        /// Directory for signals.csv, metrics.csv and trades.csv
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the per-ticker digest without writing records
    Digest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        tickers: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            tickers,
            output,
        } => run_pipeline(&config, tickers.as_deref(), output.as_ref()),
        Command::Validate { config } => run_validate(&config),
        Command::Digest { config, tickers } => run_digest(&config, tickers.as_deref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    match validate_pipeline_config(&adapter) {
        Ok(()) => {
            eprintln!("{} is valid", config_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_pipeline(
    config_path: &PathBuf,
    ticker_override: Option<&str>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_pipeline_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 2: Build pipeline config and resolve tickers
    let config = match build_pipeline_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let tickers = match resolve_tickers(ticker_override, &adapter) {
        Ok(t) => t,
        Err(code) => return code,
    };

    // Stage 3: Resolve data source and record sink
    let data_dir = match adapter.get_string("data", "dir") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let err = TrendcastError::ConfigMissing {
                section: "data".into(),
                key: "dir".into(),
            };
            eprintln!("error: {err}");
            return (&err).into();
        }
    };
    let source = CsvBarAdapter::new(data_dir);

    let output_dir = output_path.cloned().unwrap_or_else(|| {
        adapter
            .get_string("data", "output_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("output"))
    });
    let mut sink = match CsvSinkAdapter::new(output_dir.clone()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 4: Run the batch
    eprintln!(
        "Running {} tickers from {} to {}...",
        tickers.len(),
        config.start_date,
        config.end_date
    );
    let batch = run_batch(&source, &tickers, &config);

    // Stage 5: Emit records and print digests
    let mut first_failure: Option<ExitCode> = None;
    for report in batch.successes() {
        if let Err(e) = report.emit(&mut sink) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        println!("{}", report.digest());
    }
    for (ticker, error) in batch.failures() {
        eprintln!("warning: skipping {} ({})", ticker, error);
        if first_failure.is_none() {
            first_failure = Some(error.into());
        }
    }

    let successes = batch.successes().count();
    eprintln!(
        "Done: {} of {} tickers, records in {}",
        successes,
        tickers.len(),
        output_dir.display()
    );

    if successes == 0 {
        first_failure.unwrap_or(ExitCode::from(1))
    } else {
        ExitCode::SUCCESS
    }
}

fn run_digest(config_path: &PathBuf, ticker_override: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_pipeline_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let config = match build_pipeline_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let tickers = match resolve_tickers(ticker_override, &adapter) {
        Ok(t) => t,
        Err(code) => return code,
    };

    let data_dir = match adapter.get_string("data", "dir") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let err = TrendcastError::ConfigMissing {
                section: "data".into(),
                key: "dir".into(),
            };
            eprintln!("error: {err}");
            return (&err).into();
        }
    };
    let source = CsvBarAdapter::new(data_dir);

    let batch = run_batch(&source, &tickers, &config);
    for report in batch.successes() {
        println!("{}", report.digest());
    }
    let mut first_failure: Option<ExitCode> = None;
    for (ticker, error) in batch.failures() {
        eprintln!("warning: skipping {} ({})", ticker, error);
        if first_failure.is_none() {
            first_failure = Some(error.into());
        }
    }

    if batch.successes().count() == 0 {
        first_failure.unwrap_or(ExitCode::from(1))
    } else {
        ExitCode::SUCCESS
    }
}

fn resolve_tickers(
    ticker_override: Option<&str>,
    adapter: &dyn ConfigPort,
) -> Result<Vec<String>, ExitCode> {
    let list = match ticker_override {
        Some(t) => t.to_string(),
        None => match adapter.get_string("pipeline", "tickers") {
            Some(t) => t,
            None => {
                eprintln!("error: no tickers configured");
                return Err(ExitCode::from(2));
            }
        },
    };
    parse_tickers(&list).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(2)
    })
}

pub fn build_pipeline_config(adapter: &dyn ConfigPort) -> Result<PipelineConfig, TrendcastError> {
    let start_date = require_date(adapter, "pipeline", "start_date")?;
    let end_date = require_date(adapter, "pipeline", "end_date")?;

    let mut config = PipelineConfig::new(start_date, end_date);

    config.features.short_window = adapter.get_int("features", "short_window", 20) as usize;
    config.features.long_window = adapter.get_int("features", "long_window", 50) as usize;
    config.features.breakout_window = adapter.get_int("features", "breakout_window", 20) as usize;
    config.features.volume_window = adapter.get_int("features", "volume_window", 20) as usize;
    config.features.momentum_window = adapter.get_int("features", "momentum_window", 5) as usize;
    config.features.volatility_window =
        adapter.get_int("features", "volatility_window", 5) as usize;
    config.features.macd_fast = adapter.get_int("features", "macd_fast", 12) as usize;
    config.features.macd_slow = adapter.get_int("features", "macd_slow", 26) as usize;
    config.features.macd_signal = adapter.get_int("features", "macd_signal", 9) as usize;

    config.events.spike_multiplier = adapter.get_double("events", "spike_multiplier", 2.0);
    config.events.strong_trend_threshold =
        adapter.get_double("events", "strong_trend_threshold", 0.02);
    config.events.entry = build_entry_policy(adapter)?;

    config.model.train_fraction = adapter.get_double("model", "train_fraction", 0.8);
    config.model.min_training_rows = adapter.get_int("model", "min_training_rows", 30) as usize;
    config.model.grid_search = adapter.get_bool("model", "grid_search", false);
    config.model.forest.n_trees = adapter.get_int("model", "n_trees", 200) as usize;
    config.model.forest.max_depth = adapter.get_int("model", "max_depth", 6) as usize;
    config.model.forest.min_samples_leaf =
        adapter.get_int("model", "min_samples_leaf", 1) as usize;
    config.model.forest.seed = adapter.get_int("model", "seed", 42) as u64;

    config.exit_horizon = adapter.get_int("pipeline", "exit_horizon", 15) as usize;
    config.recent_signals = adapter.get_int("pipeline", "recent_signals", 5) as usize;

    Ok(config)
}

fn build_entry_policy(adapter: &dyn ConfigPort) -> Result<EntryPolicy, TrendcastError> {
    let mut policy = EntryPolicy::default();

    if let Some(combine) = adapter.get_string("events", "entry_combine") {
        policy.combine = match combine.trim().to_lowercase().as_str() {
            "all" => Combine::AllOf,
            "any" => Combine::AnyOf,
            other => {
                return Err(TrendcastError::ConfigInvalid {
                    section: "events".into(),
                    key: "entry_combine".into(),
                    reason: format!("unknown combinator '{}' (expected all or any)", other),
                })
            }
        };
    }

    if let Some(events) = adapter.get_string("events", "entry_events") {
        let mut kinds = Vec::new();
        for token in events.split(',') {
            let name = token.trim();
            if name.is_empty() {
                continue;
            }
            let kind = EventKind::parse(name).ok_or_else(|| TrendcastError::ConfigInvalid {
                section: "events".into(),
                key: "entry_events".into(),
                reason: format!("unknown event '{}'", name),
            })?;
            kinds.push(kind);
        }
        policy.events = kinds;
    }

    Ok(policy)
}

fn require_date(
    adapter: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<NaiveDate, TrendcastError> {
    let raw = adapter
        .get_string(section, key)
        .ok_or_else(|| TrendcastError::ConfigMissing {
            section: section.into(),
            key: key.into(),
        })?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| TrendcastError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: "invalid date format (expected YYYY-MM-DD)".into(),
    })
}

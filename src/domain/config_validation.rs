//! Configuration validation.
//!
//! Validates all config fields before the pipeline runs, so a bad window or
//! fraction fails fast instead of surfacing mid-run.

use crate::domain::error::TrendcastError;
use crate::domain::events::EventKind;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_pipeline_config(config: &dyn ConfigPort) -> Result<(), TrendcastError> {
    validate_dates(config)?;
    validate_tickers(config)?;
    validate_windows(config)?;
    validate_thresholds(config)?;
    validate_model(config)?;
    validate_events(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> TrendcastError {
    TrendcastError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), TrendcastError> {
    let start = parse_date(config.get_string("pipeline", "start_date").as_deref(), "start_date")?;
    let end = parse_date(config.get_string("pipeline", "end_date").as_deref(), "end_date")?;
    if start >= end {
        return Err(invalid(
            "pipeline",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, TrendcastError> {
    match value {
        None => Err(TrendcastError::ConfigMissing {
            section: "pipeline".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
            invalid(
                "pipeline",
                field,
                format!("invalid {field} format, expected YYYY-MM-DD"),
            )
        }),
    }
}

fn validate_tickers(config: &dyn ConfigPort) -> Result<(), TrendcastError> {
    match config.get_string("pipeline", "tickers") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(TrendcastError::ConfigMissing {
            section: "pipeline".to_string(),
            key: "tickers".to_string(),
        }),
    }
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), TrendcastError> {
    let windows = [
        ("short_window", 20),
        ("long_window", 50),
        ("breakout_window", 20),
        ("volume_window", 20),
        ("momentum_window", 5),
        ("volatility_window", 5),
        ("macd_fast", 12),
        ("macd_slow", 26),
        ("macd_signal", 9),
    ];
    for (key, default) in windows {
        if config.get_int("features", key, default) <= 0 {
            return Err(invalid("features", key, format!("{key} must be positive")));
        }
    }

    let short = config.get_int("features", "short_window", 20);
    let long = config.get_int("features", "long_window", 50);
    if short >= long {
        return Err(invalid(
            "features",
            "short_window",
            "short_window must be less than long_window",
        ));
    }

    let fast = config.get_int("features", "macd_fast", 12);
    let slow = config.get_int("features", "macd_slow", 26);
    if fast >= slow {
        return Err(invalid(
            "features",
            "macd_fast",
            "macd_fast must be less than macd_slow",
        ));
    }
    Ok(())
}

fn validate_thresholds(config: &dyn ConfigPort) -> Result<(), TrendcastError> {
    if config.get_double("events", "spike_multiplier", 2.0) <= 0.0 {
        return Err(invalid(
            "events",
            "spike_multiplier",
            "spike_multiplier must be positive",
        ));
    }
    if config.get_double("events", "strong_trend_threshold", 0.02) <= 0.0 {
        return Err(invalid(
            "events",
            "strong_trend_threshold",
            "strong_trend_threshold must be positive",
        ));
    }
    if config.get_int("pipeline", "exit_horizon", 15) <= 0 {
        return Err(invalid(
            "pipeline",
            "exit_horizon",
            "exit_horizon must be positive",
        ));
    }
    Ok(())
}

fn validate_model(config: &dyn ConfigPort) -> Result<(), TrendcastError> {
    let fraction = config.get_double("model", "train_fraction", 0.8);
    if fraction <= 0.0 || fraction >= 1.0 {
        return Err(invalid(
            "model",
            "train_fraction",
            "train_fraction must be strictly between 0 and 1",
        ));
    }
    if config.get_int("model", "min_training_rows", 30) <= 0 {
        return Err(invalid(
            "model",
            "min_training_rows",
            "min_training_rows must be positive",
        ));
    }
    if config.get_int("model", "n_trees", 200) <= 0 {
        return Err(invalid("model", "n_trees", "n_trees must be positive"));
    }
    if config.get_int("model", "max_depth", 6) <= 0 {
        return Err(invalid("model", "max_depth", "max_depth must be positive"));
    }
    Ok(())
}

fn validate_events(config: &dyn ConfigPort) -> Result<(), TrendcastError> {
    if let Some(combine) = config.get_string("events", "entry_combine") {
        let combine = combine.to_lowercase();
        if combine != "all" && combine != "any" {
            return Err(invalid(
                "events",
                "entry_combine",
                "entry_combine must be 'all' or 'any'",
            ));
        }
    }
    if let Some(names) = config.get_string("events", "entry_events") {
        for token in names.split(',') {
            let name = token.trim();
            if name.is_empty() || EventKind::parse(name).is_none() {
                return Err(invalid(
                    "events",
                    "entry_events",
                    format!("unknown event '{name}'"),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn base_config() -> String {
        "[pipeline]\n\
         tickers = AAPL,MSFT\n\
         start_date = 2023-01-01\n\
         end_date = 2024-01-01\n"
            .to_string()
    }

    #[test]
    fn minimal_valid_config() {
        let adapter = FileConfigAdapter::from_string(&base_config()).unwrap();
        assert!(validate_pipeline_config(&adapter).is_ok());
    }

    #[test]
    fn missing_tickers() {
        let content = "[pipeline]\nstart_date = 2023-01-01\nend_date = 2024-01-01\n";
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        match validate_pipeline_config(&adapter) {
            Err(TrendcastError::ConfigMissing { key, .. }) => assert_eq!(key, "tickers"),
            other => panic!("expected ConfigMissing, got {other:?}"),
        }
    }

    #[test]
    fn start_date_after_end_date() {
        let content = "[pipeline]\n\
                       tickers = AAPL\n\
                       start_date = 2024-06-01\n\
                       end_date = 2024-01-01\n";
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert!(validate_pipeline_config(&adapter).is_err());
    }

    #[test]
    fn bad_date_format() {
        let content = "[pipeline]\n\
                       tickers = AAPL\n\
                       start_date = 01/01/2023\n\
                       end_date = 2024-01-01\n";
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert!(validate_pipeline_config(&adapter).is_err());
    }

    #[test]
    fn short_window_must_be_below_long() {
        let content = base_config() + "[features]\nshort_window = 50\nlong_window = 20\n";
        let adapter = FileConfigAdapter::from_string(&content).unwrap();
        match validate_pipeline_config(&adapter) {
            Err(TrendcastError::ConfigInvalid { key, .. }) => assert_eq!(key, "short_window"),
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }

    #[test]
    fn train_fraction_bounds() {
        for bad in ["0", "1", "1.5"] {
            let content = base_config() + &format!("[model]\ntrain_fraction = {bad}\n");
            let adapter = FileConfigAdapter::from_string(&content).unwrap();
            assert!(
                validate_pipeline_config(&adapter).is_err(),
                "train_fraction = {bad} should be rejected"
            );
        }
    }

    #[test]
    fn unknown_entry_event_rejected() {
        let content = base_config() + "[events]\nentry_events = ma_crossover,rsi_oversold\n";
        let adapter = FileConfigAdapter::from_string(&content).unwrap();
        assert!(validate_pipeline_config(&adapter).is_err());
    }

    #[test]
    fn entry_combine_values() {
        for (value, ok) in [("all", true), ("any", true), ("sometimes", false)] {
            let content = base_config() + &format!("[events]\nentry_combine = {value}\n");
            let adapter = FileConfigAdapter::from_string(&content).unwrap();
            assert_eq!(validate_pipeline_config(&adapter).is_ok(), ok);
        }
    }
}

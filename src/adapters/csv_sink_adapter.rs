//! CSV record sink.
//!
//! Writes `signals.csv`, `metrics.csv` and `trades.csv` into an output
//! directory, appending a row per record. Headers come from the serde field
//! names on each record struct. Writers are opened lazily so a run that
//! produces no trades leaves no empty trades file behind.

use crate::domain::error::TrendcastError;
use crate::domain::report::{MetricsRecord, SignalRecord, TradeRecord};
use crate::ports::sink_port::RecordSink;
use serde::Serialize;
use std::fs::{self, File};
use std::path::PathBuf;

pub struct CsvSinkAdapter {
    output_dir: PathBuf,
    signals: Option<csv::Writer<File>>,
    metrics: Option<csv::Writer<File>>,
    trades: Option<csv::Writer<File>>,
}

impl CsvSinkAdapter {
    pub fn new(output_dir: PathBuf) -> Result<Self, TrendcastError> {
        fs::create_dir_all(&output_dir)?;
        Ok(Self {
            output_dir,
            signals: None,
            metrics: None,
            trades: None,
        })
    }

    fn open_writer(&self, name: &str) -> Result<csv::Writer<File>, TrendcastError> {
        let path = self.output_dir.join(name);
        let file = File::create(&path)?;
        Ok(csv::Writer::from_writer(file))
    }

    fn serialize<T: Serialize>(
        writer: &mut csv::Writer<File>,
        record: &T,
    ) -> Result<(), TrendcastError> {
        writer.serialize(record).map_err(|e| TrendcastError::Sink {
            reason: format!("CSV write error: {}", e),
        })?;
        writer.flush()?;
        Ok(())
    }
}

impl RecordSink for CsvSinkAdapter {
    fn write_signal(&mut self, record: &SignalRecord) -> Result<(), TrendcastError> {
        if self.signals.is_none() {
            self.signals = Some(self.open_writer("signals.csv")?);
        }
        let writer = self.signals.as_mut().ok_or_else(|| TrendcastError::Sink {
            reason: "signals writer unavailable".into(),
        })?;
        Self::serialize(writer, record)
    }

    fn write_metrics(&mut self, record: &MetricsRecord) -> Result<(), TrendcastError> {
        if self.metrics.is_none() {
            self.metrics = Some(self.open_writer("metrics.csv")?);
        }
        let writer = self.metrics.as_mut().ok_or_else(|| TrendcastError::Sink {
            reason: "metrics writer unavailable".into(),
        })?;
        Self::serialize(writer, record)
    }

    fn write_trade(&mut self, record: &TradeRecord) -> Result<(), TrendcastError> {
        if self.trades.is_none() {
            self.trades = Some(self.open_writer("trades.csv")?);
        }
        let writer = self.trades.as_mut().ok_or_else(|| TrendcastError::Sink {
            reason: "trades writer unavailable".into(),
        })?;
        Self::serialize(writer, record)
    }
}

//! Result sink port trait.

use crate::domain::error::TrendcastError;
use crate::domain::report::{MetricsRecord, SignalRecord, TradeRecord};

/// Accepts the three structured record kinds the pipeline produces. The core
/// hands over plain records; where they end up (CSV files, a spreadsheet, a
/// test buffer) is the implementation's business.
pub trait RecordSink {
    fn write_signal(&mut self, record: &SignalRecord) -> Result<(), TrendcastError>;
    fn write_metrics(&mut self, record: &MetricsRecord) -> Result<(), TrendcastError>;
    fn write_trade(&mut self, record: &TradeRecord) -> Result<(), TrendcastError>;
}

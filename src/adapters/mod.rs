//! Concrete implementations of the boundary ports.

pub mod csv_bar_adapter;
pub mod csv_sink_adapter;
pub mod file_config_adapter;

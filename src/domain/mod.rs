//! Core domain types and logic.

pub mod bar;
pub mod indicator;
pub mod features;
pub mod events;
pub mod label;
pub mod model;
pub mod backtest;
pub mod report;
pub mod pipeline;
pub mod config_validation;
pub mod error;

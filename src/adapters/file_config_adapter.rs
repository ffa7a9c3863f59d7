//! INI file configuration adapter.
//!
//! Typed getters parse the raw string themselves: a missing, empty or
//! malformed value falls back to the caller's default instead of aborting
//! the run. Pre-flight validation (`config_validation`) is where malformed
//! values are turned into hard errors.

use crate::domain::error::TrendcastError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TrendcastError> {
        let mut config = Ini::new();
        config
            .load(path.as_ref())
            .map_err(|reason| TrendcastError::ConfigParse {
                file: path.as_ref().display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    /// Raw value with surrounding whitespace stripped; empty counts as unset.
    fn raw(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.raw(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.raw(section, key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.raw(section, key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.raw(section, key)
            .and_then(|v| match v.to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(true),
                "false" | "no" | "off" | "0" => Some(false),
                _ => None,
            })
            .unwrap_or(default)
    }
}

//! Logging setup.
//!
//! `log` macros are routed through a `fern` dispatch into two sinks: a bounded
//! in-memory buffer kept for diagnostics, and a log file in the data directory
//! when file logging is enabled.

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use log::LevelFilter;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::config::{Config, LoggingConfig};
use crate::constants::{LOG_FILE_NAME, MAX_MEMORY_LOG_ENTRIES};

/// Shared logger that can be used across the application
#[derive(Clone)]
pub struct Logger {
    logs: Arc<Mutex<VecDeque<String>>>,
    file_path: Option<PathBuf>,
}

impl Logger {
    /// Memory-only logger
    pub fn new() -> Self {
        Self {
            logs: Arc::new(Mutex::new(VecDeque::new())),
            file_path: None,
        }
    }

    /// Logger that also writes to `path`
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: Some(path.into()),
            ..Self::new()
        }
    }

    /// Logger for the given settings; file output goes to the data directory
    pub fn from_config(config: &LoggingConfig) -> Result<Self> {
        if config.enabled {
            Ok(Self::with_file(Self::get_log_file_path()?))
        } else {
            Ok(Self::new())
        }
    }

    /// Add a log entry
    pub fn log(&self, message: String) {
        let timestamp = Utc::now().format("%H:%M:%S%.3f").to_string();
        let formatted_message = format!("[{}] {}", timestamp, message);

        if let Ok(mut logs) = self.logs.lock() {
            if logs.len() == MAX_MEMORY_LOG_ENTRIES {
                logs.pop_front();
            }
            logs.push_back(formatted_message);
        }
    }

    /// Get all logs sorted by date (newest first)
    pub fn get_logs(&self) -> Vec<String> {
        if let Ok(logs) = self.logs.lock() {
            logs.iter().rev().cloned().collect()
        } else {
            Vec::new()
        }
    }

    /// Clear all logs
    pub fn clear(&self) {
        if let Ok(mut logs) = self.logs.lock() {
            logs.clear();
        }
    }

    /// Whether records are also written to a file
    pub fn is_file_enabled(&self) -> bool {
        self.file_path.is_some()
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Default log file location
    pub fn get_log_file_path() -> Result<PathBuf> {
        Ok(Config::get_data_dir()?.join(LOG_FILE_NAME))
    }

    /// Build the `fern` dispatch feeding this logger and, if set, its file.
    pub fn dispatch(&self, level: LevelFilter) -> Result<fern::Dispatch> {
        let memory = self.clone();
        let mut dispatch = fern::Dispatch::new()
            .level(level)
            // Connection pool and HTTP internals are noisy below warn.
            .level_for("sqlx", LevelFilter::Warn)
            .level_for("sea_orm", LevelFilter::Warn)
            .level_for("hyper", LevelFilter::Warn)
            .level_for("hyper_util", LevelFilter::Warn)
            .level_for("reqwest", LevelFilter::Warn)
            .chain(fern::Output::call(move |record| {
                memory.log(format!("{:<5} {}", record.level(), record.args()));
            }));

        if let Some(path) = &self.file_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
            }
            let file = fern::log_file(path).with_context(|| format!("Failed to open log file: {}", path.display()))?;
            dispatch = dispatch.chain(
                fern::Dispatch::new()
                    .format(|out, message, record| {
                        out.finish(format_args!(
                            "{} {:<5} [{}] {}",
                            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                            record.level(),
                            record.target(),
                            message
                        ))
                    })
                    .chain(file),
            );
        }

        Ok(dispatch)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Install the global logger for the given settings and return its memory handle
pub fn setup_logger(config: &LoggingConfig) -> Result<Logger> {
    let logger = Logger::from_config(config)?;
    logger
        .dispatch(config.level_filter())?
        .apply()
        .context("Logger was already initialized")?;
    Ok(logger)
}

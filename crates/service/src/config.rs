//! # Service Configuration
//!
//! Loads the availability service settings from environment variables,
//! falling back to the company's standard booking rules.
//!
//! ## Environment Variables
//!
//! - `LOG_LEVEL`: logging level (default: "info")
//! - `FIELDBOOK_SNAPSHOT`: path to a JSON data snapshot (optional)
//! - `FIELDBOOK_TECHNICIAN_CLOSE`: latest end of a technician booking (default: "17:00")
//! - `FIELDBOOK_POOLED_CLOSE`: latest end of an any-technician booking (default: "18:00")
//! - `FIELDBOOK_PRIOR_DAY_CUTOFF`: prior-day cutoff for morning slots (default: "17:00")
//! - `FIELDBOOK_SAME_DAY_CUTOFF`: same-day cutoff for later slots (default: "09:00")
//! - `FIELDBOOK_CACHE_ENABLED`: cache templates and service specs (default: true)

use std::{env, path::PathBuf};

use chrono::NaiveTime;
use eyre::{eyre, Result, WrapErr};
use fieldbook_core::BookingPolicy;
use tracing::Level;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Log level for the application
    pub log_level: Level,

    /// Snapshot to load into the in-memory store
    pub snapshot_path: Option<PathBuf>,

    /// Booking rules handed to the engine
    pub policy: BookingPolicy,

    /// Whether weekly templates and service specs are cached between queries
    pub cache_enabled: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            snapshot_path: None,
            policy: BookingPolicy::default(),
            cache_enabled: true,
        }
    }
}

impl ServiceConfig {
    /// Creates a new ServiceConfig from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a clock time or boolean variable is present but
    /// cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = BookingPolicy::default();

        let log_level = match lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()).as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        let snapshot_path = lookup("FIELDBOOK_SNAPSHOT").map(PathBuf::from);

        let clock = |key: &str, default: NaiveTime| -> Result<NaiveTime> {
            match lookup(key) {
                Some(value) => NaiveTime::parse_from_str(value.trim(), "%H:%M")
                    .wrap_err_with(|| format!("Invalid {} value: {}", key, value)),
                None => Ok(default),
            }
        };

        let policy = BookingPolicy {
            technician_close: clock("FIELDBOOK_TECHNICIAN_CLOSE", defaults.technician_close)?,
            pooled_close: clock("FIELDBOOK_POOLED_CLOSE", defaults.pooled_close)?,
            prior_day_cutoff: clock("FIELDBOOK_PRIOR_DAY_CUTOFF", defaults.prior_day_cutoff)?,
            same_day_cutoff: clock("FIELDBOOK_SAME_DAY_CUTOFF", defaults.same_day_cutoff)?,
            same_day_from: defaults.same_day_from,
        };

        let cache_enabled = match lookup("FIELDBOOK_CACHE_ENABLED") {
            Some(value) => match value.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => return Err(eyre!("Invalid FIELDBOOK_CACHE_ENABLED value: {}", other)),
            },
            None => true,
        };

        Ok(Self {
            log_level,
            snapshot_path,
            policy,
            cache_enabled,
        })
    }
}

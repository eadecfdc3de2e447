use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_BATCH_SIZE: u64 = 20;
pub const DEFAULT_BATCH_DELAY_MS: u64 = 500;
pub const DEFAULT_ALERT_FAILURE_THRESHOLD: i32 = 3;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Credentials and endpoint of the HTTP mail API used for alert emails.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from_address: String,
}

/// Tuning knobs of a single monitoring pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleSettings {
    pub probe_timeout: Duration,
    pub batch_size: u64,
    pub batch_delay: Duration,
    pub alert_failure_threshold: i32,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: Duration::from_millis(DEFAULT_BATCH_DELAY_MS),
            alert_failure_threshold: DEFAULT_ALERT_FAILURE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckerConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub mail: MailConfig,
    pub cycle: CycleSettings,
    /// When set, cycles repeat on this interval instead of running once.
    pub check_interval: Option<Duration>,
    pub log_dir: String,
}

impl CheckerConfig {
    /// Reads the configuration from the process environment, loading `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| -> Result<String, ConfigError> {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let mail = MailConfig {
            api_url: required("MAIL_API_URL")?,
            api_key: required("MAIL_API_KEY")?,
            from_address: required("MAIL_FROM")?,
        };

        let batch_size: u64 = parse_or(&lookup, "CHECK_BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        if batch_size == 0 {
            return Err(ConfigError::Invalid {
                var: "CHECK_BATCH_SIZE",
                value: batch_size.to_string(),
            });
        }

        let alert_failure_threshold: i32 = parse_or(
            &lookup,
            "ALERT_FAILURE_THRESHOLD",
            DEFAULT_ALERT_FAILURE_THRESHOLD,
        )?;
        if alert_failure_threshold <= 0 {
            return Err(ConfigError::Invalid {
                var: "ALERT_FAILURE_THRESHOLD",
                value: alert_failure_threshold.to_string(),
            });
        }

        let probe_timeout_ms: u64 =
            parse_or(&lookup, "PROBE_TIMEOUT_MS", DEFAULT_PROBE_TIMEOUT_MS)?;
        if probe_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                var: "PROBE_TIMEOUT_MS",
                value: probe_timeout_ms.to_string(),
            });
        }

        let cycle = CycleSettings {
            probe_timeout: Duration::from_millis(probe_timeout_ms),
            batch_size,
            batch_delay: Duration::from_millis(parse_or(
                &lookup,
                "CHECK_BATCH_DELAY_MS",
                DEFAULT_BATCH_DELAY_MS,
            )?),
            alert_failure_threshold,
        };

        let check_interval = match lookup("CHECK_INTERVAL_SECONDS") {
            Some(raw) if !raw.trim().is_empty() => {
                let secs: u64 = parse_value("CHECK_INTERVAL_SECONDS", &raw)?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        var: "CHECK_INTERVAL_SECONDS",
                        value: raw,
                    });
                }
                Some(Duration::from_secs(secs))
            }
            _ => None,
        };

        Ok(CheckerConfig {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            mail,
            cycle,
            check_interval,
            log_dir: lookup("LOG_DIR")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "logs".to_string()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        Some(raw) if !raw.trim().is_empty() => parse_value(var, &raw),
        _ => Ok(default),
    }
}

fn parse_value<T: FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: raw.to_string(),
    })
}

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use std::env;
use tokio::time::Duration;

use crate::query::DATE_FORMAT;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_ACTORS_WINDOW: &str = "2024-04-08,2024-04-08";
pub const DEFAULT_TYPES_WINDOW: &str = "2024-04-08,2024-05-08";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Inclusive date range used when loading the actor and type catalogs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Parses `yyyy-MM-dd,yyyy-MM-dd`.
    pub fn parse(raw: &str) -> Result<Self> {
        let parts = split_list(raw, ',');
        if parts.len() != 2 {
            return Err(anyhow!(
                "Expected two comma-separated dates, got '{}'",
                raw
            ));
        }
        let start = NaiveDate::parse_from_str(&parts[0], DATE_FORMAT)
            .with_context(|| format!("Invalid start date '{}'", parts[0]))?;
        let end = NaiveDate::parse_from_str(&parts[1], DATE_FORMAT)
            .with_context(|| format!("Invalid end date '{}'", parts[1]))?;
        Ok(Self { start, end })
    }

    pub fn start_string(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_string(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    pub timeout: Duration,
    pub actors_window: DateWindow,
    pub types_window: DateWindow,
    pub log_dir: String,
}

impl Config {
    /// Builds the configuration from `NEWS_*` environment variables, loading a
    /// `.env` file first if one is present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let base_url = env_or("NEWS_API_BASE_URL", DEFAULT_BASE_URL);
        let timeout_secs = match env::var("NEWS_API_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout_secs(&raw).context("NEWS_API_TIMEOUT_SECS")?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        let actors_window = DateWindow::parse(&env_or("NEWS_ACTORS_WINDOW", DEFAULT_ACTORS_WINDOW))
            .context("NEWS_ACTORS_WINDOW")?;
        let types_window = DateWindow::parse(&env_or("NEWS_TYPES_WINDOW", DEFAULT_TYPES_WINDOW))
            .context("NEWS_TYPES_WINDOW")?;
        let log_dir = env_or("NEWS_LOG_DIR", DEFAULT_LOG_DIR);

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs),
            actors_window,
            types_window,
            log_dir,
        })
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        self
    }

    pub fn with_timeout(mut self, secs: Option<u64>) -> Self {
        if let Some(secs) = secs {
            self.timeout = Duration::from_secs(secs);
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            actors_window: DateWindow::parse(DEFAULT_ACTORS_WINDOW)
                .expect("default actor window is valid"),
            types_window: DateWindow::parse(DEFAULT_TYPES_WINDOW)
                .expect("default type window is valid"),
            log_dir: DEFAULT_LOG_DIR.to_string(),
        }
    }
}

/// Parses a request timeout in whole seconds. Zero would expire every request
/// immediately and is rejected.
pub fn parse_timeout_secs(raw: &str) -> Result<u64> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("Timeout is not a number: '{}'", raw))?;
    if secs == 0 {
        return Err(anyhow!("Timeout must be at least 1 second"));
    }
    Ok(secs)
}

fn env_or(var: &str, default: &str) -> String {
    env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Splits a delimited value into trimmed, non-empty parts.
pub fn split_list(raw: &str, delimiter: char) -> Vec<String> {
    raw.split(delimiter)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

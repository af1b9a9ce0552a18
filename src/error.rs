use std::time::Duration;

use thiserror::Error;

/// Errors raised while talking to the calendar provider.
///
/// None of these reach the dashboard caller: the fetcher turns them into an
/// empty event list and a degraded status.
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid calendar endpoint: {0}")]
    Endpoint(String),

    #[error("calendar request timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors from the CSV-backed tariff store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("a tariff named '{0}' already exists")]
    DuplicateName(String),

    #[error("corrupt tariff row: {0}")]
    Corrupt(String),

    #[error("tariff store lock poisoned")]
    Poisoned,
}

/// Startup configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("failed to read credentials file {path}: {reason}")]
    Credentials { path: String, reason: String },
}

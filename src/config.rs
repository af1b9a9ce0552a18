use std::env;
use std::time::Duration;

use chrono_tz::Tz;
use dotenv::dotenv;
use tracing::info;

use crate::error::ConfigError;

pub const DEFAULT_CALENDAR_ENDPOINT: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_BUSINESS_NAME: &str = "Effynails";
pub const DEFAULT_EMAIL_LABEL: &str = "Andy";
pub const DEFAULT_TIMEZONE: &str = "Europe/Brussels";
pub const DEFAULT_TARIFF_PATH: &str = "/app/data/tarifs.csv";
/// Longest upcoming horizon accepted, in days.
pub const MAX_HORIZON_DAYS: i64 = 3650;

/// How the service obtains bearer tokens for the calendar API.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialsSource {
    /// A pre-issued access token, mostly for local runs.
    AccessToken(String),
    /// Path to a service-account key file.
    ServiceAccountFile(String),
}

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub calendar_id: String,
    pub credentials: CredentialsSource,
    pub calendar_endpoint: String,
    pub business_name: String,
    /// Substring that marks an event as belonging to the salon.
    pub business_marker: String,
    /// Line that precedes the client's email in booking descriptions.
    pub email_label: String,
    pub timezone: Tz,
    pub tariff_database_path: String,
    pub seed_default_tariffs: bool,
    pub fetch_timeout: Duration,
    pub max_results: u32,
    pub follow_page_tokens: bool,
    pub upcoming_horizon_days: i64,
    pub port: u16,
}

impl Config {
    /// Load configuration from the process environment (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let calendar_id = get("GOOGLE_CALENDAR_ID").ok_or(ConfigError::Missing("GOOGLE_CALENDAR_ID"))?;

        let credentials = match (get("GOOGLE_ACCESS_TOKEN"), get("GOOGLE_CREDENTIALS_PATH")) {
            (Some(token), _) => CredentialsSource::AccessToken(token),
            (None, Some(path)) => CredentialsSource::ServiceAccountFile(path),
            (None, None) => return Err(ConfigError::Missing("GOOGLE_CREDENTIALS_PATH")),
        };

        let business_name = get("BUSINESS_NAME").unwrap_or_else(|| DEFAULT_BUSINESS_NAME.to_string());
        let business_marker = get("BUSINESS_MARKER").unwrap_or_else(|| business_name.clone());

        let timezone_name = get("TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone = timezone_name
            .parse::<Tz>()
            .map_err(|_| ConfigError::Invalid {
                name: "TIMEZONE",
                value: timezone_name.clone(),
            })?;

        let config = Config {
            calendar_id,
            credentials,
            calendar_endpoint: get("GOOGLE_CALENDAR_API_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_CALENDAR_ENDPOINT.to_string()),
            business_name,
            business_marker,
            email_label: get("EMAIL_LABEL").unwrap_or_else(|| DEFAULT_EMAIL_LABEL.to_string()),
            timezone,
            tariff_database_path: get("TARIFF_DATABASE_PATH")
                .unwrap_or_else(|| DEFAULT_TARIFF_PATH.to_string()),
            seed_default_tariffs: parse_flag("SEED_DEFAULT_TARIFFS", get("SEED_DEFAULT_TARIFFS"), true)?,
            fetch_timeout: Duration::from_secs(parse_number("FETCH_TIMEOUT_SECS", get("FETCH_TIMEOUT_SECS"), 10)?),
            max_results: parse_number("MAX_RESULTS", get("MAX_RESULTS"), 2500)?,
            follow_page_tokens: parse_flag("FOLLOW_PAGE_TOKENS", get("FOLLOW_PAGE_TOKENS"), false)?,
            upcoming_horizon_days: parse_horizon(get("UPCOMING_HORIZON_DAYS"))?,
            port: parse_number("PORT", get("PORT"), 3000)?,
        };

        info!(
            "Configuration loaded: calendar={}, marker='{}', timezone={}",
            config.calendar_id, config.business_marker, config.timezone
        );

        Ok(config)
    }
}

fn parse_flag(name: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => match value.to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::Invalid { name, value }),
        },
    }
}

fn parse_number<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

fn parse_horizon(value: Option<String>) -> Result<i64, ConfigError> {
    let days = parse_number("UPCOMING_HORIZON_DAYS", value.clone(), 30)?;
    if (0..=MAX_HORIZON_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(ConfigError::Invalid {
            name: "UPCOMING_HORIZON_DAYS",
            value: value.unwrap_or_default(),
        })
    }
}

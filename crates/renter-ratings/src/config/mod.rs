use std::env;
use std::fmt;
use std::time::Duration;

use crate::workflows::ratings::window::{DayBoundary, RatingWindow, DEFAULT_WINDOW_DAYS};

const DEFAULT_API_URL: &str = "http://localhost:4000";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Distinguishes runtime behavior for different stages of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the dashboard.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub api: ApiConfig,
    pub telemetry: TelemetryConfig,
    pub ratings: RatingPolicyConfig,
    pub sanitizer: SanitizerConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let base_url = env::var("RATINGS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let base_url = validate_base_url(base_url)?;

        let session_cookie = env::var("RATINGS_SESSION_COOKIE")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let timeout_secs = match env::var("RATINGS_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout)?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let window_days = match env::var("RATING_WINDOW_DAYS") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|days| *days >= 0)
                .ok_or(ConfigError::InvalidWindow)?,
            Err(_) => DEFAULT_WINDOW_DAYS,
        };

        let day_boundary = match env::var("RATING_DAY_BOUNDARY") {
            Ok(raw) => DayBoundary::parse(&raw)
                .ok_or(ConfigError::InvalidDayBoundary { value: raw })?,
            Err(_) => DayBoundary::Local,
        };

        let extra_words = env::var("PROFANITY_EXTRA_WORDS")
            .map(|raw| split_word_list(&raw))
            .unwrap_or_default();

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            api: ApiConfig {
                base_url,
                session_cookie,
                timeout: Duration::from_secs(timeout_secs),
            },
            telemetry: TelemetryConfig { log_level },
            ratings: RatingPolicyConfig {
                window_days,
                day_boundary,
            },
            sanitizer: SanitizerConfig { extra_words },
        })
    }

    /// Replaces the backend URL, applying the same validation as `RATINGS_API_URL`.
    pub fn override_api_url(&mut self, raw: impl Into<String>) -> Result<(), ConfigError> {
        self.api.base_url = validate_base_url(raw.into())?;
        Ok(())
    }
}

/// Backend connection settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub session_cookie: Option<String>,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            session_cookie: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Rating window policy knobs.
#[derive(Debug, Clone, Copy)]
pub struct RatingPolicyConfig {
    pub window_days: i64,
    pub day_boundary: DayBoundary,
}

impl RatingPolicyConfig {
    pub fn window(&self) -> RatingWindow {
        RatingWindow::new(self.window_days, self.day_boundary)
    }
}

/// Words added to the built-in comment dictionaries.
#[derive(Debug, Clone, Default)]
pub struct SanitizerConfig {
    pub extra_words: Vec<String>,
}

fn validate_base_url(raw: String) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/').to_string();
    match reqwest::Url::parse(&trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(trimmed),
        _ => Err(ConfigError::InvalidApiUrl { value: raw }),
    }
}

fn split_word_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|word| word.trim().to_lowercase())
        .filter(|word| !word.is_empty())
        .collect()
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidApiUrl { value: String },
    InvalidTimeout,
    InvalidWindow,
    InvalidDayBoundary { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidApiUrl { value } => {
                write!(f, "RATINGS_API_URL must be an http(s) URL, got '{value}'")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "RATINGS_HTTP_TIMEOUT_SECS must be a positive integer")
            }
            ConfigError::InvalidWindow => {
                write!(f, "RATING_WINDOW_DAYS must be a non-negative integer")
            }
            ConfigError::InvalidDayBoundary { value } => {
                write!(f, "RATING_DAY_BOUNDARY must be 'local' or 'utc', got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

//! Weather lookup configuration.
//!
//! # Responsibility
//! - Hold the endpoint and credential used by the weather client.
//! - Load overrides from the environment or a host-supplied JSON blob.
//!
//! # Invariants
//! - Missing fields fall back to defaults.
//! - The api key is never included in `Debug` output.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_WEATHER_BASE_URL: &str = "http://api.weatherapi.com";
pub const WEATHER_API_KEY_ENV: &str = "TODOLIST_WEATHER_API_KEY";
pub const WEATHER_BASE_URL_ENV: &str = "TODOLIST_WEATHER_BASE_URL";

/// Configuration loading/validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidBaseUrl(String),
    Parse(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBaseUrl(url) => {
                write!(f, "weather base_url must start with http:// or https://, got `{url}`")
            }
            Self::Parse(message) => write!(f, "invalid weather config: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Endpoint settings for [`crate::weather::HttpWeatherClient`].
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Scheme and host, without a trailing path.
    pub base_url: String,
    pub api_key: String,
    /// Air-quality flag sent as `aqi`.
    pub aqi: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            api_key: String::new(),
            aqi: "no".to_string(),
        }
    }
}

impl std::fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("aqi", &self.aqi)
            .finish()
    }
}

impl WeatherConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Builds a config from defaults plus environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Parses a host-supplied JSON object; absent keys use defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(key) = lookup(WEATHER_API_KEY_ENV) {
            config.api_key = key.trim().to_string();
        }
        if let Some(url) = lookup(WEATHER_BASE_URL_ENV).filter(|url| !url.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        Ok(())
    }

    /// Full URL of the current-conditions endpoint.
    pub fn current_conditions_url(&self) -> String {
        format!("{}/v1/current.json", self.base_url.trim().trim_end_matches('/'))
    }
}

use std::env;
use std::time::Duration;

use crate::{Error, Result};

pub const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org/v2";
pub const DEFAULT_WEATHER_API_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8888";

#[derive(Debug, Clone)]
pub struct Config {
    pub news_api_key: Option<String>,
    pub weather_api_key: Option<String>,
    pub news_api_url: String,
    pub weather_api_url: String,
    pub upstream_timeout: Duration,
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            news_api_key: None,
            weather_api_key: None,
            news_api_url: DEFAULT_NEWS_API_URL.to_string(),
            weather_api_url: DEFAULT_WEATHER_API_URL.to_string(),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl Config {
    /// Reads the process environment. Credentials are optional here and
    /// checked per request.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            news_api_key: non_empty_var("NEWSAPI_ACCESS_KEY"),
            weather_api_key: non_empty_var("OPENWEATHER_ACCESS_KEY"),
            news_api_url: non_empty_var("GS_NEWS_API_URL").unwrap_or(defaults.news_api_url),
            weather_api_url: non_empty_var("GS_WEATHER_API_URL").unwrap_or(defaults.weather_api_url),
            upstream_timeout: non_empty_var("GS_UPSTREAM_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.upstream_timeout),
            bind_addr: non_empty_var("GS_BIND_ADDR").unwrap_or(defaults.bind_addr),
        }
    }

    pub fn require_news_api_key(&self) -> Result<&str> {
        self.news_api_key
            .as_deref()
            .ok_or(Error::MissingCredential("NEWSAPI_ACCESS_KEY"))
    }

    pub fn require_weather_api_key(&self) -> Result<&str> {
        self.weather_api_key
            .as_deref()
            .ok_or(Error::MissingCredential("OPENWEATHER_ACCESS_KEY"))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

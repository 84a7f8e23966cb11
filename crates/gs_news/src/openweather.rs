use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use gs_core::{Config, Result, WeatherProvider};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::http::{build_client, read_json, redact};

/// OpenWeather current-conditions client.
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
}

impl OpenWeatherClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.weather_api_url.clone(), config.upstream_timeout)
    }
}

impl fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current_weather(&self, api_key: &str, city: &str) -> Result<Value> {
        debug!("🌤️ Requesting weather for {}", city);
        let response = self
            .client
            .get(format!("{}/weather", self.base_url))
            .query(&[
                ("q", city),
                ("appid", api_key),
                ("units", "metric"),
                ("lang", "pt_br"),
            ])
            .send()
            .await
            .map_err(redact)?;
        read_json(response).await
    }
}

/// Short phrase describing a temperature in °C.
pub fn temperature_message(celsius: f64) -> &'static str {
    match celsius {
        t if t <= -5.0 => "Bitterly cold outside",
        t if t <= 5.0 => "Very cold today",
        t if t <= 12.0 => "Pleasantly cool day",
        t if t <= 20.0 => "Mild and comfortable",
        t if t <= 28.0 => "Nice warm day",
        t if t <= 35.0 => "Hot day, keep cool",
        _ => "Scorching heat, extreme temps",
    }
}

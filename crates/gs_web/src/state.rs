use std::sync::Arc;

use gs_core::Config;
use gs_news::{NewsApiClient, NewsGateway, OpenWeatherClient, WeatherGateway};

pub struct AppState {
    pub news: NewsGateway,
    pub weather: WeatherGateway,
}

impl AppState {
    pub fn new(news: NewsGateway, weather: WeatherGateway) -> Self {
        Self { news, weather }
    }

    /// Wires the public NewsAPI and OpenWeather clients from configuration.
    pub fn from_config(config: &Config) -> gs_core::Result<Self> {
        let news = NewsGateway::from_config(Arc::new(NewsApiClient::from_config(config)?), config);
        let weather = WeatherGateway::from_config(Arc::new(OpenWeatherClient::from_config(config)?), config);
        Ok(Self::new(news, weather))
    }
}

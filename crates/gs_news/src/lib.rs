pub mod gateway;
mod http;
pub mod newsapi;
pub mod openweather;

pub use gateway::{NewsGateway, NewsRequest, WeatherGateway, DEFAULT_CITY};
pub use newsapi::NewsApiClient;
pub use openweather::{temperature_message, OpenWeatherClient};

pub mod prelude {
    pub use super::{NewsApiClient, NewsGateway, NewsRequest, OpenWeatherClient, WeatherGateway};
    pub use gs_core::{Article, Error, Result};
}

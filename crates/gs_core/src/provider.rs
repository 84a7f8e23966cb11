use async_trait::async_trait;
use serde_json::Value;

use crate::types::Batch;
use crate::Result;

/// Query sent to the upstream news provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlinesQuery {
    pub api_key: String,
    pub country: String,
    pub page: u32,
    pub page_size: u32,
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Fetch one page of top headlines, returning the provider's JSON body.
    async fn top_headlines(&self, query: &HeadlinesQuery) -> Result<Value>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch current conditions for a city, returning the provider's JSON body.
    async fn current_weather(&self, api_key: &str, city: &str) -> Result<Value>;
}

/// Where the feed navigator gets new batches from.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_batch(&self, exclude: &[String], page: u32) -> Result<Batch>;
}

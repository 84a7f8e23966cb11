use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use gs_core::{Config, HeadlinesQuery, NewsProvider, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::http::{build_client, read_json, redact};

/// NewsAPI `top-headlines` client.
pub struct NewsApiClient {
    client: Client,
    base_url: String,
}

impl NewsApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.news_api_url.clone(), config.upstream_timeout)
    }
}

impl fmt::Debug for NewsApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiClient")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    async fn top_headlines(&self, query: &HeadlinesQuery) -> Result<Value> {
        debug!("📡 Requesting top headlines page {} (size {})", query.page, query.page_size);
        let response = self
            .client
            .get(format!("{}/top-headlines", self.base_url))
            .query(&[
                ("country", query.country.clone()),
                ("pageSize", query.page_size.to_string()),
                ("page", query.page.to_string()),
                ("apiKey", query.api_key.clone()),
            ])
            .send()
            .await
            .map_err(redact)?;
        read_json(response).await
    }
}

use std::time::Duration;

use async_trait::async_trait;
use gs_core::{Article, Batch, Error, NewsSource, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Talks to a running news gateway over HTTP.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    endpoint: Url,
}

impl GatewayClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| Error::External(e.into()))?;
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl NewsSource for GatewayClient {
    async fn fetch_batch(&self, exclude: &[String], page: u32) -> Result<Batch> {
        let mut params = Vec::new();
        if !exclude.is_empty() {
            params.push(("exclude", serde_json::to_string(exclude)?));
        }
        if page > 1 {
            params.push(("page", page.to_string()));
        }

        debug!("🔄 GET {} page {} ({} excluded)", self.endpoint, page, exclude.len());
        let response = self.client.get(self.endpoint.clone()).query(&params).send().await?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            return Err(Error::Upstream {
                status: Some(status.as_u16()),
                details: body,
            });
        }

        Ok(body
            .get("articles")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(Article::from_raw).collect())
            .unwrap_or_default())
    }
}

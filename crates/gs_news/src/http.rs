use std::time::Duration;

use gs_core::{Error, Result};
use reqwest::{Client, Response};
use serde_json::Value;

pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Drops the request URL from transport errors; provider URLs carry the
/// API key in their query string.
pub(crate) fn redact(e: reqwest::Error) -> Error {
    Error::Http(e.without_url())
}

/// Decodes a provider response, turning non-2xx statuses into
/// [`Error::Upstream`] carrying the provider's payload.
pub(crate) async fn read_json(response: Response) -> Result<Value> {
    let status = response.status();
    if status.is_success() {
        return response.json::<Value>().await.map_err(redact);
    }

    let body = response.text().await.unwrap_or_default();
    let details = serde_json::from_str(&body).unwrap_or(Value::String(body));
    Err(Error::Upstream {
        status: Some(status.as_u16()),
        details,
    })
}

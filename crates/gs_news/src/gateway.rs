use std::sync::Arc;

use async_trait::async_trait;
use gs_core::{
    filter_articles, leading_int, Batch, Config, Error, ExcludeSet, HeadlinesQuery, NewsProvider,
    NewsSource, Result, WeatherProvider,
};
use serde_json::Value;
use tracing::{info, warn};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 30;
pub const DEFAULT_COUNTRY: &str = "us";
pub const DEFAULT_CITY: &str = "Oakland";

/// A client's request for one filtered page of headlines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsRequest {
    pub exclude: Vec<String>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for NewsRequest {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl NewsRequest {
    /// Builds a request from raw query values. Anything unparseable falls
    /// back to its default; a malformed `exclude` is read as a
    /// comma-separated list.
    pub fn from_query(exclude: Option<&str>, page: Option<&str>, page_size: Option<&str>) -> Self {
        Self {
            exclude: exclude
                .filter(|raw| !raw.is_empty())
                .map(gs_core::filter::parse_exclude_list)
                .unwrap_or_default(),
            page: positive(page).unwrap_or(DEFAULT_PAGE),
            page_size: positive(page_size).unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

fn positive(raw: Option<&str>) -> Option<u32> {
    u32::try_from(leading_int(raw?)?).ok().filter(|n| *n > 0)
}

/// Server-side bridge between clients and the news provider.
#[derive(Clone)]
pub struct NewsGateway {
    provider: Arc<dyn NewsProvider>,
    api_key: Option<String>,
}

impl NewsGateway {
    pub fn new(provider: Arc<dyn NewsProvider>, api_key: Option<String>) -> Self {
        Self { provider, api_key }
    }

    pub fn from_config(provider: Arc<dyn NewsProvider>, config: &Config) -> Self {
        Self::new(provider, config.news_api_key.clone())
    }

    /// Fetches one upstream page and filters it. A missing credential fails
    /// before any upstream call; upstream failures are returned as is.
    pub async fn fetch(&self, request: &NewsRequest) -> Result<Batch> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(Error::MissingCredential("NEWSAPI_ACCESS_KEY"))?;

        let query = HeadlinesQuery {
            api_key: api_key.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            page: request.page,
            page_size: request.page_size,
        };

        let data = self.provider.top_headlines(&query).await.map_err(|e| {
            warn!("❌ News provider failed on page {}: {}", request.page, e);
            e
        })?;

        let raw = data
            .get("articles")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let exclude = ExcludeSet::new(&request.exclude);
        let batch = filter_articles(raw, &exclude);

        info!(
            "📰 Page {}: {} candidates, {} excluded titles, {} served",
            request.page,
            raw.len(),
            exclude.len(),
            batch.len()
        );
        Ok(batch)
    }
}

#[async_trait]
impl NewsSource for NewsGateway {
    async fn fetch_batch(&self, exclude: &[String], page: u32) -> Result<Batch> {
        let request = NewsRequest {
            exclude: exclude.to_vec(),
            page,
            ..NewsRequest::default()
        };
        self.fetch(&request).await
    }
}

/// Passes weather lookups through to the provider unchanged.
#[derive(Clone)]
pub struct WeatherGateway {
    provider: Arc<dyn WeatherProvider>,
    api_key: Option<String>,
}

impl WeatherGateway {
    pub fn new(provider: Arc<dyn WeatherProvider>, api_key: Option<String>) -> Self {
        Self { provider, api_key }
    }

    pub fn from_config(provider: Arc<dyn WeatherProvider>, config: &Config) -> Self {
        Self::new(provider, config.weather_api_key.clone())
    }

    pub async fn fetch(&self, city: Option<&str>) -> Result<Value> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(Error::MissingCredential("OPENWEATHER_ACCESS_KEY"))?;
        let city = city.map(str::trim).filter(|c| !c.is_empty()).unwrap_or(DEFAULT_CITY);

        self.provider.current_weather(api_key, city).await.map_err(|e| {
            warn!("❌ Weather provider failed for {}: {}", city, e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeNews {
        responses: Mutex<VecDeque<Result<Value>>>,
        queries: Mutex<Vec<HeadlinesQuery>>,
    }

    impl FakeNews {
        fn replying(response: Result<Value>) -> Arc<Self> {
            let fake = Self::default();
            fake.responses.lock().unwrap().push_back(response);
            Arc::new(fake)
        }

        fn queries(&self) -> Vec<HeadlinesQuery> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NewsProvider for FakeNews {
        async fn top_headlines(&self, query: &HeadlinesQuery) -> Result<Value> {
            self.queries.lock().unwrap().push(query.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(json!({ "articles": [] })))
        }
    }

    fn item(title: &str) -> Value {
        json!({
            "source": { "name": "Wire" },
            "title": title,
            "description": "desc ok",
            "content": format!("{} body text long enough [+120 chars]", title),
        })
    }

    #[test]
    fn request_defaults_and_parsing() {
        assert_eq!(NewsRequest::from_query(None, None, None), NewsRequest::default());

        let request = NewsRequest::from_query(Some(r#"["T2","t3"]"#), Some("2"), Some("50"));
        assert_eq!(request.exclude, vec!["T2", "t3"]);
        assert_eq!(request.page, 2);
        assert_eq!(request.page_size, 50);

        let request = NewsRequest::from_query(Some("T2, t3"), Some("0"), Some("-4"));
        assert_eq!(request.exclude, vec!["T2", "t3"]);
        assert_eq!(request.page, DEFAULT_PAGE);
        assert_eq!(request.page_size, DEFAULT_PAGE_SIZE);

        assert_eq!(NewsRequest::from_query(None, Some("abc"), None).page, DEFAULT_PAGE);
    }

    #[test]
    fn paging_reads_leading_digits() {
        let request = NewsRequest::from_query(None, Some("2abc"), Some(" 10 items"));
        assert_eq!(request.page, 2);
        assert_eq!(request.page_size, 10);
    }

    #[tokio::test]
    async fn missing_key_skips_upstream() {
        let fake = FakeNews::replying(Ok(json!({ "articles": [item("A")] })));
        let gateway = NewsGateway::new(fake.clone(), None);

        let err = gateway.fetch(&NewsRequest::default()).await.unwrap_err();
        assert!(matches!(err, Error::MissingCredential(_)));
        assert_eq!(err.status_code(), 500);
        assert!(fake.queries().is_empty());
    }

    #[tokio::test]
    async fn forwards_pagination_and_filters() {
        let fake = FakeNews::replying(Ok(json!({
            "articles": [item("Keep Me"), item("T2"), item("t2"), item("T3")]
        })));
        let gateway = NewsGateway::new(fake.clone(), Some("test-news-key".into()));

        let request = NewsRequest::from_query(Some(r#"["T2", "t3"]"#), Some("2"), Some("50"));
        let batch = gateway.fetch(&request).await.unwrap();

        let titles: Vec<_> = batch.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Keep Me"]);
        assert!(!batch[0].content.ends_with("chars]"));
        assert_eq!(
            fake.queries(),
            vec![HeadlinesQuery {
                api_key: "test-news-key".into(),
                country: "us".into(),
                page: 2,
                page_size: 50,
            }]
        );
    }

    #[tokio::test]
    async fn missing_articles_array_is_empty() {
        let fake = FakeNews::replying(Ok(json!({ "status": "ok" })));
        let gateway = NewsGateway::new(fake, Some("key".into()));
        assert!(gateway.fetch(&NewsRequest::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upstream_errors_propagate_unretried() {
        let fake = FakeNews::replying(Err(Error::Upstream {
            status: Some(400),
            details: json!({ "code": "parametersMissing" }),
        }));
        let gateway = NewsGateway::new(fake.clone(), Some("key".into()));

        let err = gateway.fetch(&NewsRequest::default()).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.details(), json!({ "code": "parametersMissing" }));
        assert_eq!(fake.queries().len(), 1);
    }

    #[tokio::test]
    async fn news_source_uses_default_page_size() {
        let fake = FakeNews::replying(Ok(json!({ "articles": [item("Seen"), item("Fresh")] })));
        let gateway = NewsGateway::new(fake.clone(), Some("key".into()));

        let batch = gateway.fetch_batch(&["seen".to_string()], 3).await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].title, "Fresh");
        assert_eq!(fake.queries()[0].page, 3);
        assert_eq!(fake.queries()[0].page_size, DEFAULT_PAGE_SIZE);
    }

    struct FakeWeather(Mutex<Vec<(String, String)>>);

    #[async_trait]
    impl WeatherProvider for FakeWeather {
        async fn current_weather(&self, api_key: &str, city: &str) -> Result<Value> {
            self.0.lock().unwrap().push((api_key.to_string(), city.to_string()));
            Ok(json!({ "name": city, "main": { "temp": 18.4 } }))
        }
    }

    #[tokio::test]
    async fn weather_defaults_city_and_requires_key() {
        let fake = Arc::new(FakeWeather(Mutex::new(Vec::new())));

        let missing = WeatherGateway::new(fake.clone(), None);
        assert!(matches!(
            missing.fetch(Some("Paris")).await,
            Err(Error::MissingCredential("OPENWEATHER_ACCESS_KEY"))
        ));

        let gateway = WeatherGateway::new(fake.clone(), Some("w-key".into()));
        let data = gateway.fetch(Some("  ")).await.unwrap();
        assert_eq!(data["name"], DEFAULT_CITY);
        assert_eq!(
            fake.0.lock().unwrap().clone(),
            vec![("w-key".to_string(), DEFAULT_CITY.to_string())]
        );
    }
}

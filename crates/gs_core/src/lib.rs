pub mod config;
pub mod error;
pub mod filter;
pub mod provider;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use filter::{filter_articles, leading_int, ExcludeSet, MAX_BATCH_SIZE};
pub use provider::{HeadlinesQuery, NewsProvider, NewsSource, WeatherProvider};
pub use types::{normalize_title, Article, Batch};

pub mod prelude {
    pub use crate::{Article, Batch, Error, Result};
}

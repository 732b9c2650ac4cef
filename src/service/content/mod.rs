mod http;
mod schedule;

pub use http::HttpContentFetcher;
pub use schedule::{parse_calendar, render_day};

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("unexpected response: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comic {
    pub num: u32,
    pub title: String,
    pub image_url: String,
}

/// Third-party content the fun commands show. Every call may fail; the caller decides
/// how to tell the chat.
#[async_trait]
pub trait ContentFetcher: Send + Sync + 'static {
    async fn joke(&self) -> Result<String, FetchError>;

    async fn comic(&self) -> Result<Comic, FetchError>;

    /// Today's events of the calendar, already rendered as Markdown.
    async fn schedule(&self, calendar_id: &str) -> Result<String, FetchError>;
}

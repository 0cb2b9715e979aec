//! Page fetching

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("not an HTML page: {0}")]
    NotHtml(String),
}

/// A fetched HTML document
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects; relative links resolve against it
    pub url: Url,
    pub body: String,
}

/// Source of raw pages for the crawler
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// `PageFetcher` over HTTP
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // A missing content type is treated as HTML
        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_html(content_type) {
                return Err(FetchError::NotHtml(content_type.to_string()));
            }
        }

        let url = response.url().clone();
        let body = response.text().await?;
        Ok(FetchedPage { url, body })
    }
}

fn is_html(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_content_types() {
        assert!(is_html("text/html"));
        assert!(is_html("text/html; charset=UTF-8"));
        assert!(is_html("Text/HTML"));
        assert!(is_html("application/xhtml+xml"));
        assert!(!is_html("image/jpeg"));
        assert!(!is_html("application/json"));
    }

    #[test]
    fn builds_client() {
        assert!(HttpFetcher::new("taxograph-test", Duration::from_secs(5)).is_ok());
    }
}

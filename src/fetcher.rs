//! Page retrieval.
//!
//! [`PageFetcher`] is the seam between pagination and the network. The
//! paginator only needs "URL in, raw HTML out"; [`HttpFetcher`] is the real
//! implementation and tests substitute scripted fetchers.

use crate::config::ScholarOptions;
use crate::error::{CrawlError, Result};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

/// User agent string for requests
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Fallback wait when a 429 carries no usable `Retry-After`
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Retrieves the raw document behind a search URL.
///
/// Any error returned here is fatal to the crawl; there is no retry.
#[async_trait]
pub trait PageFetcher {
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// [`PageFetcher`] backed by a reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher with browser-like defaults and the optional proxy from `options`.
    pub fn new(options: &ScholarOptions) -> Result<Self> {
        Ok(Self {
            client: build_http_client(options)?,
        })
    }
}

/// Build HTTP client with optional proxy
fn build_http_client(options: &ScholarOptions) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(options.timeout)
        .cookie_store(true);

    if let Some(proxy_url) = options.proxy.as_deref() {
        let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
            CrawlError::Config(format!("Invalid proxy URL '{}': {}", proxy_url, e))
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| CrawlError::Config(format!("Failed to build HTTP client: {}", e)))
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(url.as_str())
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Cache-Control", "no-cache")
            .header("Pragma", "no-cache")
            .header("Sec-Fetch-Dest", "document")
            .header("Sec-Fetch-Mode", "navigate")
            .header("Sec-Fetch-Site", "none")
            .header("Sec-Fetch-User", "?1")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(CrawlError::RateLimited(retry_after));
        }

        if !status.is_success() {
            return Err(CrawlError::Http {
                code: status.as_u16(),
                message: format!("HTTP error: {}", status),
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn options_for(server: &MockServer) -> ScholarOptions {
        ScholarOptions {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
            ..Default::default()
        }
    }

    #[test]
    fn test_invalid_proxy_rejected() {
        let options = ScholarOptions {
            proxy: Some("::not a proxy::".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            HttpFetcher::new(&options),
            Err(CrawlError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/scholar"))
            .and(query_param("start", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&options_for(&server)).expect("client");
        let url = Url::parse(&format!("{}/scholar?start=0", server.uri())).expect("url");
        let body = fetcher.fetch(&url).await.expect("fetch");
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_fetch_maps_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "17"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&options_for(&server)).expect("client");
        let url = Url::parse(&format!("{}/scholar", server.uri())).expect("url");
        let err = fetcher.fetch(&url).await.expect_err("429 must fail");
        assert!(matches!(err, CrawlError::RateLimited(17)));
    }

    #[tokio::test]
    async fn test_fetch_maps_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&options_for(&server)).expect("client");
        let url = Url::parse(&format!("{}/scholar", server.uri())).expect("url");
        let err = fetcher.fetch(&url).await.expect_err("503 must fail");
        assert!(matches!(err, CrawlError::Http { code: 503, .. }));
    }
}

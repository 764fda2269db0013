//! HTTP fetch collaborator with retries and exponential backoff.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use macrocal_core::config::HttpConfig;
use macrocal_core::{Fetch, MacroCalError, MacroCalResult};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER};
use reqwest::{RequestBuilder, Url};
use tracing::{info, warn};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_JSON: &str = "application/json,text/plain;q=0.9,*/*;q=0.8";

/// Fetches source documents over HTTP.
///
/// BLS rejects default client user agents, so requests look like a desktop
/// browser: browser User-Agent, Accept headers and a same-site Referer.
pub struct HttpFetcher {
    client: reqwest::Client,
    attempts: u32,
    backoff: Duration,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(HttpFetcher {
            client,
            attempts: config.retries.max(1),
            backoff: Duration::from_millis(config.backoff_ms),
        })
    }

    fn request(&self, url: &str, accept: &'static str) -> RequestBuilder {
        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, HeaderValue::from_static(accept));
        if let Some(referer) = site_root(url) {
            request = request.header(REFERER, referer);
        }
        request
    }

    /// Run `op` until it succeeds or the attempts run out, doubling the
    /// delay after each failure.
    async fn with_retries<T, F, Fut>(&self, url: &str, op: F) -> MacroCalResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, reqwest::Error>>,
    {
        let mut delay = self.backoff;
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.attempts => {
                    warn!(
                        url,
                        attempt,
                        of = self.attempts,
                        retry_in_ms = delay.as_millis() as u64,
                        error = %e,
                        "Fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(MacroCalError::Fetch {
                        url: url.to_string(),
                        attempts: attempt,
                        message: e.to_string(),
                    });
                }
            }
        }
    }
}

impl Fetch for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> MacroCalResult<String> {
        let body = self
            .with_retries(url, || async move {
                self.request(url, ACCEPT_HTML)
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await
            })
            .await?;

        info!(url, bytes = body.len(), "Fetched page");
        Ok(body)
    }

    async fn fetch_json(&self, url: &str) -> MacroCalResult<serde_json::Value> {
        let document = self
            .with_retries(url, || async move {
                self.request(url, ACCEPT_JSON)
                    .send()
                    .await?
                    .error_for_status()?
                    .json::<serde_json::Value>()
                    .await
            })
            .await?;

        info!(url, "Fetched JSON document");
        Ok(document)
    }
}

/// `https://www.bls.gov/schedule/2026/home.htm` -> `https://www.bls.gov/`
fn site_root(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(format!("{}://{}/", parsed.scheme(), host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_root() {
        assert_eq!(
            site_root("https://www.bls.gov/schedule/2026/home.htm").as_deref(),
            Some("https://www.bls.gov/")
        );
        assert_eq!(site_root("not a url"), None);
    }

    #[tokio::test]
    async fn test_unreachable_source_fails_after_all_attempts() {
        let config = HttpConfig {
            timeout_secs: 1,
            retries: 2,
            backoff_ms: 1,
            ..HttpConfig::default()
        };
        let fetcher = HttpFetcher::new(&config).unwrap();

        // Port 9 (discard) on localhost is not expected to serve HTTP
        let err = fetcher.fetch_text("http://127.0.0.1:9/schedule").await.unwrap_err();
        match err {
            MacroCalError::Fetch { url, attempts, .. } => {
                assert_eq!(url, "http://127.0.0.1:9/schedule");
                assert_eq!(attempts, 2);
            }
            other => panic!("expected Fetch error, got {other:?}"),
        }
    }
}

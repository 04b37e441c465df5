use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::redirect;
use tracing::{debug, warn};

use crate::error::{ConfigError, FetchError};

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGS: &str = "en-US,en;q=0.9,ne;q=0.8";

/// Anything that can turn a URL into page markup.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Live fetcher. One per run; the parliament sites serve certificates that
/// do not validate, so verification is off.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGS));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(true)
            .redirect(redirect::Policy::limited(10))
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(HttpFetcher { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "GET");
        let network = |e: reqwest::Error| {
            warn!(url, error = %e, "request failed");
            FetchError::Network {
                url: url.to_string(),
                reason: e.to_string(),
            }
        };

        let resp = self.client.get(url).send().await.map_err(network)?;
        let status = resp.status();
        if !status.is_success() {
            warn!(url, %status, "non-success status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        resp.text().await.map_err(network)
    }
}

#[cfg(test)]
pub mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Serves canned pages by URL; anything else is a 404. Records every
    /// requested URL in order.
    #[derive(Default)]
    pub struct StaticFetcher {
        pages: HashMap<String, Result<String, FetchError>>,
        pub requests: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
            self.pages.insert(url.into(), Ok(body.into()));
            self
        }

        pub fn failing(mut self, url: impl Into<String>, status: u16) -> Self {
            let url = url.into();
            self.pages
                .insert(url.clone(), Err(FetchError::Status { url, status }));
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetch for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages.get(url).cloned().unwrap_or_else(|| {
                Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::StaticFetcher;
    use super::*;

    #[test]
    fn client_builds() {
        assert!(HttpFetcher::new(Duration::from_secs(30)).is_ok());
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let fetcher = HttpFetcher::new(Duration::from_secs(2)).unwrap();
        let err = fetcher.fetch("http://127.0.0.1:9/").await.unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }), "{:?}", err);
    }

    #[tokio::test]
    async fn static_fetcher_serves_and_records() {
        let fetcher = StaticFetcher::new()
            .page("https://a/1", "<p>one</p>")
            .failing("https://a/2", 500);
        assert_eq!(fetcher.fetch("https://a/1").await.unwrap(), "<p>one</p>");
        assert_eq!(
            fetcher.fetch("https://a/2").await,
            Err(FetchError::Status { url: "https://a/2".into(), status: 500 })
        );
        assert!(matches!(
            fetcher.fetch("https://a/3").await,
            Err(FetchError::Status { status: 404, .. })
        ));
        assert_eq!(fetcher.requested(), vec!["https://a/1", "https://a/2", "https://a/3"]);
    }
}

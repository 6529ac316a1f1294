// Fragment transport
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ConsoleConfig;
use crate::{ConsoleError, Result};

/// Fetches replacement markup for a refresh
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` (server-relative or absolute) and return the body. Non-success
    /// statuses are errors: their bodies are never swapped in.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// `Fetcher` backed by reqwest
pub struct HttpFetcher {
    config: ConsoleConfig,
    http_client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: ConsoleConfig) -> Self {
        let http_client = build_client(&config);
        Self {
            config,
            http_client,
        }
    }
}

/// Client shared by the fetcher and the node store: request timeout plus the
/// opaque session cookie, if any
pub(crate) fn build_client(config: &ConsoleConfig) -> reqwest::Client {
    let mut headers = reqwest::header::HeaderMap::new();
    if let Some(cookie) = &config.session_cookie {
        match reqwest::header::HeaderValue::from_str(cookie) {
            Ok(value) => {
                headers.insert(reqwest::header::COOKIE, value);
            }
            Err(e) => warn!(target: "transport", error = %e, "Ignoring malformed session cookie"),
        }
    }

    reqwest::Client::builder()
        .timeout(Duration::from_millis(config.request_timeout_ms))
        .default_headers(headers)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let url = self.config.absolute_url(url);
        debug!(target: "transport", url = %url, "Fetching fragment");

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            warn!(target: "transport", url = %url, error = %e, "Fragment request failed");
            ConsoleError::HttpError(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(target: "transport", url = %url, status = %status, "Fragment request rejected");
            return Err(ConsoleError::StatusError(status.as_u16(), url));
        }
        Ok(response.text().await?)
    }
}

//! Scraper module for fetching HTML content from the target site
//!
//! This module provides the HTTP side of the client: a `PageFetcher` seam,
//! its reqwest-backed implementation, and the session tokens that unlock
//! cookie-gated pages. Every fetch is a single request; there is no retry,
//! delay or caching layer.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during scraping operations
#[derive(Error, Debug)]
pub enum ScraperError {
    /// Network-related errors (connection timeout, DNS failure, etc.)
    #[error("Failed to connect to server: {0}")]
    NetworkError(String),

    /// Server-side failure status codes (5xx)
    #[error("Server returned status {0}")]
    HttpError(u16),

    /// Error reading response body
    #[error("Failed to read response body: {0}")]
    ResponseError(String),
}

/// Result of a successful page fetch
#[derive(Debug)]
pub struct ScraperResult {
    /// The HTML content of the page
    pub html: String,
    /// The HTTP status code
    pub status: u16,
}

/// The two site-issued session tokens, sent as cookies on gated requests
#[derive(Clone, PartialEq, Eq)]
pub struct SessionTokens {
    gogoanime: String,
    auth: String,
}

impl SessionTokens {
    pub fn new(gogoanime: impl Into<String>, auth: impl Into<String>) -> Self {
        Self {
            gogoanime: gogoanime.into(),
            auth: auth.into(),
        }
    }

    /// Value for the `Cookie` request header
    pub fn cookie_header(&self) -> String {
        format!("gogoanime={}; auth={}", self.gogoanime, self.auth)
    }
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("gogoanime", &"<redacted>")
            .field("auth", &"<redacted>")
            .finish()
    }
}

/// Anything that can turn a URL into page markup
///
/// `tokens` is `Some` only for requests that must carry the session cookies.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    async fn fetch_page(
        &self,
        url: &str,
        tokens: Option<&SessionTokens>,
    ) -> Result<ScraperResult, ScraperError>;
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Headers attached to every request
    pub headers: BTreeMap<String, String>,
    /// Time allowed to establish a connection
    pub connect_timeout: Duration,
    /// Overall request deadline; none unless the caller asks for one
    pub timeout: Option<Duration>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(
            "User-Agent".to_string(),
            crate::config::DEFAULT_USER_AGENT.to_string(),
        );

        Self {
            headers,
            connect_timeout: Duration::from_secs(10),
            timeout: None,
        }
    }
}

/// HTTP client for fetching site pages
pub struct Scraper {
    client: Client,
    config: ScraperConfig,
}

impl Default for Scraper {
    fn default() -> Self {
        Self::new()
    }
}

impl Scraper {
    /// Create a new Scraper with default configuration
    pub fn new() -> Self {
        Self::with_config(ScraperConfig::default())
    }

    /// Create a Scraper sending the given headers with every request
    pub fn with_headers(headers: BTreeMap<String, String>) -> Self {
        Self::with_config(ScraperConfig {
            headers,
            ..ScraperConfig::default()
        })
    }

    /// Create a new Scraper with custom configuration
    pub fn with_config(config: ScraperConfig) -> Self {
        let mut builder = Client::builder().connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().expect("Failed to build HTTP client");

        Self { client, config }
    }

    /// Headers sent with every request
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.config.headers
    }

    async fn do_fetch(
        &self,
        url: &str,
        tokens: Option<&SessionTokens>,
    ) -> Result<ScraperResult, ScraperError> {
        let mut request = self.client.get(url);
        for (name, value) in &self.config.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(tokens) = tokens {
            request = request.header("Cookie", tokens.cookie_header());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ScraperError::NetworkError("Connection timeout".to_string())
            } else if e.is_connect() {
                ScraperError::NetworkError("Failed to connect to server".to_string())
            } else {
                ScraperError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        let status_code = status.as_u16();

        if status.is_server_error() {
            return Err(ScraperError::HttpError(status_code));
        }

        // Missing anime/episode pages come back as rendered 404 documents;
        // their structure is judged by the parser, not here.
        if !status.is_success() {
            warn!("{} returned status {}", url, status_code);
        }

        let html = response
            .text()
            .await
            .map_err(|e| ScraperError::ResponseError(e.to_string()))?;

        debug!("Fetched {} bytes from {}", html.len(), url);

        Ok(ScraperResult {
            html,
            status: status_code,
        })
    }
}

impl PageFetcher for Scraper {
    async fn fetch_page(
        &self,
        url: &str,
        tokens: Option<&SessionTokens>,
    ) -> Result<ScraperResult, ScraperError> {
        self.do_fetch(url, tokens).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Canned-markup fetcher for unit tests

    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Serves fixture HTML by exact URL and records every request
    #[derive(Default)]
    pub struct FixtureFetcher {
        pages: HashMap<String, String>,
        requests: RefCell<Vec<(String, bool)>>,
    }

    impl FixtureFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
            self.pages.insert(url.into(), html.into());
            self
        }

        /// URLs requested so far, in order
        pub fn requested(&self) -> Vec<String> {
            self.requests.borrow().iter().map(|(u, _)| u.clone()).collect()
        }

        /// Whether the request for `url` carried session cookies
        pub fn sent_cookies(&self, url: &str) -> bool {
            self.requests
                .borrow()
                .iter()
                .any(|(u, cookies)| u == url && *cookies)
        }
    }

    impl PageFetcher for FixtureFetcher {
        async fn fetch_page(
            &self,
            url: &str,
            tokens: Option<&SessionTokens>,
        ) -> Result<ScraperResult, ScraperError> {
            self.requests
                .borrow_mut()
                .push((url.to_string(), tokens.is_some()));

            match self.pages.get(url) {
                Some(html) => Ok(ScraperResult {
                    html: html.clone(),
                    status: 200,
                }),
                None => Err(ScraperError::NetworkError(format!("no fixture for {}", url))),
            }
        }
    }
}

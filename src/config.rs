//! Configuration module for the gogoanime scraper
//!
//! Handles the scraping client settings (session tokens, site host, request
//! headers) and the environment-driven server configuration.

use std::collections::BTreeMap;
use std::env;

use crate::scraper::SessionTokens;

/// Default site host
pub const DEFAULT_BASE_URL: &str = "https://gogoanime.pe/";

/// Default identifying header value sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Settings for the scraping client, fixed at construction
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Session tokens forwarded as cookies on gated requests
    pub tokens: SessionTokens,
    /// Site host, always ending with a single `/`
    pub base_url: String,
    /// Headers attached to every request
    pub headers: BTreeMap<String, String>,
}

impl ClientConfig {
    /// Create a client configuration with the default host and headers
    pub fn new(gogoanime_token: impl Into<String>, auth_token: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string());

        Self {
            tokens: SessionTokens::new(gogoanime_token, auth_token),
            base_url: DEFAULT_BASE_URL.to_string(),
            headers,
        }
    }

    /// Replace the site host. Trailing slashes are collapsed to one.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = normalize_base_url(base_url.as_ref());
        self
    }

    /// Add or replace a request header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Scraping client settings
    pub client: ClientConfig,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Panics
    /// Panics if `GOGOANIME_TOKEN` or `AUTH_TOKEN` is not set, or `PORT` is not a number
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut client = ClientConfig::new(
            env::var("GOGOANIME_TOKEN").expect("GOGOANIME_TOKEN must be set"),
            env::var("AUTH_TOKEN").expect("AUTH_TOKEN must be set"),
        );

        if let Ok(base_url) = env::var("BASE_URL") {
            client = client.with_base_url(base_url);
        }

        if let Ok(user_agent) = env::var("USER_AGENT") {
            client = client.with_header("User-Agent", user_agent);
        }

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            client,
        }
    }
}

fn normalize_base_url(base_url: &str) -> String {
    format!("{}/", base_url.trim().trim_end_matches('/'))
}

//! Client facade
//!
//! `GogoClient` is the entry point library callers and the REST routes use.
//! It holds the immutable configuration and a page fetcher; every operation
//! is a fresh chain of sequential fetches with no state kept between calls.

use std::fmt;

use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::constants::{endpoints, genres, limits};
use crate::error::{AppError, AppResult};
use crate::models::{MediaInfo, MediaLinkBundle, SearchResult};
use crate::pagination::collect_paged;
use crate::parser::{parse_airing, parse_listing, parse_media_info};
use crate::resolver::{AdvancedStrategy, BasicStrategy, LinkResolutionStrategy, StrategyKind};
use crate::scraper::{PageFetcher, Scraper};

/// Scraping client for one site host and one pair of session tokens
pub struct GogoClient<F = Scraper> {
    config: ClientConfig,
    fetcher: F,
}

impl GogoClient<Scraper> {
    /// Create a client backed by a reqwest `Scraper` sending the configured headers
    pub fn new(config: ClientConfig) -> Self {
        let fetcher = Scraper::with_headers(config.headers.clone());
        Self::with_fetcher(config, fetcher)
    }
}

impl<F: PageFetcher> GogoClient<F> {
    /// Create a client over any page fetcher
    pub fn with_fetcher(config: ClientConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Search the site by keyword (first results page only)
    pub async fn search_anime(&self, query: &str) -> AppResult<Vec<SearchResult>> {
        let url = endpoints::search(&self.config.base_url, query);
        info!("Searching for anime: {}", query);

        let page = self.fetcher.fetch_page(&url, None).await?;
        let results = parse_listing(&page.html).unwrap_or_else(|e| {
            warn!("Search page for {:?} has no result list: {}", query, e);
            Vec::new()
        });

        if results.is_empty() {
            return Err(AppError::EmptySearchResult(query.to_string()));
        }

        info!("Found {} results for {:?}", results.len(), query);
        Ok(results)
    }

    /// Title metadata from the anime's category page
    pub async fn get_details(&self, anime_id: &str) -> AppResult<MediaInfo> {
        let url = endpoints::category(&self.config.base_url, anime_id);
        info!("Fetching details for {}", anime_id);

        let page = self.fetcher.fetch_page(&url, None).await?;
        parse_media_info(&page.html)
            .map_err(|e| AppError::invalid_identifier(format!("{}: {}", anime_id, e)))
    }

    /// Resolve episode links from the token-gated episode page
    pub async fn resolve_advanced(
        &self,
        anime_id: &str,
        episode_num: u32,
    ) -> AppResult<MediaLinkBundle> {
        self.advanced().resolve(anime_id, episode_num).await
    }

    /// Resolve episode links through the public download host
    pub async fn resolve_basic(
        &self,
        anime_id: &str,
        episode_num: u32,
    ) -> AppResult<MediaLinkBundle> {
        self.basic().resolve(anime_id, episode_num).await
    }

    /// Resolve episode links with a strategy chosen at runtime
    pub async fn resolve(
        &self,
        kind: StrategyKind,
        anime_id: &str,
        episode_num: u32,
    ) -> AppResult<MediaLinkBundle> {
        match kind {
            StrategyKind::Advanced => self.resolve_advanced(anime_id, episode_num).await,
            StrategyKind::Basic => self.resolve_basic(anime_id, episode_num).await,
        }
    }

    pub fn advanced(&self) -> AdvancedStrategy<'_, F> {
        AdvancedStrategy::new(&self.fetcher, &self.config.base_url, &self.config.tokens)
    }

    pub fn basic(&self) -> BasicStrategy<'_, F> {
        BasicStrategy::new(&self.fetcher, &self.config.base_url)
    }

    /// Collect up to `limit` titles of a genre, following the listing's pages
    pub async fn get_by_genre(&self, genre_name: &str, limit: usize) -> AppResult<Vec<SearchResult>> {
        let template = endpoints::genre_template(&self.config.base_url, genre_name);
        info!("Fetching genre {} (limit {})", genre_name, limit);
        if !genres::is_known(genre_name) {
            debug!("{} is not a known genre name", genre_name);
        }

        let first = self.fetcher.fetch_page(&template, None).await?;
        collect_paged(&self.fetcher, &template, first.html, limit)
            .await
            .map_err(|e| match e {
                AppError::InvalidGenreOrPage(_) => AppError::InvalidGenreOrPage(genre_name.to_string()),
                other => other,
            })
    }

    /// Genre listing with the default limit
    pub async fn get_by_genre_default(&self, genre_name: &str) -> AppResult<Vec<SearchResult>> {
        self.get_by_genre(genre_name, limits::DEFAULT_GENRE_LIMIT).await
    }

    /// Currently airing titles from the home page sidebar
    ///
    /// `count` must be below `limits::MAX_AIRING_COUNT`; this is checked
    /// before any request is made.
    pub async fn get_airing(&self, count: usize) -> AppResult<Vec<SearchResult>> {
        if count >= limits::MAX_AIRING_COUNT {
            return Err(AppError::CountOutOfRange {
                requested: count,
                max: limits::MAX_AIRING_COUNT,
            });
        }

        let url = endpoints::home(&self.config.base_url);
        info!("Fetching {} airing titles", count);

        let page = self.fetcher.fetch_page(&url, None).await?;
        let mut airing = parse_airing(&page.html).map_err(|e| {
            warn!("Home page has no airing list: {}", e);
            AppError::NoAiringContent
        })?;

        if airing.is_empty() {
            return Err(AppError::NoAiringContent);
        }

        airing.truncate(count);
        Ok(airing)
    }
}

impl<F> fmt::Display for GogoClient<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gogo-scraper client for {}", self.config.base_url)
    }
}

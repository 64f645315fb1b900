//! Listing pagination
//!
//! Walks a paged listing by following the "next page" control until enough
//! results are collected or the listing runs out. The walk is a loop over an
//! explicit state, one fetch per iteration.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::SearchResult;
use crate::parser::{current_page_number, next_page_number, parse_listing};
use crate::scraper::PageFetcher;

/// Loop state of one walk; owned by the call that created it
#[derive(Debug)]
struct PaginationState {
    collected: Vec<SearchResult>,
    limit: usize,
    current_page_markup: String,
    visited_pages: HashSet<String>,
}

impl PaginationState {
    fn new(limit: usize, first_page_markup: String) -> Self {
        // The first page counts as visited under its own number
        let visited_pages = current_page_number(&first_page_markup)
            .into_iter()
            .collect();

        Self {
            collected: Vec::with_capacity(limit.min(256)),
            limit,
            current_page_markup: first_page_markup,
            visited_pages,
        }
    }

    fn is_full(&self) -> bool {
        self.collected.len() >= self.limit
    }

    /// Append in document order, stopping at the limit
    fn absorb(&mut self, results: Vec<SearchResult>) {
        let room = self.limit.saturating_sub(self.collected.len());
        self.collected.extend(results.into_iter().take(room));
    }
}

/// Collect up to `limit` results from a paged listing
///
/// `url_template` gets the next page number appended verbatim
/// (e.g. `https://gogoanime.pe/genre/romance?page=`). `first_page_markup` is
/// the already-fetched first page.
///
/// # Errors
/// `InvalidGenreOrPage` when the first page has no result list, and
/// `Network` when fetching a later page fails. A later page without a result
/// list, or without a readable next-page control, simply ends the walk.
pub async fn collect_paged<F: PageFetcher>(
    fetcher: &F,
    url_template: &str,
    first_page_markup: String,
    limit: usize,
) -> AppResult<Vec<SearchResult>> {
    let first_results = parse_listing(&first_page_markup)
        .map_err(|e| AppError::InvalidGenreOrPage(format!("{}: {}", url_template, e)))?;

    let mut state = PaginationState::new(limit, first_page_markup);
    state.absorb(first_results);

    while !state.is_full() {
        let Some(page) = next_page_number(&state.current_page_markup) else {
            debug!("No next page after {} results", state.collected.len());
            break;
        };

        if !state.visited_pages.insert(page.clone()) {
            debug!("Page {} already visited, stopping", page);
            break;
        }

        let url = format!("{}{}", url_template, page);
        info!("Fetching listing page {}", url);
        let result = fetcher.fetch_page(&url, None).await?;

        match parse_listing(&result.html) {
            Ok(results) => state.absorb(results),
            Err(e) => {
                debug!("Listing ended at {}: {}", url, e);
                break;
            }
        }

        state.current_page_markup = result.html;
    }

    info!(
        "Collected {} of {} requested results",
        state.collected.len(),
        state.limit
    );

    Ok(state.collected)
}


#[cfg(test)]
mod tests {
    use super::fixtures::listing_page;
    use super::*;
    use crate::scraper::testing::FixtureFetcher;
    use crate::scraper::ScraperError;

    const TEMPLATE: &str = "https://gogoanime.pe/genre/romance?page=";

    fn ids(results: &[SearchResult]) -> Vec<String> {
        results.iter().map(|r| r.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_limit_within_first_page_fetches_nothing() {
        let fetcher = FixtureFetcher::new();
        let first = listing_page("p1", 20, 1, Some(2));

        let results = collect_paged(&fetcher, TEMPLATE, first, 15).await.unwrap();

        assert_eq!(results.len(), 15);
        let expected: Vec<String> = (1..=15).map(|n| format!("p1-{}", n)).collect();
        assert_eq!(ids(&results), expected);
        assert!(fetcher.requested().is_empty());
    }

    #[tokio::test]
    async fn test_limit_spanning_pages_truncates_second_page() {
        let fetcher = FixtureFetcher::new()
            .page(format!("{}2", TEMPLATE), listing_page("p2", 20, 2, Some(3)));
        let first = listing_page("p1", 20, 1, Some(2));

        let results = collect_paged(&fetcher, TEMPLATE, first, 30).await.unwrap();

        assert_eq!(results.len(), 30);
        assert_eq!(results[19].id, "p1-20");
        assert_eq!(results[20].id, "p2-1");
        assert_eq!(results[29].id, "p2-10");
        assert_eq!(fetcher.requested(), vec![format!("{}2", TEMPLATE)]);
    }

    #[tokio::test]
    async fn test_large_limit_stops_when_next_control_absent() {
        let fetcher = FixtureFetcher::new()
            .page(format!("{}2", TEMPLATE), listing_page("p2", 5, 2, None));
        let first = listing_page("p1", 20, 1, Some(2));

        let results = collect_paged(&fetcher, TEMPLATE, first, 500).await.unwrap();

        assert_eq!(results.len(), 25);
        assert_eq!(fetcher.requested().len(), 1);
    }

    #[tokio::test]
    async fn test_single_page_without_pagination() {
        let fetcher = FixtureFetcher::new();
        let first = listing_page("solo", 3, 1, None);

        let results = collect_paged(&fetcher, TEMPLATE, first, 60).await.unwrap();

        assert_eq!(results.len(), 3);
        assert!(fetcher.requested().is_empty());
    }

    #[tokio::test]
    async fn test_first_page_without_listing_is_invalid_genre() {
        let fetcher = FixtureFetcher::new();
        let first = "<html><body><h1>404</h1></body></html>".to_string();

        let err = collect_paged(&fetcher, TEMPLATE, first, 60).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidGenreOrPage(_)));
        assert!(fetcher.requested().is_empty());
    }

    #[tokio::test]
    async fn test_later_page_without_listing_ends_walk() {
        let fetcher = FixtureFetcher::new()
            .page(format!("{}2", TEMPLATE), "<html><body>gone</body></html>");
        let first = listing_page("p1", 20, 1, Some(2));

        let results = collect_paged(&fetcher, TEMPLATE, first, 60).await.unwrap();

        assert_eq!(results.len(), 20);
    }

    #[tokio::test]
    async fn test_network_failure_on_later_page_propagates() {
        let fetcher = FixtureFetcher::new();
        let first = listing_page("p1", 20, 1, Some(2));

        let err = collect_paged(&fetcher, TEMPLATE, first, 60).await.unwrap_err();

        assert!(matches!(err, AppError::Network(ScraperError::NetworkError(_))));
    }

    #[tokio::test]
    async fn test_repeated_page_number_is_not_refetched() {
        // Page 2 claims page 2 comes next
        let fetcher = FixtureFetcher::new()
            .page(format!("{}2", TEMPLATE), listing_page("p2", 20, 1, Some(2)));
        let first = listing_page("p1", 20, 1, Some(2));

        let results = collect_paged(&fetcher, TEMPLATE, first, 100).await.unwrap();

        assert_eq!(results.len(), 40);
        assert_eq!(fetcher.requested().len(), 1);
    }

    #[tokio::test]
    async fn test_next_control_pointing_back_to_first_page() {
        let fetcher = FixtureFetcher::new()
            .page(format!("{}2", TEMPLATE), listing_page("p2", 3, 2, Some(1)))
            .page(format!("{}1", TEMPLATE), listing_page("p1", 3, 1, Some(2)));
        let first = listing_page("p1", 3, 1, Some(2));

        let results = collect_paged(&fetcher, TEMPLATE, first, 60).await.unwrap();

        assert_eq!(
            ids(&results),
            vec!["p1-1", "p1-2", "p1-3", "p2-1", "p2-2", "p2-3"]
        );
        assert_eq!(fetcher.requested(), vec![format!("{}2", TEMPLATE)]);
    }

    #[tokio::test]
    async fn test_zero_limit_collects_nothing() {
        let fetcher = FixtureFetcher::new();
        let first = listing_page("p1", 20, 1, Some(2));

        let results = collect_paged(&fetcher, TEMPLATE, first, 0).await.unwrap();

        assert!(results.is_empty());
        assert!(fetcher.requested().is_empty());
    }
}

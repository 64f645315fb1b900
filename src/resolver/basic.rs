use tracing::{info, warn};

use super::{identifier_error, LinkResolutionStrategy};
use crate::constants::endpoints;
use crate::error::{AppError, AppResult};
use crate::models::MediaLinkBundle;
use crate::normalizer::{classify_download_label, download_label_key};
use crate::parser::{
    parse_anime_title, parse_download_host_entries, parse_download_page_link, parse_last_episode,
};
use crate::scraper::PageFetcher;

/// Resolves links through the public episode page and its download host
///
/// Needs no session tokens. Fetches the category page, the episode page and
/// the intermediate download host.
pub struct BasicStrategy<'a, F> {
    fetcher: &'a F,
    base_url: &'a str,
}

impl<'a, F: PageFetcher> BasicStrategy<'a, F> {
    pub fn new(fetcher: &'a F, base_url: &'a str) -> Self {
        Self { fetcher, base_url }
    }
}

impl<F: PageFetcher> LinkResolutionStrategy for BasicStrategy<'_, F> {
    fn name(&self) -> &'static str {
        "basic"
    }

    async fn resolve(&self, anime_id: &str, episode_num: u32) -> AppResult<MediaLinkBundle> {
        info!("Resolving {} episode {} ({})", anime_id, episode_num, self.name());

        let category_url = endpoints::category(self.base_url, anime_id);
        let category = self.fetcher.fetch_page(&category_url, None).await?;
        let title = parse_anime_title(&category.html)
            .map_err(|e| identifier_error(anime_id, episode_num, e))?;
        parse_last_episode(&category.html)
            .map_err(|e| identifier_error(anime_id, episode_num, e))?;

        let episode_url = endpoints::episode(self.base_url, anime_id, episode_num);
        let episode = self.fetcher.fetch_page(&episode_url, None).await?;
        let download_url = parse_download_page_link(&episode.html)
            .map_err(|e| identifier_error(anime_id, episode_num, e))?;

        let host = self.fetcher.fetch_page(&download_url, None).await?;
        let entries = parse_download_host_entries(&host.html).map_err(|e| {
            warn!("Download host {} returned an unreadable page: {}", download_url, e);
            AppError::malformed(format!("{}: {}", download_url, e))
        })?;

        let mut links = MediaLinkBundle::builder();

        for entry in entries {
            let key = download_label_key(&entry.label);
            match classify_download_label(&key) {
                Some(slot) => links.insert(slot, entry.url),
                None if key.is_empty() => links.unmatched(entry.label.trim()),
                None => links.unmatched(key),
            };
        }

        let bundle = links.build();
        info!(
            "Resolved {} links for {} ({}) episode {}",
            bundle.len(),
            title,
            anime_id,
            episode_num
        );

        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::models::LinkSlot;
    use crate::scraper::testing::FixtureFetcher;

    const DOWNLOAD: &str = "https://gogoplay.io/download?id=MTU";

    fn full_site() -> FixtureFetcher {
        FixtureFetcher::new()
            .page(
                format!("{}category/clannad-dub", HOST),
                category_page("Clannad (Dub)", 23),
            )
            .page(
                format!("{}clannad-dub-episode-3", HOST),
                public_episode_page(DOWNLOAD),
            )
            .page(DOWNLOAD, download_host_page())
    }

    #[tokio::test]
    async fn test_resolves_download_host_slots() {
        let fetcher = full_site();
        let strategy = BasicStrategy::new(&fetcher, HOST);

        let bundle = strategy.resolve("clannad-dub", 3).await.unwrap();

        assert_eq!(bundle.get(LinkSlot::P360), Some("https://cdn.example.com/dl/360.mp4"));
        assert_eq!(bundle.get(LinkSlot::P720), Some("https://cdn.example.com/dl/720.mp4"));
        assert_eq!(bundle.get(LinkSlot::P1080), Some("https://cdn.example.com/dl/1080.mp4"));
        assert_eq!(bundle.get(LinkSlot::Hdp), Some("https://cdn.example.com/dl/hdp.mp4"));
        assert_eq!(bundle.get(LinkSlot::Sdp), Some("https://cdn.example.com/dl/sdp.mp4"));
        assert_eq!(bundle.get(LinkSlot::Streamsb), Some("https://sbplay.org/d/a1"));
        assert_eq!(bundle.get(LinkSlot::Xstreamcdn), Some("https://fembed.com/f/b2"));
        assert_eq!(bundle.get(LinkSlot::Streamtape), Some("https://streamtape.com/v/c3"));
        assert_eq!(bundle.get(LinkSlot::Mixdrop), Some("https://mixdrop.co/f/d4"));
        assert_eq!(bundle.get(LinkSlot::Mp4upload), Some("https://www.mp4upload.com/e5"));
        assert_eq!(bundle.get(LinkSlot::Doodstream), Some("https://dood.la/d/f6"));
        assert_eq!(bundle.len(), 11);
        assert_eq!(bundle.unmatched_labels(), ["(480P-mp4)".to_string()]);
    }

    #[tokio::test]
    async fn test_three_fetches_without_cookies() {
        let fetcher = full_site();
        let strategy = BasicStrategy::new(&fetcher, HOST);

        strategy.resolve("clannad-dub", 3).await.unwrap();

        let requested = fetcher.requested();
        assert_eq!(requested.len(), 3);
        assert_eq!(requested[2], DOWNLOAD);
        assert!(requested.iter().all(|url| !fetcher.sent_cookies(url)));
    }

    #[tokio::test]
    async fn test_repeated_resolution_is_identical() {
        let fetcher = full_site();
        let strategy = BasicStrategy::new(&fetcher, HOST);

        let first = strategy.resolve("clannad-dub", 3).await.unwrap();
        let second = strategy.resolve("clannad-dub", 3).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_unknown_anime_is_invalid_identifier() {
        let fetcher = FixtureFetcher::new().page(
            format!("{}category/nope", HOST),
            "<html><body><h1>404</h1></body></html>",
        );
        let strategy = BasicStrategy::new(&fetcher, HOST);

        let err = strategy.resolve("nope", 1).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidIdentifier(_)));
    }

    #[tokio::test]
    async fn test_episode_without_download_link_is_invalid_identifier() {
        let fetcher = FixtureFetcher::new()
            .page(
                format!("{}category/clannad-dub", HOST),
                category_page("Clannad (Dub)", 23),
            )
            .page(
                format!("{}clannad-dub-episode-40", HOST),
                "<html><body><h1>404</h1></body></html>",
            );
        let strategy = BasicStrategy::new(&fetcher, HOST);

        let err = strategy.resolve("clannad-dub", 40).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidIdentifier(_)));
        assert_eq!(fetcher.requested().len(), 2);
    }

    #[tokio::test]
    async fn test_broken_download_host_is_malformed_response() {
        let fetcher = FixtureFetcher::new()
            .page(
                format!("{}category/clannad-dub", HOST),
                category_page("Clannad (Dub)", 23),
            )
            .page(
                format!("{}clannad-dub-episode-3", HOST),
                public_episode_page(DOWNLOAD),
            )
            .page(DOWNLOAD, r#"<div class="dowload"><span>expired</span></div>"#);
        let strategy = BasicStrategy::new(&fetcher, HOST);

        let err = strategy.resolve("clannad-dub", 3).await.unwrap_err();

        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_empty_download_host_gives_empty_bundle() {
        let fetcher = FixtureFetcher::new()
            .page(
                format!("{}category/clannad-dub", HOST),
                category_page("Clannad (Dub)", 23),
            )
            .page(
                format!("{}clannad-dub-episode-3", HOST),
                public_episode_page(DOWNLOAD),
            )
            .page(DOWNLOAD, "<html><body></body></html>");
        let strategy = BasicStrategy::new(&fetcher, HOST);

        let bundle = strategy.resolve("clannad-dub", 3).await.unwrap();

        assert!(bundle.is_empty());
    }
}

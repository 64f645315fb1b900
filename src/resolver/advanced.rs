use tracing::{debug, info, warn};

use super::{identifier_error, LinkResolutionStrategy};
use crate::constants::endpoints;
use crate::error::{AppError, AppResult};
use crate::models::{LinkSlot, MediaLinkBundle};
use crate::normalizer::{normalize_host_label, normalize_quality_label, resolution_quality};
use crate::parser::{
    extract_hdp_url, parse_anime_title, parse_last_episode, parse_mirror_block,
    parse_quality_downloads, ParseError,
};
use crate::scraper::{PageFetcher, SessionTokens};

/// Resolves links from the token-gated episode page
///
/// Fetches, in order: the category page, the episode page with session
/// cookies, and the embedded player page that carries the HDP stream.
pub struct AdvancedStrategy<'a, F> {
    fetcher: &'a F,
    base_url: &'a str,
    tokens: &'a SessionTokens,
}

impl<'a, F: PageFetcher> AdvancedStrategy<'a, F> {
    pub fn new(fetcher: &'a F, base_url: &'a str, tokens: &'a SessionTokens) -> Self {
        Self {
            fetcher,
            base_url,
            tokens,
        }
    }
}

impl<F: PageFetcher> LinkResolutionStrategy for AdvancedStrategy<'_, F> {
    fn name(&self) -> &'static str {
        "advanced"
    }

    async fn resolve(&self, anime_id: &str, episode_num: u32) -> AppResult<MediaLinkBundle> {
        info!("Resolving {} episode {} ({})", anime_id, episode_num, self.name());

        let category_url = endpoints::category(self.base_url, anime_id);
        let category = self.fetcher.fetch_page(&category_url, None).await?;
        let title = parse_anime_title(&category.html)
            .map_err(|e| identifier_error(anime_id, episode_num, e))?;
        let last_episode = parse_last_episode(&category.html)
            .map_err(|e| identifier_error(anime_id, episode_num, e))?;

        // The site rejects out-of-range episodes itself
        if episode_num > last_episode {
            debug!(
                "Episode {} is past the last listed episode {} of {}",
                episode_num, last_episode, anime_id
            );
        }

        let episode_url = endpoints::episode(self.base_url, anime_id, episode_num);
        let episode = self
            .fetcher
            .fetch_page(&episode_url, Some(self.tokens))
            .await?;

        let mirror_block = parse_mirror_block(&episode.html).map_err(|e| match e {
            ParseError::MissingElement(_) => identifier_error(anime_id, episode_num, e),
            ParseError::MissingAttribute { .. } => {
                warn!("Mirror list of {} is unreadable: {}", episode_url, e);
                AppError::InvalidToken
            }
        })?;

        // Only rendered for a valid session
        let downloads = parse_quality_downloads(&episode.html).map_err(|e| {
            warn!("Gated download section absent on {}: {}", episode_url, e);
            AppError::InvalidToken
        })?;

        let mut links = MediaLinkBundle::builder();

        for download in downloads {
            match resolution_quality(&download.label).and_then(normalize_quality_label) {
                Some(slot) => links.insert(slot, download.url),
                None => links.unmatched(download.label),
            };
        }

        for mirror in mirror_block.mirrors {
            match normalize_host_label(&mirror.label) {
                Some(slot) => links.insert(slot, mirror.url),
                None => links.unmatched(mirror.label),
            };
        }

        match mirror_block.embed_url {
            Some(embed_url) => {
                let player = self.fetcher.fetch_page(&embed_url, None).await?;
                match extract_hdp_url(&player.html) {
                    Some(stream_url) => {
                        links.insert(LinkSlot::Hdp, stream_url);
                    }
                    None => warn!("No stream URL in player page {}", embed_url),
                }
            }
            None => warn!("No embedded player on {}", episode_url),
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

//! Episode link resolution
//!
//! The site renders an episode's downloads in two incompatible layouts
//! depending on how the page is reached. Each layout has its own strategy;
//! both turn an anime id and episode number into a `MediaLinkBundle`.

mod advanced;
mod basic;

pub use advanced::AdvancedStrategy;
pub use basic::BasicStrategy;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::models::MediaLinkBundle;
use crate::parser::ParseError;

/// One way of resolving an episode into named links
#[allow(async_fn_in_trait)]
pub trait LinkResolutionStrategy {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Resolve the links of `episode_num` of `anime_id`
    async fn resolve(&self, anime_id: &str, episode_num: u32) -> AppResult<MediaLinkBundle>;
}

/// Strategy selector for callers that pick at runtime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Token-gated episode page plus the embedded player
    Advanced,
    /// Public episode page plus the intermediate download host
    #[default]
    Basic,
}

fn identifier_error(anime_id: &str, episode_num: u32, err: ParseError) -> AppError {
    AppError::invalid_identifier(format!("{} episode {}: {}", anime_id, episode_num, err))
}

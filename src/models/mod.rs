//! Data models for the gogoanime scraper
//!
//! Plain records returned by the client (search results, title metadata,
//! link bundles) plus the JSON envelopes used by the REST surface.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One entry of a search, genre or airing listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Display title from the link's `title` attribute
    pub title: String,
    /// Site slug identifying the anime (e.g., "clannad-dub")
    pub id: String,
}

/// Title metadata from the anime's category page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaInfo {
    /// From div.anime_info_body_bg h1
    pub title: String,
    /// Release year, when the page states one
    pub year: Option<u32>,
    /// Alternative titles as listed on the page
    pub other_names: String,
    /// Show type (e.g., "Fall 2007 Anime", "TV Series")
    pub season: String,
    /// Airing status (e.g., "Completed", "Ongoing")
    pub status: String,
    /// Genre names
    pub genres: Vec<String>,
    /// Last available episode number
    pub episodes: u32,
    /// Cover image URL
    pub image_url: String,
    /// Plot summary
    pub summary: String,
}

/// A named position in a link bundle
///
/// Direct quality slots come first, then mirror hosts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
pub enum LinkSlot {
    #[serde(rename = "360p")]
    P360,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "sdp")]
    Sdp,
    #[serde(rename = "hdp")]
    Hdp,
    #[serde(rename = "streamsb")]
    Streamsb,
    #[serde(rename = "xstreamcdn")]
    Xstreamcdn,
    #[serde(rename = "streamtape")]
    Streamtape,
    #[serde(rename = "mixdrop")]
    Mixdrop,
    #[serde(rename = "mp4upload")]
    Mp4upload,
    #[serde(rename = "doodstream")]
    Doodstream,
}

impl LinkSlot {
    pub const ALL: [LinkSlot; 12] = [
        LinkSlot::P360,
        LinkSlot::P480,
        LinkSlot::P720,
        LinkSlot::P1080,
        LinkSlot::Sdp,
        LinkSlot::Hdp,
        LinkSlot::Streamsb,
        LinkSlot::Xstreamcdn,
        LinkSlot::Streamtape,
        LinkSlot::Mixdrop,
        LinkSlot::Mp4upload,
        LinkSlot::Doodstream,
    ];

    /// Serialized name of the slot
    pub fn as_str(self) -> &'static str {
        match self {
            LinkSlot::P360 => "360p",
            LinkSlot::P480 => "480p",
            LinkSlot::P720 => "720p",
            LinkSlot::P1080 => "1080p",
            LinkSlot::Sdp => "sdp",
            LinkSlot::Hdp => "hdp",
            LinkSlot::Streamsb => "streamsb",
            LinkSlot::Xstreamcdn => "xstreamcdn",
            LinkSlot::Streamtape => "streamtape",
            LinkSlot::Mixdrop => "mixdrop",
            LinkSlot::Mp4upload => "mp4upload",
            LinkSlot::Doodstream => "doodstream",
        }
    }

    /// Whether this slot holds a third-party mirror rather than a direct file
    pub fn is_mirror(self) -> bool {
        matches!(
            self,
            LinkSlot::Streamsb
                | LinkSlot::Xstreamcdn
                | LinkSlot::Streamtape
                | LinkSlot::Mixdrop
                | LinkSlot::Mp4upload
                | LinkSlot::Doodstream
        )
    }
}

/// Download/stream URLs for one episode, keyed by slot
///
/// Every slot is independently optional. Labels the page offered that did
/// not map to any slot are kept in `unmatched`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaLinkBundle {
    links: BTreeMap<LinkSlot, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    unmatched: Vec<String>,
}

impl MediaLinkBundle {
    pub fn builder() -> MediaLinkBundleBuilder {
        MediaLinkBundleBuilder::default()
    }

    pub fn get(&self, slot: LinkSlot) -> Option<&str> {
        self.links.get(&slot).map(String::as_str)
    }

    pub fn contains(&self, slot: LinkSlot) -> bool {
        self.links.contains_key(&slot)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Present slots in slot order
    pub fn iter(&self) -> impl Iterator<Item = (LinkSlot, &str)> {
        self.links.iter().map(|(slot, url)| (*slot, url.as_str()))
    }

    /// Labels seen on the page that matched no slot
    pub fn unmatched_labels(&self) -> &[String] {
        &self.unmatched
    }
}

/// Accumulates links while a strategy walks its pages
#[derive(Debug, Default)]
pub struct MediaLinkBundleBuilder {
    bundle: MediaLinkBundle,
}

impl MediaLinkBundleBuilder {
    /// Set a slot; a later value for the same slot replaces the earlier one.
    /// Blank URLs are ignored.
    pub fn insert(&mut self, slot: LinkSlot, url: impl Into<String>) -> &mut Self {
        let url = url.into();
        let url = url.trim();
        if !url.is_empty() {
            self.bundle.links.insert(slot, url.to_string());
        }
        self
    }

    /// Record a label that did not map to any slot
    pub fn unmatched(&mut self, label: impl Into<String>) -> &mut Self {
        self.bundle.unmatched.push(label.into());
        self
    }

    pub fn build(self) -> MediaLinkBundle {
        self.bundle
    }
}

/// API response wrapper for successful responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the operation was successful (always true for this type)
    pub success: bool,
    /// The response payload
    pub data: T,
    /// ISO timestamp of when data was fetched
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    /// Create a new successful API response with the current timestamp
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Create a new successful API response with a custom timestamp
    pub fn with_timestamp(data: T, timestamp: DateTime<Utc>) -> Self {
        Self {
            success: true,
            data,
            timestamp: timestamp.to_rfc3339(),
        }
    }
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Whether the operation was successful (always false for errors)
    pub success: bool,
    /// Error message describing what went wrong
    pub error: String,
    /// ISO timestamp of when the error occurred
    pub timestamp: String,
}

impl ApiError {
    /// Create a new API error response with the current timestamp
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

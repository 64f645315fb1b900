//! Label normalization for link bundles
//!
//! The site labels its links with loose text ("1280x720",
//! "StreamtapeChoose this server", "Download (HDP - mp4)"). The tables below
//! are the only place those text conventions live; everything else asks
//! these functions for a `LinkSlot`.

use crate::models::LinkSlot;

/// Numeric quality → direct quality slot
pub const QUALITY_TABLE: &[(&str, LinkSlot)] = &[
    ("360", LinkSlot::P360),
    ("480", LinkSlot::P480),
    ("720", LinkSlot::P720),
    ("1080", LinkSlot::P1080),
];

/// Mirror host name → mirror slot (exact match)
pub const HOST_TABLE: &[(&str, LinkSlot)] = &[
    ("Streamsb", LinkSlot::Streamsb),
    ("Xstreamcdn", LinkSlot::Xstreamcdn),
    ("Streamtape", LinkSlot::Streamtape),
    ("Mixdrop", LinkSlot::Mixdrop),
    ("Mp4Upload", LinkSlot::Mp4upload),
    ("Doodstream", LinkSlot::Doodstream),
];

/// Download-host label substring → slot, checked in order
pub const DOWNLOAD_LABEL_TABLE: &[(&str, LinkSlot)] = &[
    ("(HDP-mp4)", LinkSlot::Hdp),
    ("(SDP-mp4)", LinkSlot::Sdp),
    ("(360P-mp4)", LinkSlot::P360),
    ("(720P-mp4)", LinkSlot::P720),
    ("(1080P-mp4)", LinkSlot::P1080),
    ("Streamsb", LinkSlot::Streamsb),
    ("Xstreamcdn", LinkSlot::Xstreamcdn),
    ("Streamtape", LinkSlot::Streamtape),
    ("Mixdrop", LinkSlot::Mixdrop),
    ("Mp4Upload", LinkSlot::Mp4upload),
    ("Doodstream", LinkSlot::Doodstream),
];

/// Map a numeric quality ("720", "1080p") to its direct quality slot
pub fn normalize_quality_label(raw: &str) -> Option<LinkSlot> {
    let quality = raw.trim().trim_end_matches(['p', 'P']).trim();
    QUALITY_TABLE
        .iter()
        .find(|(pattern, _)| *pattern == quality)
        .map(|(_, slot)| *slot)
}

/// Map a mirror entry's label to its host slot.
///
/// The label is cut at the first `C` ("StreamtapeChoose this server" →
/// "Streamtape") before lookup.
pub fn normalize_host_label(raw: &str) -> Option<LinkSlot> {
    let name = raw.trim().split('C').next().unwrap_or_default().trim();
    HOST_TABLE
        .iter()
        .find(|(pattern, _)| *pattern == name)
        .map(|(_, slot)| *slot)
}

/// Numeric quality from a resolution label: "1280x720" → "720"
pub fn resolution_quality(raw: &str) -> Option<&str> {
    raw.trim().split('x').nth(1).map(str::trim)
}

/// Collapse a download-host label for classification.
///
/// The first whitespace token is an icon/indicator and is dropped; the rest
/// is joined without separators: "Download (360P - mp4)" → "(360P-mp4)".
pub fn download_label_key(raw: &str) -> String {
    raw.split_whitespace().skip(1).collect()
}

/// Classify a collapsed download-host label against `DOWNLOAD_LABEL_TABLE`
pub fn classify_download_label(label: &str) -> Option<LinkSlot> {
    DOWNLOAD_LABEL_TABLE
        .iter()
        .find(|(pattern, _)| label.contains(pattern))
        .map(|(_, slot)| *slot)
}

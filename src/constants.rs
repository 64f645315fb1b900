//! Constants module for the gogoanime scraper
//!
//! Contains endpoint URL builders that use the configured site host, listing
//! limits, and the genre names the site is known to serve.

/// URL builder functions for all endpoints
///
/// `base_url` is expected to end with `/` (see `ClientConfig::with_base_url`).
pub mod endpoints {
    /// Home page URL (carries the airing sidebar)
    pub fn home(base_url: &str) -> String {
        base_url.to_string()
    }

    /// Search URL with query parameter
    pub fn search(base_url: &str, query: &str) -> String {
        format!("{}search.html?keyword={}", base_url, urlencoding::encode(query))
    }

    /// Anime category (info) page URL
    pub fn category(base_url: &str, anime_id: &str) -> String {
        format!("{}category/{}", base_url, anime_id)
    }

    /// Episode page URL
    pub fn episode(base_url: &str, anime_id: &str, episode_num: u32) -> String {
        format!("{}{}-episode-{}", base_url, anime_id, episode_num)
    }

    /// Genre listing URL template; the page number is appended verbatim
    pub fn genre_template(base_url: &str, genre_name: &str) -> String {
        format!("{}genre/{}?page=", base_url, genre_name)
    }
}

/// Result count limits for listing operations
pub mod limits {
    /// Default number of results collected by genre listings (three site pages)
    pub const DEFAULT_GENRE_LIMIT: usize = 60;

    /// Default number of airing entries returned
    pub const DEFAULT_AIRING_COUNT: usize = 10;

    /// Airing requests must ask for fewer entries than this
    pub const MAX_AIRING_COUNT: usize = 20;
}

/// Genre names accepted by the site
pub mod genres {
    pub const KNOWN: &[&str] = &[
        "action",
        "adventure",
        "cars",
        "comedy",
        "dementia",
        "demons",
        "drama",
        "dub",
        "ecchi",
        "fantasy",
        "game",
        "harem",
        "historical",
        "horror",
        "josei",
        "kids",
        "magic",
        "martial-arts",
        "mecha",
        "military",
        "music",
        "mystery",
        "parody",
        "police",
        "psychological",
        "romance",
        "samurai",
        "school",
        "sci-fi",
        "seinen",
        "shoujo",
        "shoujo-ai",
        "shounen-ai",
        "shounen",
        "slice-of-life",
        "space",
        "sports",
        "super-power",
        "supernatural",
        "thriller",
        "vampire",
        "yaoi",
        "yuri",
    ];

    /// Whether the site is known to serve this genre
    pub fn is_known(name: &str) -> bool {
        KNOWN.contains(&name)
    }
}

//! Parser module for extracting structured data from HTML
//!
//! Pure functions over page markup fetched from the site. Each returns owned
//! data so no parsed document outlives the call. A `ParseError` means the
//! page did not have the structure the site normally renders; callers decide
//! what that means for the operation in progress.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::models::{MediaInfo, SearchResult};

/// First absolute URL inside a script body
static SCRIPT_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());

/// Structural problems found while parsing a page
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// An element the page normally has is absent
    #[error("missing element `{0}`")]
    MissingElement(&'static str),

    /// An element is present but lacks a required attribute
    #[error("missing attribute `{attribute}` on `{element}`")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
}

/// A link together with the text the page labels it with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledLink {
    pub label: String,
    pub url: String,
}

/// The multi-mirror block of an episode page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorBlock {
    /// Embedded player reference, already qualified with a scheme
    pub embed_url: Option<String>,
    /// Third-party mirror entries in document order
    pub mirrors: Vec<LabeledLink>,
}

/// Extract the anime id from a listing link
///
/// Takes a path like "/category/clannad-dub" and returns "clannad-dub"
pub fn id_from_href(href: &str) -> Option<String> {
    href.split('/')
        .nth(2)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Prefix protocol-relative references ("//host/path") with `https:`
pub fn qualify_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https:{}", url)
    }
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parse a result listing (search, genre pages)
///
/// Extracts one `SearchResult` per `ul.items li` from its first link's
/// `title` attribute and href. Items without a usable link are skipped.
///
/// # Errors
/// `MissingElement` when the page has no `ul.items` container.
pub fn parse_listing(html: &str) -> Result<Vec<SearchResult>, ParseError> {
    let document = Html::parse_document(html);

    let list_selector = Selector::parse("ul.items").unwrap();
    let item_selector = Selector::parse("li").unwrap();
    let link_selector = Selector::parse("a").unwrap();

    let list = document
        .select(&list_selector)
        .next()
        .ok_or(ParseError::MissingElement("ul.items"))?;

    let mut results = Vec::new();

    for item in list.select(&item_selector) {
        let Some(link) = item.select(&link_selector).next() else {
            tracing::debug!("Skipping listing item without a link");
            continue;
        };

        let title = link.value().attr("title").unwrap_or_default().trim();
        let id = link.value().attr("href").and_then(id_from_href);

        match id {
            Some(id) => results.push(SearchResult {
                title: title.to_string(),
                id,
            }),
            None => tracing::debug!("Skipping listing item without an anime id: {}", title),
        }
    }

    Ok(results)
}

/// Page number of the control following the selected one
///
/// Reads `data-page` from the next sibling `li` of `li.selected` (from its
/// link, or from the `li` itself). `None` means there is no further page.
pub fn next_page_number(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let selected_selector = Selector::parse("li.selected").unwrap();
    let page_link_selector = Selector::parse("a[data-page]").unwrap();

    let selected = document.select(&selected_selector).next()?;
    let next = selected.next_siblings().find_map(ElementRef::wrap)?;

    if next.value().name() != "li" {
        return None;
    }

    next.select(&page_link_selector)
        .next()
        .and_then(|link| link.value().attr("data-page"))
        .or_else(|| next.value().attr("data-page"))
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .map(str::to_string)
}

/// Page number of the selected pagination control, if the page has one
pub fn current_page_number(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let selected_selector = Selector::parse("li.selected").unwrap();
    let page_link_selector = Selector::parse("a[data-page]").unwrap();

    let selected = document.select(&selected_selector).next()?;

    selected
        .select(&page_link_selector)
        .next()
        .and_then(|link| link.value().attr("data-page"))
        .or_else(|| selected.value().attr("data-page"))
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .map(str::to_string)
}

/// Parse the airing sidebar of the home page
///
/// # Errors
/// `MissingElement` when the `nav.menu_series.cron` list is absent.
pub fn parse_airing(html: &str) -> Result<Vec<SearchResult>, ParseError> {
    let document = Html::parse_document(html);

    let menu_selector = Selector::parse("nav.menu_series.cron ul").unwrap();
    let link_selector = Selector::parse("a").unwrap();

    let menu = document
        .select(&menu_selector)
        .next()
        .ok_or(ParseError::MissingElement("nav.menu_series.cron ul"))?;

    let results = menu
        .select(&link_selector)
        .filter_map(|link| {
            let id = link.value().attr("href").and_then(id_from_href)?;
            let title = link
                .value()
                .attr("title")
                .map(|t| t.trim().to_string())
                .unwrap_or_else(|| element_text(&link));
            Some(SearchResult { title, id })
        })
        .collect();

    Ok(results)
}

/// Title from the category page info box
pub fn parse_anime_title(html: &str) -> Result<String, ParseError> {
    let document = Html::parse_document(html);
    let title_selector = Selector::parse("div.anime_info_body_bg h1").unwrap();

    document
        .select(&title_selector)
        .next()
        .map(|el| element_text(&el))
        .ok_or(ParseError::MissingElement("div.anime_info_body_bg h1"))
}

/// Last available episode number from the category page's episode index
///
/// Uses the `ep_end` attribute of the last range link, falling back to the
/// number after `-` in its text ("1-23" → 23).
pub fn parse_last_episode(html: &str) -> Result<u32, ParseError> {
    let document = Html::parse_document(html);
    last_episode(&document)
}

fn last_episode(document: &Html) -> Result<u32, ParseError> {
    let range_selector = Selector::parse("#episode_page li a").unwrap();

    let last_range = document
        .select(&range_selector)
        .last()
        .ok_or(ParseError::MissingElement("#episode_page li a"))?;

    last_range
        .value()
        .attr("ep_end")
        .and_then(|end| end.trim().parse::<u32>().ok())
        .or_else(|| {
            element_text(&last_range)
                .rsplit('-')
                .next()
                .and_then(|end| end.trim().parse::<u32>().ok())
        })
        .ok_or(ParseError::MissingAttribute {
            element: "#episode_page li a",
            attribute: "ep_end",
        })
}

/// Parse title metadata from the category page
pub fn parse_media_info(html: &str) -> Result<MediaInfo, ParseError> {
    let document = Html::parse_document(html);

    let info_selector = Selector::parse("div.anime_info_body_bg").unwrap();
    let image_selector = Selector::parse("img").unwrap();
    let title_selector = Selector::parse("h1").unwrap();
    let row_selector = Selector::parse("p.type").unwrap();
    let link_selector = Selector::parse("a").unwrap();

    let info = document
        .select(&info_selector)
        .next()
        .ok_or(ParseError::MissingElement("div.anime_info_body_bg"))?;

    let image_url = info
        .select(&image_selector)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string)
        .ok_or(ParseError::MissingElement("div.anime_info_body_bg img"))?;

    let title = info
        .select(&title_selector)
        .next()
        .map(|h1| element_text(&h1))
        .ok_or(ParseError::MissingElement("div.anime_info_body_bg h1"))?;

    // Rows: type, summary, genres, released, status, other names
    let rows: Vec<ElementRef<'_>> = document.select(&row_selector).collect();
    if rows.len() < 6 {
        return Err(ParseError::MissingElement("p.type"));
    }

    let after_label = |row: &ElementRef<'_>| -> String {
        let text = element_text(row);
        match text.split_once(':') {
            Some((_, value)) => value.trim().to_string(),
            None => text,
        }
    };

    let season = rows[0]
        .select(&link_selector)
        .next()
        .map(|a| {
            a.value()
                .attr("title")
                .map(|t| t.trim().to_string())
                .unwrap_or_else(|| element_text(&a))
        })
        .unwrap_or_default();

    let summary = after_label(&rows[1]);

    let genres = rows[2]
        .select(&link_selector)
        .filter_map(|a| a.value().attr("title"))
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty())
        .collect();

    let year = element_text(&rows[3])
        .split_whitespace()
        .nth(1)
        .and_then(|y| y.parse::<u32>().ok());

    let status = rows[4]
        .select(&link_selector)
        .next()
        .map(|a| element_text(&a))
        .unwrap_or_default();

    let other_names = after_label(&rows[5]);

    let episodes = last_episode(&document)?;

    Ok(MediaInfo {
        title,
        year,
        other_names,
        season,
        status,
        genres,
        episodes,
        image_url,
        summary,
    })
}

/// Quality downloads of a token-gated episode page (`div.cf-download a`)
///
/// # Errors
/// `MissingElement("div.cf-download")` when the gated section did not render.
pub fn parse_quality_downloads(html: &str) -> Result<Vec<LabeledLink>, ParseError> {
    let document = Html::parse_document(html);

    let block_selector = Selector::parse("div.cf-download").unwrap();
    let link_selector = Selector::parse("a").unwrap();

    let block = document
        .select(&block_selector)
        .next()
        .ok_or(ParseError::MissingElement("div.cf-download"))?;

    Ok(block
        .select(&link_selector)
        .filter_map(|a| {
            let url = a.value().attr("href")?;
            Some(LabeledLink {
                label: element_text(&a),
                url: url.trim().to_string(),
            })
        })
        .collect())
}

/// Parse the episode page's multi-mirror block
///
/// The first entry is a header and is skipped by position. The second is
/// the site's own player; its `data-video` becomes `embed_url`. Every entry
/// from the third on is a third-party mirror.
pub fn parse_mirror_block(html: &str) -> Result<MirrorBlock, ParseError> {
    let document = Html::parse_document(html);

    let block_selector = Selector::parse("div.anime_muti_link").unwrap();
    let entry_selector = Selector::parse("li").unwrap();
    let link_selector = Selector::parse("a").unwrap();

    let block = document
        .select(&block_selector)
        .next()
        .ok_or(ParseError::MissingElement("div.anime_muti_link"))?;

    let mut references = Vec::new();
    for entry in block.select(&entry_selector).skip(1) {
        let video = entry
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("data-video"))
            .ok_or(ParseError::MissingAttribute {
                element: "div.anime_muti_link li a",
                attribute: "data-video",
            })?;

        references.push(LabeledLink {
            label: element_text(&entry),
            url: qualify_url(video),
        });
    }

    let mut references = references.into_iter();
    let embed_url = references.next().map(|player| player.url);

    Ok(MirrorBlock {
        embed_url,
        mirrors: references.collect(),
    })
}

/// Stream URL embedded in the player page's script
///
/// Scans the third `<script>` element for the first `http(s)://` URL and cuts
/// it at the first `'`. `None` when the script or the URL is absent.
pub fn extract_hdp_url(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let script_selector = Selector::parse("script").unwrap();

    let script = document.select(&script_selector).nth(2)?;
    let body = script.text().collect::<String>();

    let found = SCRIPT_URL.find(&body)?.as_str();
    let url = found.split('\'').next().unwrap_or_default();

    if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}

/// Link to the intermediate download host (`li.dowloads a`)
pub fn parse_download_page_link(html: &str) -> Result<String, ParseError> {
    let document = Html::parse_document(html);
    let link_selector = Selector::parse("li.dowloads a").unwrap();

    let link = document
        .select(&link_selector)
        .next()
        .ok_or(ParseError::MissingElement("li.dowloads a"))?;

    link.value()
        .attr("href")
        .map(qualify_url)
        .ok_or(ParseError::MissingAttribute {
            element: "li.dowloads a",
            attribute: "href",
        })
}

/// Download entries of the intermediate host (`div.dowload`)
///
/// No entries is not an error. An entry without a link is.
pub fn parse_download_host_entries(html: &str) -> Result<Vec<LabeledLink>, ParseError> {
    let document = Html::parse_document(html);

    let entry_selector = Selector::parse("div.dowload").unwrap();
    let link_selector = Selector::parse("a").unwrap();

    let mut entries = Vec::new();

    for entry in document.select(&entry_selector) {
        let link = entry
            .select(&link_selector)
            .next()
            .ok_or(ParseError::MissingElement("div.dowload a"))?;

        let url = link.value().attr("href").ok_or(ParseError::MissingAttribute {
            element: "div.dowload a",
            attribute: "href",
        })?;

        entries.push(LabeledLink {
            label: link.text().collect::<String>(),
            url: url.trim().to_string(),
        });
    }

    Ok(entries)
}

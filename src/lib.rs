//! Gogoanime Scraper Library
//!
//! This library scrapes gogoanime for search results, title metadata and
//! episode download/stream links, and exposes the same operations through
//! REST API endpoints.

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod normalizer;
pub mod pagination;
pub mod parser;
pub mod resolver;
pub mod routes;
pub mod scraper;

pub use client::GogoClient;
pub use config::ClientConfig;
pub use error::{AppError, AppResult};
pub use models::{LinkSlot, MediaInfo, MediaLinkBundle, SearchResult};
pub use resolver::StrategyKind;

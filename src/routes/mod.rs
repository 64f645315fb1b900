//! API Routes module for the gogoanime scraper
//!
//! Thin HTTP handlers over `GogoClient`. Every handler validates its
//! parameters, calls one client operation and wraps the result in
//! `ApiResponse`; failures become `ApiError` bodies through `AppError`.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::info;
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::client::GogoClient;
use crate::constants::{genres, limits};
use crate::error::{AppError, AppResult};
use crate::models::{ApiError, ApiResponse, LinkSlot, MediaInfo, MediaLinkBundle, SearchResult};
use crate::resolver::StrategyKind;

/// Application state shared across handlers
pub struct AppState {
    pub client: GogoClient,
}

/// Query parameters for search endpoint
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SearchQuery {
    /// Search keyword
    pub q: Option<String>,
}

/// GET /api/search - Search for anime
///
/// Query parameter: q (required) - search keyword
#[utoipa::path(
    get,
    path = "/api/search",
    tag = "anime",
    params(SearchQuery),
    responses(
        (status = 200, description = "Search results retrieved successfully", body = Vec<SearchResult>),
        (status = 400, description = "Bad request - search query is required", body = ApiError),
        (status = 404, description = "No results for the query", body = ApiError),
        (status = 502, description = "Site unreachable", body = ApiError)
    )
)]
pub async fn search_anime(
    data: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let keyword = match &query.q {
        Some(q) if !q.trim().is_empty() => q.trim(),
        _ => return Err(AppError::validation("Search query is required")),
    };

    let results = data.client.search_anime(keyword).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(results)))
}

/// GET /api/anime/{anime_id} - Title metadata
#[utoipa::path(
    get,
    path = "/api/anime/{anime_id}",
    tag = "anime",
    params(
        ("anime_id" = String, Path, description = "Anime id as used in the site's URLs, e.g. clannad-dub")
    ),
    responses(
        (status = 200, description = "Anime details retrieved successfully", body = MediaInfo),
        (status = 404, description = "Anime not found", body = ApiError),
        (status = 502, description = "Site unreachable", body = ApiError)
    )
)]
pub async fn get_anime_details(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let anime_id = path.into_inner();
    let info = data.client.get_details(&anime_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(info)))
}

/// Query parameters for episode endpoint
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EpisodeQuery {
    /// Resolution strategy (default: basic)
    pub strategy: Option<StrategyKind>,
}

/// GET /api/episode/{anime_id}/{episode_num} - Download and stream links
///
/// `strategy=advanced` uses the configured session tokens; `basic` needs none.
#[utoipa::path(
    get,
    path = "/api/episode/{anime_id}/{episode_num}",
    tag = "anime",
    params(
        ("anime_id" = String, Path, description = "Anime id"),
        ("episode_num" = u32, Path, description = "Episode number"),
        EpisodeQuery
    ),
    responses(
        (status = 200, description = "Episode links resolved", body = MediaLinkBundle),
        (status = 401, description = "Session tokens rejected", body = ApiError),
        (status = 404, description = "Anime or episode not found", body = ApiError),
        (status = 502, description = "Site unreachable or unreadable", body = ApiError)
    )
)]
pub async fn get_episode_links(
    data: web::Data<AppState>,
    path: web::Path<(String, u32)>,
    query: web::Query<EpisodeQuery>,
) -> AppResult<HttpResponse> {
    let (anime_id, episode_num) = path.into_inner();
    let strategy = query.strategy.unwrap_or_default();

    info!(
        "Episode links requested: {} episode {} ({:?})",
        anime_id, episode_num, strategy
    );

    let bundle = data.client.resolve(strategy, &anime_id, episode_num).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(bundle)))
}

/// Query parameters for genre endpoint
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct GenreQuery {
    /// Maximum number of results (default: 60)
    pub limit: Option<usize>,
}

/// GET /api/genre/{genre_name} - Titles of a genre, across pages
#[utoipa::path(
    get,
    path = "/api/genre/{genre_name}",
    tag = "anime",
    params(
        ("genre_name" = String, Path, description = "Genre name, e.g. romance"),
        GenreQuery
    ),
    responses(
        (status = 200, description = "Genre listing retrieved successfully", body = Vec<SearchResult>),
        (status = 400, description = "Bad request - limit must be positive", body = ApiError),
        (status = 404, description = "Unknown genre", body = ApiError),
        (status = 502, description = "Site unreachable", body = ApiError)
    )
)]
pub async fn get_by_genre(
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<GenreQuery>,
) -> AppResult<HttpResponse> {
    let genre_name = path.into_inner();
    let limit = query.limit.unwrap_or(limits::DEFAULT_GENRE_LIMIT);
    if limit == 0 {
        return Err(AppError::validation("limit must be greater than 0"));
    }

    let results = data.client.get_by_genre(&genre_name, limit).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(results)))
}

/// GET /api/genres - Genre names the site is known to list
#[utoipa::path(
    get,
    path = "/api/genres",
    tag = "anime",
    responses(
        (status = 200, description = "Known genre names", body = Vec<String>)
    )
)]
pub async fn list_genres() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::new(genres::KNOWN))
}

/// Query parameters for airing endpoint
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AiringQuery {
    /// Number of titles (default: 10, must be below 20)
    pub count: Option<usize>,
}

/// GET /api/airing - Currently airing titles
#[utoipa::path(
    get,
    path = "/api/airing",
    tag = "anime",
    params(AiringQuery),
    responses(
        (status = 200, description = "Airing titles retrieved successfully", body = Vec<SearchResult>),
        (status = 400, description = "Bad request - count out of range", body = ApiError),
        (status = 502, description = "Site unreachable or no airing list", body = ApiError)
    )
)]
pub async fn get_airing(
    data: web::Data<AppState>,
    query: web::Query<AiringQuery>,
) -> AppResult<HttpResponse> {
    let count = query.count.unwrap_or(limits::DEFAULT_AIRING_COUNT);
    let airing = data.client.get_airing(count).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(airing)))
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gogoanime Scraper API",
        version = "0.1.0",
        description = "Search, metadata and episode link resolution for gogoanime",
        license(
            name = "MIT"
        )
    ),
    paths(
        search_anime,
        get_anime_details,
        get_episode_links,
        get_by_genre,
        list_genres,
        get_airing
    ),
    components(
        schemas(
            SearchResult,
            MediaInfo,
            LinkSlot,
            MediaLinkBundle,
            StrategyKind,
            ApiError,
            SearchQuery,
            EpisodeQuery,
            GenreQuery,
            AiringQuery
        )
    ),
    tags(
        (name = "anime", description = "Anime data endpoints")
    )
)]
pub struct ApiDoc;

/// Configure API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/search", web::get().to(search_anime))
            .route("/anime/{anime_id}", web::get().to(get_anime_details))
            .route(
                "/episode/{anime_id}/{episode_num}",
                web::get().to(get_episode_links),
            )
            .route("/genre/{genre_name}", web::get().to(get_by_genre))
            .route("/genres", web::get().to(list_genres))
            .route("/airing", web::get().to(get_airing)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use actix_web::{http::StatusCode, test, App};

    // Nothing listens here; tests below must fail before any fetch
    const UNREACHABLE: &str = "http://127.0.0.1:9/";

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState {
            client: GogoClient::new(ClientConfig::new("gogo", "auth").with_base_url(UNREACHABLE)),
        })
    }

    #[actix_web::test]
    async fn test_search_requires_query() {
        let app =
            test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

        let req = test::TestRequest::get().uri("/api/search?q=%20%20").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ApiError = test::read_body_json(resp).await;
        assert!(!body.success);
        assert_eq!(body.error, "Search query is required");
    }

    #[actix_web::test]
    async fn test_airing_count_out_of_range() {
        let app =
            test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

        let req = test::TestRequest::get().uri("/api/airing?count=25").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ApiError = test::read_body_json(resp).await;
        assert_eq!(body.error, "count parameter must be less than 20");
    }

    #[actix_web::test]
    async fn test_genre_limit_must_be_positive() {
        let app =
            test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

        let req = test::TestRequest::get()
            .uri("/api/genre/romance?limit=0")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_unknown_strategy_is_rejected() {
        let app =
            test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

        let req = test::TestRequest::get()
            .uri("/api/episode/clannad-dub/3?strategy=fastest")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_list_genres() {
        let app = test::init_service(App::new().configure(configure_routes)).await;

        let req = test::TestRequest::get().uri("/api/genres").to_request();
        let body: ApiResponse<Vec<String>> = test::call_and_read_body_json(&app, req).await;

        assert!(body.success);
        assert_eq!(body.data.len(), genres::KNOWN.len());
        assert!(body.data.iter().any(|g| g == "slice-of-life"));
    }

    #[::core::prelude::v1::test]
    fn test_openapi_lists_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        assert!(paths.iter().any(|p| p.as_str() == "/api/episode/{anime_id}/{episode_num}"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/genres"));
        assert_eq!(paths.len(), 6);
    }
}

//! Global error handling module for the gogoanime scraper
//!
//! This module provides the error taxonomy every client operation reports,
//! and converts it to HTTP responses with a consistent JSON structure.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ApiError;
use crate::scraper::ScraperError;

/// Application-wide error type. Every variant is terminal; nothing retries.
#[derive(Debug, Error)]
pub enum AppError {
    /// The transport could not reach the site
    #[error("Network error: {0}")]
    Network(#[from] ScraperError),

    /// Anime id or episode number does not resolve to the expected page
    #[error("Invalid animeid or episode_num: {0}")]
    InvalidIdentifier(String),

    /// Session tokens are missing, expired or malformed
    #[error("Invalid tokens passed")]
    InvalidToken,

    /// Genre listing has no recognizable result container
    #[error("Invalid genre name or page: {0}")]
    InvalidGenreOrPage(String),

    /// Search produced zero matches
    #[error("No search results found for the query: {0}")]
    EmptySearchResult(String),

    /// Airing listing count outside the accepted range
    #[error("Count {requested} out of range, must be less than {max}")]
    CountOutOfRange { requested: usize, max: usize },

    /// Airing page structure missing or empty
    #[error("No airing content found")]
    NoAiringContent,

    /// An intermediate page came back in a shape no strategy understands
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Validation errors (bad request)
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// Create an invalid identifier error
    pub fn invalid_identifier(msg: impl Into<String>) -> Self {
        AppError::InvalidIdentifier(msg.into())
    }

    /// Create a malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        AppError::MalformedResponse(msg.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation(_) | AppError::CountOutOfRange { .. } => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,

            // 404 Not Found
            AppError::InvalidIdentifier(_)
            | AppError::InvalidGenreOrPage(_)
            | AppError::EmptySearchResult(_) => StatusCode::NOT_FOUND,

            // 502 Bad Gateway - the site could not be reached or answered nonsense
            AppError::Network(_) | AppError::NoAiringContent | AppError::MalformedResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Network(scraper_err) => match scraper_err {
                ScraperError::NetworkError(_) => {
                    "Unable to connect to the Server, Check your connection".to_string()
                }
                ScraperError::HttpError(status) => {
                    format!("Server returned error status: {}", status)
                }
                ScraperError::ResponseError(msg) => format!("Failed to read response: {}", msg),
            },
            AppError::InvalidIdentifier(_) => "Invalid animeid or episode_num given".to_string(),
            AppError::InvalidToken => "Invalid tokens passed, Check your tokens".to_string(),
            AppError::InvalidGenreOrPage(_) => "Invalid genre_name or page_num".to_string(),
            AppError::EmptySearchResult(_) => {
                "No Search Results found for the query".to_string()
            }
            AppError::CountOutOfRange { max, .. } => {
                format!("count parameter must be less than {}", max)
            }
            AppError::NoAiringContent => "No content found on the given page".to_string(),
            AppError::MalformedResponse(_) => {
                "The site returned a page that could not be understood".to_string()
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_response = ApiError::new(self.user_message());

        HttpResponse::build(status).json(error_response)
    }
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_status_code() {
        let error = AppError::validation("Invalid input");
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_count_out_of_range_status_code() {
        let error = AppError::CountOutOfRange {
            requested: 25,
            max: 20,
        };
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(error.user_message(), "count parameter must be less than 20");
    }

    #[test]
    fn test_not_found_status_codes() {
        assert_eq!(
            AppError::invalid_identifier("naruto-episode-9999").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InvalidGenreOrPage("nope".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::EmptySearchResult("zzz".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_invalid_token_unauthorized() {
        let error = AppError::InvalidToken;
        assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(error.user_message(), "Invalid tokens passed, Check your tokens");
    }

    #[test]
    fn test_upstream_errors_bad_gateway() {
        let error = AppError::Network(ScraperError::NetworkError("timeout".to_string()));
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);

        let error = AppError::Network(ScraperError::HttpError(503));
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);

        assert_eq!(AppError::NoAiringContent.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            AppError::malformed("div.dowload a").status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_network_error_user_messages() {
        let error = AppError::Network(ScraperError::NetworkError("connection refused".to_string()));
        assert!(error.user_message().contains("Unable to connect"));

        let error = AppError::Network(ScraperError::HttpError(500));
        assert!(error.user_message().contains("500"));
    }

    #[test]
    fn test_error_display() {
        let error = AppError::validation("test error");
        assert_eq!(format!("{}", error), "Validation error: test error");

        let error = AppError::EmptySearchResult("clannad".to_string());
        assert_eq!(
            format!("{}", error),
            "No search results found for the query: clannad"
        );
    }

    #[test]
    fn test_from_scraper_error() {
        let scraper_err = ScraperError::NetworkError("timeout".to_string());
        let app_err: AppError = scraper_err.into();
        assert!(matches!(app_err, AppError::Network(_)));
    }

    #[test]
    fn test_error_response_body() {
        let response = AppError::InvalidToken.error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

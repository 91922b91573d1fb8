//! Request-global scrape failures and their HTTP mapping.
//!
//! Only failures that abort the whole request live here. Rows the extractor
//! cannot parse are skipped and logged, never turned into errors.

use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The headless engine failed to start (missing binary, sandbox
    /// restrictions).
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// The target page did not reach the required DOM state within the
    /// navigation bound.
    #[error("navigation to {url} timed out after {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    /// Navigation failed for a non-timeout reason (DNS, connection refused,
    /// CDP error mid-flight).
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// The DOM loaded but the marker row never appeared within its bound:
    /// the page structure changed or the site blocked the session.
    #[error("marker element `{selector}` did not appear within {timeout_ms}ms")]
    SelectorTimeout { selector: String, timeout_ms: u64 },

    /// Post-navigation session failure: document retrieval, user-agent
    /// override, extraction task join.
    #[error("browser session error: {0}")]
    Session(String),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Body of the 500 response when a scrape aborts.
#[derive(Debug, Serialize)]
pub struct ScrapeErrorBody {
    pub message: &'static str,
    pub error: String,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

impl IntoResponse for ScrapeError {
    fn into_response(self) -> axum::response::Response {
        let body = ScrapeErrorBody {
            message: "Error during scraping",
            error: self.to_string(),
            success: false,
            timestamp: Utc::now(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

//! One fetch-and-parse cycle per request.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Result, ScrapeError};
use crate::extraction::odds::{self, OddsEntry};
use crate::renderer::{RenderContext, Renderer};

/// Everything one scrape produced, in page order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsSnapshot {
    /// Always equals `entries.len()`.
    pub count: usize,
    pub entries: Vec<OddsEntry>,
    /// When the snapshot was taken, UTC.
    pub timestamp: DateTime<Utc>,
    pub success: bool,
}

/// Drives one isolated browser session per snapshot.
#[derive(Clone)]
pub struct OddsScraper {
    renderer: Arc<dyn Renderer>,
    odds_url: String,
    nav_timeout_ms: u64,
    selector_timeout_ms: u64,
}

impl OddsScraper {
    pub fn new(renderer: Arc<dyn Renderer>, cfg: &Config) -> Self {
        Self {
            renderer,
            odds_url: cfg.odds_url.clone(),
            nav_timeout_ms: cfg.nav_timeout_ms,
            selector_timeout_ms: cfg.selector_timeout_ms,
        }
    }

    /// Take one snapshot of the odds page.
    ///
    /// The browser session is released on every exit path, including
    /// timeouts and extraction failures, before the result propagates. A
    /// release failure is logged and never masks the scrape outcome.
    ///
    /// The scrape runs on its own task: if the caller stops waiting (an
    /// HTTP client disconnect drops the request future mid-await), the
    /// session is still driven to its release instead of being cancelled
    /// between acquire and close.
    pub async fn take_snapshot(&self) -> Result<OddsSnapshot> {
        let scraper = self.clone();
        let entries = match tokio::spawn(async move { scraper.scrape_once().await }).await {
            Ok(scraped) => scraped?,
            Err(e) => return Err(ScrapeError::Session(format!("scrape task failed: {e}"))),
        };
        Ok(OddsSnapshot {
            count: entries.len(),
            entries,
            timestamp: Utc::now(),
            success: true,
        })
    }

    async fn scrape_once(&self) -> Result<Vec<OddsEntry>> {
        let started = Instant::now();
        info!("scrape started for {}", self.odds_url);

        let mut context = self.renderer.new_context().await?;
        let scraped = self.drive(context.as_mut()).await;
        if let Err(e) = context.close().await {
            warn!("browser session release failed: {e}");
        }

        match scraped {
            Ok(entries) => {
                info!(
                    "scrape finished: {} entries in {:?}",
                    entries.len(),
                    started.elapsed()
                );
                Ok(entries)
            }
            Err(e) => {
                warn!("scrape failed after {:?}: {e}", started.elapsed());
                Err(e)
            }
        }
    }

    async fn drive(&self, context: &mut dyn RenderContext) -> Result<Vec<OddsEntry>> {
        context.navigate(&self.odds_url, self.nav_timeout_ms).await?;
        context
            .wait_for_selector(odds::ROW_SELECTOR, self.selector_timeout_ms)
            .await?;
        let html = context.content().await?;
        // Html is not Send, so parsing stays off the async workers.
        tokio::task::spawn_blocking(move || odds::parse_document(&html))
            .await
            .map_err(|e| ScrapeError::Session(format!("extraction task failed: {e}")))
    }
}

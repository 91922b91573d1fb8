//! Service configuration, environment-provided with typed defaults.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Page the scraper targets. Overridable via `ODDS_URL` (integration tests
/// point it at a local server).
pub const DEFAULT_ODDS_URL: &str = "https://eurovisionworld.com/odds/eurovision";

/// Realistic desktop Chrome user agent, sent instead of the headless
/// default to reduce anti-bot friction from the target site.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Bound on navigation reaching a constructed DOM.
pub const DEFAULT_NAV_TIMEOUT_MS: u64 = 35_000;

/// Bound on the odds-table marker row appearing after navigation.
pub const DEFAULT_SELECTOR_TIMEOUT_MS: u64 = 30_000;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen port (`PORT`), bound on all interfaces.
    pub port: u16,
    /// tracing env-filter directive (`LOG_LEVEL`).
    pub log_level: String,
    /// Target odds page (`ODDS_URL`).
    pub odds_url: String,
    /// Explicit Chromium executable (`CHROMIUM_PATH`); when unset the
    /// binary is resolved from `$PATH` and conventional locations.
    pub chromium_path: Option<PathBuf>,
    /// Navigation bound in milliseconds (`NAV_TIMEOUT_MS`).
    pub nav_timeout_ms: u64,
    /// Marker-row bound in milliseconds (`SELECTOR_TIMEOUT_MS`).
    pub selector_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any name → value lookup. Invalid values are errors, not
    /// silent fallbacks.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got {raw:?}"))?,
            None => DEFAULT_PORT,
        };

        let odds_url = lookup("ODDS_URL").unwrap_or_else(|| DEFAULT_ODDS_URL.to_string());
        url::Url::parse(&odds_url)
            .with_context(|| format!("ODDS_URL is not a valid URL: {odds_url:?}"))?;

        Ok(Self {
            port,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            odds_url,
            chromium_path: lookup("CHROMIUM_PATH").map(PathBuf::from),
            nav_timeout_ms: parse_ms(lookup("NAV_TIMEOUT_MS"), "NAV_TIMEOUT_MS", DEFAULT_NAV_TIMEOUT_MS)?,
            selector_timeout_ms: parse_ms(
                lookup("SELECTOR_TIMEOUT_MS"),
                "SELECTOR_TIMEOUT_MS",
                DEFAULT_SELECTOR_TIMEOUT_MS,
            )?,
        })
    }
}

fn parse_ms(raw: Option<String>, name: &str, default: u64) -> Result<u64> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{name} must be milliseconds as an integer, got {raw:?}")),
        None => Ok(default),
    }
}

//! Scrape orchestration.
//!
//! Glues the renderer seam to the extractor: one isolated browser session
//! per snapshot, navigate, wait for the odds table marker, pull the DOM,
//! parse. No snapshot is cached or diffed against a previous one.

pub mod scraper;

//! Live Eurovision betting-odds scraping service.
//!
//! A single HTTP endpoint drives one headless-browser fetch of the
//! eurovisionworld odds page, waits for the client-rendered table,
//! parses it into structured entries, and returns them as JSON. No state
//! survives a request: every call launches a fresh isolated browser
//! session and re-parses from scratch.

pub mod api;
pub mod config;
pub mod error;
pub mod extraction;
pub mod renderer;
pub mod scrape;

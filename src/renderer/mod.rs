//! Browser rendering seam.
//!
//! The scrape path talks to the headless engine through these traits, so
//! the orchestrator and the HTTP layer never touch CDP types and tests can
//! substitute a stub session. One render context is one isolated browser
//! process: acquired per request, never pooled, released before the
//! response is sent.

pub mod chromium;
pub mod locate;

use crate::error::Result;
use async_trait::async_trait;

/// Launches isolated render contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Start a fresh browser session. Every call launches a new OS-level
    /// process; nothing is shared with prior sessions.
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
}

/// One isolated headless-browser session.
#[async_trait]
pub trait RenderContext: Send {
    /// Navigate and wait until the DOM is constructed (not full
    /// resource/paint completion), bounded by `timeout_ms`.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<()>;

    /// Block until `selector` matches something in the page, under its own
    /// bound. This is the synchronization point proving dynamic content
    /// has rendered; DOM readiness alone does not guarantee it.
    async fn wait_for_selector(&mut self, selector: &str, timeout_ms: u64) -> Result<()>;

    /// Serialized DOM of the current page.
    async fn content(&mut self) -> Result<String>;

    /// Release the session and reap the underlying process. Must run on
    /// every exit path.
    async fn close(self: Box<Self>) -> Result<()>;
}

//! chromiumoxide-backed render contexts.
//!
//! One context owns one headless Chromium process plus the task draining
//! its CDP event stream. Navigation readiness is `document.readyState`
//! leaving `"loading"`, which corresponds to DOM construction rather than
//! full resource load; dynamic content is then awaited separately via
//! [`RenderContext::wait_for_selector`].

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{RenderContext, Renderer};
use crate::config;
use crate::error::{Result, ScrapeError};

/// Poll interval while waiting for DOM readiness or the marker element.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Extra headroom on the CDP transport beyond the navigation bound, so the
/// transport never gives up before our own deadline does.
const REQUEST_TIMEOUT_HEADROOM_MS: u64 = 5_000;

/// Launches a fresh headless Chromium process per context.
pub struct ChromiumRenderer {
    executable: PathBuf,
    nav_timeout_ms: u64,
}

impl ChromiumRenderer {
    /// `executable` should come from [`super::locate::find_chromium`];
    /// `nav_timeout_ms` sizes the CDP transport timeout.
    pub fn new(executable: PathBuf, nav_timeout_ms: u64) -> Self {
        Self {
            executable,
            nav_timeout_ms,
        }
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let browser_config = BrowserConfig::builder()
            .chrome_executable(self.executable.clone())
            // Required when running as root inside a container; matches
            // the flags the production deployment always ran with.
            .args(["--no-sandbox", "--disable-setuid-sandbox"])
            .request_timeout(Duration::from_millis(
                self.nav_timeout_ms + REQUEST_TIMEOUT_HEADROOM_MS,
            ))
            .build()
            .map_err(ScrapeError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScrapeError::BrowserLaunch(e.to_string()))?;

        // The CDP event stream must be drained for the session to make
        // progress; it ends when the browser goes away.
        let cdp_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let mut context = ChromiumContext {
            browser,
            cdp_task,
            page: None,
        };
        if let Err(e) = context.prepare().await {
            // Launched but unusable; reap the process before reporting.
            if let Err(close_err) = Box::new(context).close().await {
                warn!("discarding unusable browser session failed: {close_err}");
            }
            return Err(e);
        }
        Ok(Box::new(context))
    }
}

/// A live Chromium session with one open page.
pub struct ChromiumContext {
    browser: Browser,
    cdp_task: JoinHandle<()>,
    page: Option<Page>,
}

impl ChromiumContext {
    async fn prepare(&mut self) -> Result<()> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::BrowserLaunch(format!("opening page: {e}")))?;
        page.set_user_agent(SetUserAgentOverrideParams::new(config::USER_AGENT))
            .await
            .map_err(|e| ScrapeError::Session(format!("overriding user agent: {e}")))?;
        self.page = Some(page);
        Ok(())
    }

    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| ScrapeError::Session("no page in session".to_string()))
    }
}

/// One readiness check: `true` once `document.readyState` reports the DOM
/// is past `"loading"`. A failed evaluation (the execution context can be
/// torn down by a redirect between polls) counts as not-ready rather than
/// aborting the navigation; the bound decides when to give up.
async fn dom_constructed(page: &Page) -> bool {
    match page.evaluate("document.readyState").await {
        Ok(eval) => matches!(
            eval.into_value::<String>(),
            Ok(state) if state != "loading"
        ),
        Err(e) => {
            debug!("readyState check failed: {e}");
            false
        }
    }
}

/// Run `check` every [`POLL_INTERVAL`] until it reports ready, bounded by
/// `bound`. The bound is the only authority on giving up: it preempts even
/// a check that hangs, so one stuck CDP round-trip cannot stretch the wait
/// past its budget.
async fn poll_ready<F, Fut>(bound: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    tokio::time::timeout(bound, async {
        loop {
            if check().await {
                return;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    })
    .await
    .is_ok()
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<()> {
        let page = self.page()?;
        let bounded = tokio::time::timeout(Duration::from_millis(timeout_ms), async {
            page.goto(url).await.map_err(|e| ScrapeError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
            // goto resolves once navigation commits; now wait for the DOM
            // to finish constructing.
            loop {
                if dom_constructed(page).await {
                    debug!("DOM constructed for {url}");
                    return Ok(());
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        })
        .await;

        match bounded {
            Ok(result) => result,
            Err(_) => Err(ScrapeError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms,
            }),
        }
    }

    async fn wait_for_selector(&mut self, selector: &str, timeout_ms: u64) -> Result<()> {
        let page = self.page()?;
        let appeared = poll_ready(Duration::from_millis(timeout_ms), || async move {
            page.find_element(selector).await.is_ok()
        })
        .await;
        if appeared {
            Ok(())
        } else {
            Err(ScrapeError::SelectorTimeout {
                selector: selector.to_string(),
                timeout_ms,
            })
        }
    }

    async fn content(&mut self) -> Result<String> {
        self.page()?
            .content()
            .await
            .map_err(|e| ScrapeError::Session(format!("retrieving document: {e}")))
    }

    async fn close(mut self: Box<Self>) -> Result<()> {
        // Close politely, then make sure the OS process is really gone;
        // leaking one Chromium per request would sink the host.
        match self.browser.close().await {
            Ok(_) => {
                if let Err(e) = self.browser.wait().await {
                    warn!("waiting for browser exit: {e}");
                }
            }
            Err(e) => {
                warn!("browser close failed, killing the process: {e}");
                let _ = self.browser.kill().await;
            }
        }
        self.cdp_task.abort();
        Ok(())
    }
}

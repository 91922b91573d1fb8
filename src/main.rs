use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use eurovision_odds::api::routes::{router, ApiState};
use eurovision_odds::config::Config;
use eurovision_odds::renderer::chromium::ChromiumRenderer;
use eurovision_odds::renderer::locate;
use eurovision_odds::scrape::scraper::OddsScraper;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // Startup precondition: resolve the browser before accepting traffic,
    // so a broken install surfaces here and not on the first request.
    let executable = locate::find_chromium(cfg.chromium_path.as_deref())
        .context("browser preflight failed")?;
    info!("using Chromium at {}", executable.display());

    let renderer = Arc::new(ChromiumRenderer::new(executable, cfg.nav_timeout_ms));
    let scraper = Arc::new(OddsScraper::new(renderer, &cfg));
    let app = router(ApiState { scraper });

    let bind_addr = format!("0.0.0.0:{}", cfg.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    info!("listening on {bind_addr}, scraping {}", cfg.odds_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await
}

async fn wait_for_shutdown<F>(signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("received shutdown signal"),
        Err(e) => {
            // Without a handler ctrl-c can never be observed; keep serving
            // rather than draining a server that just came up.
            error!("failed to install shutdown signal handler: {e}");
            std::future::pending::<()>().await;
        }
    }
}

//! Command entry points behind the CLI

use anyhow::{Context, Result, bail};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::browser_setup::BrowserSession;
use crate::cli::{CrawlArgs, ServeArgs};
use crate::config::CrawlerConfig;
use crate::content_saver::{ImageSaver, export_posts, export_timestamp, save_logs};
use crate::control::{CrawlController, serve as serve_http};
use crate::crawl_engine::CrawlOrchestrator;
use crate::crawl_events::{CrawlEvent, CrawlEventBus};
use crate::tab::{ChromiumTab, TabDriver};
use crate::utils::constants::WP_ADMIN_MARKER;

fn orchestrator_for(config: &CrawlerConfig) -> CrawlOrchestrator {
    CrawlOrchestrator::new(
        CrawlEventBus::new(config.event_capacity()),
        config.navigation_timing(),
    )
}

/// Serve the control API until ctrl-c, then release the browser
pub async fn serve(args: ServeArgs) -> Result<()> {
    let config = args.config()?;
    let session = Arc::new(BrowserSession::open(&config).await?);
    if let Some(url) = config.admin_url() {
        session.open_tab(url).await?;
    }

    let controller = CrawlController::new(orchestrator_for(&config), session.clone());
    let served = serve_http(config.listen_addr(), controller.clone()).await;

    controller.orchestrator().stop();
    controller.orchestrator().wait_until_idle().await;
    drop(controller);
    match Arc::try_unwrap(session) {
        Ok(session) => session.close().await?,
        Err(_) => log::warn!("Browser session still in use at shutdown"),
    }
    served
}

async fn admin_tab(session: &BrowserSession, config: &CrawlerConfig) -> Result<ChromiumTab> {
    let tab = match config.admin_url() {
        Some(url) => session.open_tab(url).await?,
        None => session
            .find_admin_tab()
            .await?
            .context("No open tab shows a WordPress admin page; pass --admin-url")?,
    };

    let url = tab.current_url().await?;
    if !url.contains(WP_ADMIN_MARKER) {
        bail!("Tab is on {url}, not a WordPress admin page; log in and retry");
    }
    Ok(tab)
}

/// One crawl: start, follow progress, export, release the browser
pub async fn crawl(args: CrawlArgs) -> Result<()> {
    let config = args.config()?;
    let settings = args.settings();
    settings.validate()?;

    let session = BrowserSession::open(&config).await?;
    let outcome = crawl_with_session(&session, &config, &args).await;
    session.close().await?;
    outcome
}

async fn crawl_with_session(session: &BrowserSession, config: &CrawlerConfig, args: &CrawlArgs) -> Result<()> {
    let tab = admin_tab(session, config).await?;
    let orchestrator = orchestrator_for(config);
    let mut events = orchestrator.subscribe();

    let run_id = orchestrator
        .try_start(args.settings(), Arc::new(tab))
        .context("Crawl was not started")?;
    log::info!("Crawl {run_id} started");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(CrawlEvent::Progress { current, total, post, .. }) => {
                    log::info!("[{current}/{total}] {}", post.title);
                }
                Ok(event) if event.is_terminal() => break,
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => {
                    log::debug!("Missed {missed} crawl notifications");
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                log::warn!("Interrupted, stopping crawl");
                orchestrator.stop();
            }
        }
    }
    orchestrator.wait_until_idle().await;

    let state = orchestrator.get_state();
    let output_dir = config.output_dir();
    let written = export_posts(output_dir, &state.posts, &args.format).await?;
    for path in &written {
        log::info!("Wrote {}", path.display());
    }
    save_logs(output_dir, &state.logs, export_timestamp()).await?;

    if let Some(layout) = args.images {
        let report = ImageSaver::from_config(config)?.save(&state.posts, layout).await?;
        log::info!(
            "Images: {} downloaded, {} failed",
            report.downloaded,
            report.failed
        );
    }

    if let Some(error) = state.error {
        bail!("Crawl failed: {error}");
    }
    log::info!(
        "Crawled {} posts ({} with full details)",
        state.posts.len(),
        state.enriched_posts
    );
    Ok(())
}

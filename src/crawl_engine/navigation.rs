//! Navigation controller
//!
//! Drives the tab to a URL and waits for its load event, bounded by a
//! deadline. Reaching the deadline is not an error: admin pages that keep
//! long-polling connections open may never fire `load` in time.

use anyhow::{Context, Result};
use futures::StreamExt;
use std::time::Duration;

use crate::tab::TabDriver;
use crate::utils::constants::{DEFAULT_PAGE_LOAD_TIMEOUT_MS, DEFAULT_SETTLE_DELAY_MS};

/// How the wait for a page load ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Loaded,
    TimedOut,
}

/// Load wait and settle delay applied to every detailed visit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationTiming {
    pub load_timeout: Duration,
    pub settle_delay: Duration,
}

impl Default for NavigationTiming {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_millis(DEFAULT_PAGE_LOAD_TIMEOUT_MS),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
        }
    }
}

/// Navigate `tab` to `url` and wait for load completion or `timeout`.
///
/// The listener is registered before navigating so a fast load cannot be
/// missed, and it is dropped on every path out of this function.
///
/// # Errors
/// Only when the listener cannot be registered or the navigation cannot be
/// issued. Both `Loaded` and `TimedOut` are successes.
pub async fn navigate_and_wait(
    tab: &dyn TabDriver,
    url: &str,
    timeout: Duration,
) -> Result<NavigationOutcome> {
    let mut listener = tab
        .subscribe_load()
        .await
        .context("Failed to listen for page load")?;

    tab.navigate(url).await?;

    let outcome = match tokio::time::timeout(timeout, listener.next()).await {
        Ok(Some(())) => NavigationOutcome::Loaded,
        Ok(None) => {
            // The tab went away; extraction will report what is left.
            log::debug!("Load listener closed before {url} finished loading");
            NavigationOutcome::TimedOut
        }
        Err(_) => {
            log::debug!(
                "No load event for {url} within {} ms, continuing",
                timeout.as_millis()
            );
            NavigationOutcome::TimedOut
        }
    };
    drop(listener);

    Ok(outcome)
}

/// Give the editor scripts time to initialise after `load`
pub async fn settle(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

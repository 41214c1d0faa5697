use anyhow::{Context, Result};
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use chromiumoxide::handler::Handler;
use futures::StreamExt;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info, trace, warn};

use crate::config::CrawlerConfig;
use crate::tab::ChromiumTab;
use crate::utils::constants::{CHROME_USER_AGENT, WP_ADMIN_MARKER};

/// Find Chrome/Chromium executable on the system with platform-specific search paths.
pub async fn find_browser_executable() -> Result<PathBuf> {
    // Environment override wins over every search path
    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Using browser from CHROMIUM_PATH: {}", path.display());
            return Ok(path);
        }
        warn!(
            "CHROMIUM_PATH points to a missing file: {}",
            path.display()
        );
    }

    let candidates: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ]
    };

    for candidate in candidates {
        let path = match candidate.strip_prefix("~/") {
            Some(rest) => match dirs::home_dir() {
                Some(home) => home.join(rest),
                None => continue,
            },
            None => PathBuf::from(candidate),
        };
        if path.exists() {
            info!("Found browser at: {}", path.display());
            return Ok(path);
        }
    }

    if !cfg!(target_os = "windows") {
        for cmd in ["chromium", "chromium-browser", "google-chrome", "chrome"] {
            if let Ok(output) = Command::new("which").arg(cmd).output()
                && output.status.success()
            {
                let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !found.is_empty() {
                    info!("Found browser using 'which': {found}");
                    return Ok(PathBuf::from(found));
                }
            }
        }
    }

    warn!("No Chrome/Chromium executable found");
    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

/// Download a managed Chromium into the user cache directory.
pub async fn download_managed_browser() -> Result<PathBuf> {
    info!("Downloading managed Chromium browser...");

    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("wp-post-crawler")
        .join("chromium");
    std::fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );
    let revision = fetcher.fetch().await.context("Failed to fetch browser")?;

    info!("Downloaded Chromium to: {}", revision.folder_path.display());
    Ok(revision.executable_path)
}

/// Drive the CDP connection until the browser goes away
fn spawn_handler(mut handler: Handler) -> JoinHandle<()> {
    task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let message = e.to_string();
                // chromiumoxide cannot decode every CDP event Chrome emits
                let benign = message.contains("data did not match any variant of untagged enum Message")
                    || message.contains("Failed to deserialize WS response");
                if benign {
                    trace!("Suppressed benign CDP error: {message}");
                } else {
                    error!("Browser handler error: {e:?}");
                }
            }
        }
        info!("Browser handler task completed");
    })
}

/// A Chrome instance plus the task that pumps its DevTools connection.
///
/// The handler is aborted when the session is dropped. A launched browser
/// keeps its profile directory so the WordPress login survives restarts.
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
    attached: bool,
}

impl BrowserSession {
    /// Attach to a running browser when `connect_url` is configured,
    /// otherwise launch one.
    pub async fn open(config: &CrawlerConfig) -> Result<Self> {
        match config.connect_url() {
            Some(url) => Self::connect(url).await,
            None => Self::launch(config).await,
        }
    }

    /// Launch Chrome with a persistent profile
    pub async fn launch(config: &CrawlerConfig) -> Result<Self> {
        let chrome_path = match find_browser_executable().await {
            Ok(path) => path,
            Err(_) => download_managed_browser().await?,
        };

        let user_data_dir = config.chrome_data_dir();
        std::fs::create_dir_all(&user_data_dir).context("Failed to create user data directory")?;

        let mut builder = BrowserConfigBuilder::default()
            .request_timeout(Duration::from_secs(30))
            .window_size(1440, 1000)
            .user_data_dir(user_data_dir.clone())
            .chrome_executable(chrome_path);

        builder = if config.headless() {
            builder.headless_mode(HeadlessMode::default())
        } else {
            builder.with_head()
        };

        builder = builder
            .arg(format!("--user-agent={CHROME_USER_AGENT}"))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-notifications")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--password-store=basic")
            .arg("--use-mock-keychain");

        let browser_config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

        info!("Launching browser with profile {}", user_data_dir.display());
        let (browser, handler) = Browser::launch(browser_config)
            .await
            .context("Failed to launch browser")?;

        Ok(Self {
            browser,
            handler: spawn_handler(handler),
            user_data_dir: Some(user_data_dir),
            attached: false,
        })
    }

    /// Attach to a browser started with `--remote-debugging-port`
    pub async fn connect(ws_url: &str) -> Result<Self> {
        info!("Connecting to browser at {ws_url}");
        let (mut browser, handler) = Browser::connect(ws_url)
            .await
            .with_context(|| format!("Failed to connect to browser at {ws_url}"))?;
        let handler = spawn_handler(handler);

        // Existing tabs are only known after target discovery
        let targets = browser
            .fetch_targets()
            .await
            .context("Failed to fetch browser targets")?;
        debug!("Attached browser reports {} targets", targets.len());

        Ok(Self {
            browser,
            handler,
            user_data_dir: None,
            attached: true,
        })
    }

    #[must_use]
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    #[must_use]
    pub fn user_data_dir(&self) -> Option<&PathBuf> {
        self.user_data_dir.as_ref()
    }

    /// Every open page target
    pub async fn tabs(&self) -> Result<Vec<ChromiumTab>> {
        let pages = self.browser.pages().await.context("Failed to list tabs")?;
        Ok(pages.into_iter().map(ChromiumTab::new).collect())
    }

    /// Look a tab up by its DevTools target id
    pub async fn tab_by_id(&self, id: &str) -> Result<Option<ChromiumTab>> {
        Ok(self.tabs().await?.into_iter().find(|tab| tab.page().target_id().inner() == id))
    }

    /// First tab currently showing a WordPress admin page
    pub async fn find_admin_tab(&self) -> Result<Option<ChromiumTab>> {
        for tab in self.tabs().await? {
            let url = tab.page().url().await.ok().flatten().unwrap_or_default();
            if url.contains(WP_ADMIN_MARKER) {
                return Ok(Some(tab));
            }
        }
        Ok(None)
    }

    /// Open a new tab on `url` and wait for its first navigation
    pub async fn open_tab(&self, url: &str) -> Result<ChromiumTab> {
        let page: Page = self
            .browser
            .new_page(url)
            .await
            .with_context(|| format!("Failed to open tab for {url}"))?;
        Ok(ChromiumTab::new(page))
    }

    /// Close a launched browser; an attached one is only disconnected
    pub async fn close(mut self) -> Result<()> {
        if !self.attached {
            self.browser.close().await.context("Failed to close browser")?;
            let _ = self.browser.wait().await;
        }
        self.handler.abort();
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

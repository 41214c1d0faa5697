//! Core configuration type

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Process-level settings for the crawler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Directory receiving exports, logs and downloaded images.
    ///
    /// **INVARIANT:** absolute (normalised by the builder).
    pub(crate) output_dir: PathBuf,

    /// WordPress admin URL opened by the one-shot crawl command
    pub(crate) admin_url: Option<String>,

    /// DevTools websocket of an already running, logged-in Chrome.
    /// When unset a browser is launched.
    pub(crate) connect_url: Option<String>,

    /// Profile directory for a launched browser
    pub(crate) chrome_data_dir: Option<PathBuf>,
    pub(crate) headless: bool,

    /// How long a detailed visit waits for the load event.
    ///
    /// Default: 10 000 ms
    pub(crate) page_load_timeout_ms: Option<u64>,

    /// Wait after the load event before extracting.
    ///
    /// Default: 1 500 ms
    pub(crate) settle_delay_ms: Option<u64>,

    pub(crate) event_capacity: Option<usize>,

    /// Pause between image downloads. Default: 400 ms
    pub(crate) image_download_delay_ms: Option<u64>,
    pub(crate) image_request_timeout_secs: Option<u64>,

    /// Bind address of the control server
    pub(crate) listen_addr: Option<String>,
}

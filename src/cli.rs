use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::{CrawlerConfig, CrawlerConfigBuilder, WithOutputDir};
use crate::content_saver::{ExportFormat, ImageLayout};
use crate::crawl_engine::CrawlSettings;
use crate::utils::constants::{
    DEFAULT_EVENT_CAPACITY, DEFAULT_IMAGE_DOWNLOAD_DELAY_MS, DEFAULT_LISTEN_ADDR,
    DEFAULT_PAGE_LOAD_TIMEOUT_MS, DEFAULT_SETTLE_DELAY_MS,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Crawl posts out of a logged-in WordPress admin")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the HTTP control API over a browser session
    Serve(ServeArgs),
    /// Run one crawl against an admin posts page and export the result
    Crawl(CrawlArgs),
}

/// Browser and output options shared by every command
#[derive(Debug, Args)]
pub struct BrowserArgs {
    /// Output directory for exports, logs and images.
    #[arg(long, default_value = "wp-export")]
    pub out: PathBuf,

    /// DevTools websocket of an already running, logged-in browser.
    #[arg(long)]
    pub connect: Option<String>,

    /// Launch Chrome without a window.
    #[arg(long)]
    pub headless: bool,

    /// Chrome profile directory for a launched browser.
    #[arg(long)]
    pub chrome_data_dir: Option<PathBuf>,

    /// How long to wait for each post editor to load.
    #[arg(long, default_value_t = DEFAULT_PAGE_LOAD_TIMEOUT_MS)]
    pub page_load_timeout_ms: u64,

    /// Pause after the load event before reading the editor.
    #[arg(long, default_value_t = DEFAULT_SETTLE_DELAY_MS)]
    pub settle_delay_ms: u64,

    /// Buffered crawl notifications per observer.
    #[arg(long, default_value_t = DEFAULT_EVENT_CAPACITY)]
    pub event_capacity: usize,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub browser: BrowserArgs,

    /// Address the control API listens on.
    #[arg(long, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen: String,

    /// Open this admin URL in a new tab on startup.
    #[arg(long)]
    pub admin_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Published,
    Drafts,
    Pending,
    Scheduled,
}

#[derive(Debug, Args)]
pub struct CrawlArgs {
    #[command(flatten)]
    pub browser: BrowserArgs,

    /// Admin posts page to open. Without it the first open admin tab is used.
    #[arg(long)]
    pub admin_url: Option<String>,

    /// Post statuses to include.
    #[arg(long, value_enum, value_delimiter = ',', default_value = "published")]
    pub status: Vec<StatusArg>,

    /// Keep at most this many posts (0 keeps all).
    #[arg(long, default_value_t = 0)]
    pub limit: u32,

    /// Open every post's editor for full content.
    #[arg(long)]
    pub visit_pages: bool,

    /// Keep posts that carry a redirect.
    #[arg(long)]
    pub keep_redirects: bool,

    /// Strip `[shortcode]` markup from content.
    #[arg(long)]
    pub remove_shortcodes: bool,

    /// Export formats to write.
    #[arg(long, value_enum, value_delimiter = ',', default_value = "json")]
    pub format: Vec<ExportFormat>,

    /// Download post images in this layout.
    #[arg(long, value_enum)]
    pub images: Option<ImageLayout>,

    /// Pause before each image download.
    #[arg(long, default_value_t = DEFAULT_IMAGE_DOWNLOAD_DELAY_MS)]
    pub image_delay_ms: u64,
}

impl BrowserArgs {
    fn builder(&self) -> CrawlerConfigBuilder<WithOutputDir> {
        CrawlerConfig::builder()
            .connect_url(self.connect.clone())
            .headless(self.headless)
            .chrome_data_dir(self.chrome_data_dir.clone())
            .page_load_timeout_ms(self.page_load_timeout_ms)
            .settle_delay_ms(self.settle_delay_ms)
            .event_capacity(self.event_capacity)
            .output_dir(self.out.clone())
    }
}

impl ServeArgs {
    pub fn config(&self) -> anyhow::Result<CrawlerConfig> {
        let builder = self.browser.builder().listen_addr(self.listen.clone());
        match &self.admin_url {
            Some(url) => builder.admin_url(url.clone()).build(),
            None => builder.build(),
        }
    }
}

impl CrawlArgs {
    pub fn config(&self) -> anyhow::Result<CrawlerConfig> {
        let builder = self
            .browser
            .builder()
            .image_download_delay_ms(self.image_delay_ms);
        match &self.admin_url {
            Some(url) => builder.admin_url(url.clone()).build(),
            None => builder.build(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> CrawlSettings {
        CrawlSettings {
            include_published: self.status.contains(&StatusArg::Published),
            include_drafts: self.status.contains(&StatusArg::Drafts),
            include_pending: self.status.contains(&StatusArg::Pending),
            include_scheduled: self.status.contains(&StatusArg::Scheduled),
            limit: self.limit,
            skip_redirects: !self.keep_redirects,
            visit_pages: self.visit_pages,
            remove_shortcodes: self.remove_shortcodes,
        }
    }
}

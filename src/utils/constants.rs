//! Shared configuration constants for the post crawler
//!
//! Default values used by the config builder, the navigation controller
//! and the export renderer.

/// How long a detailed visit waits for the tab's load event: 10 seconds
///
/// A timeout is not a failure. The crawl proceeds to extraction against
/// whatever the tab managed to render.
pub const DEFAULT_PAGE_LOAD_TIMEOUT_MS: u64 = 10_000;

/// Settle delay after the load event: 1.5 seconds
///
/// The block editor and TinyMCE initialise after `load` fires. Extracting
/// earlier returns empty content.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1_500;

/// Event bus buffer: 256 notifications
///
/// A crawl emits one progress event per post plus one terminal event.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Pause between image downloads: 400 ms
pub const DEFAULT_IMAGE_DOWNLOAD_DELAY_MS: u64 = 400;

/// Per-request timeout for image downloads: 30 seconds
pub const DEFAULT_IMAGE_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default bind address of the control server
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:7878";

/// Excerpts used as a meta description fallback are cut to this many characters
pub const EXCERPT_META_CHARS: usize = 160;

/// Slugs derived from post titles keep at most this many characters
pub const MAX_SLUG_CHARS: usize = 50;

/// Marker that identifies a WordPress admin URL
pub const WP_ADMIN_MARKER: &str = "/wp-admin/";

/// Marker that identifies a single-post editor URL
pub const POST_EDITOR_MARKER: &str = "post.php";

/// Placeholder content carried by list-view stubs
pub const STUB_CONTENT: &str =
    "[Content not available in list view - visit individual post to crawl]";

/// Placeholder meta description carried by list-view stubs
pub const STUB_META_DESCRIPTION: &str = "[Meta description not available in list view]";

/// Chrome user agent used when launching a managed browser
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

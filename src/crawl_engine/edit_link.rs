//! Editor URL derivation for list-view stubs

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::page_extractor::PostRecord;
use crate::utils::constants::POST_EDITOR_MARKER;

/// Trailing `/<slug>/` of a pretty permalink
static TRAILING_SEGMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/[^/]+/$").expect("BUG: hardcoded trailing segment regex is invalid")
});

/// URL to open for a post's detailed visit.
///
/// Editor links and posts without an id are used as-is. A pretty permalink
/// has its trailing segment swapped for the `post.php` editor path; any
/// other URL falls back to the editor path on the same origin. Returns
/// `None` when the record carries no URL at all.
#[must_use]
pub fn derive_edit_url(post: &PostRecord) -> Option<String> {
    let url = post.url.trim();
    if url.is_empty() {
        return None;
    }

    let id = match post.id.as_deref() {
        Some(id) if !id.is_empty() && !url.contains(POST_EDITOR_MARKER) => id,
        _ => return Some(url.to_string()),
    };

    let editor_path = format!("/wp-admin/post.php?post={id}&action=edit");
    let parsed = Url::parse(url).ok();
    // A bare origin has no slug; the regex would eat the host instead
    let has_slug = parsed.as_ref().is_none_or(|u| u.path() != "/");
    if has_slug && TRAILING_SEGMENT_RE.is_match(url) {
        return Some(TRAILING_SEGMENT_RE.replace(url, editor_path.as_str()).into_owned());
    }

    match parsed.map(|base| base.join(&editor_path)) {
        Some(Ok(editor)) => Some(editor.to_string()),
        _ => Some(url.to_string()),
    }
}

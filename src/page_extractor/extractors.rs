//! Turn page snapshots into post records
//!
//! Each content source (post body, meta description, redirect target) is an
//! ordered list of candidates. The first candidate with a non-empty value wins.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use url::Url;

use super::schema::{ImageKind, ImageRef, PostRecord, PostStatus};
use super::snapshot::{AcfFieldSnapshot, EditorSnapshot, ListRow, PageSnapshot};
use crate::crawl_engine::CrawlSettings;
use crate::utils::constants::{EXCERPT_META_CHARS, STUB_CONTENT, STUB_META_DESCRIPTION};

/// `[shortcode]`, `[shortcode attr="value"]` and `[/shortcode]`
static SHORTCODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[/?\w+(?:\s+[^\]]*?)?\]").expect("BUG: hardcoded shortcode regex is invalid")
});

static IMG_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img").expect("BUG: hardcoded CSS selector 'img' is invalid"));

/// Result of running extraction against one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Posts(Vec<PostRecord>),
    Failed {
        message: String,
        stack: Option<String>,
    },
}

/// Where the post body is read from, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    BlockEditor,
    ClassicEditor,
    Textarea,
}

impl ContentSource {
    pub const CASCADE: [Self; 3] = [Self::BlockEditor, Self::ClassicEditor, Self::Textarea];

    fn read(self, editor: &EditorSnapshot) -> Option<&str> {
        match self {
            Self::BlockEditor => editor.block_editor_content.as_deref(),
            Self::ClassicEditor => editor.classic_editor_content.as_deref(),
            Self::Textarea => editor.textarea_content.as_deref(),
        }
    }
}

/// SEO plugin fields holding a meta description, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaSource {
    Yoast,
    RankMath,
    Aioseo,
    Excerpt,
}

impl MetaSource {
    pub const CASCADE: [Self; 4] = [Self::Yoast, Self::RankMath, Self::Aioseo, Self::Excerpt];

    fn read(self, editor: &EditorSnapshot) -> Option<&str> {
        match self {
            Self::Yoast => editor.yoast_meta.as_deref(),
            Self::RankMath => editor.rank_math_meta.as_deref(),
            Self::Aioseo => editor.aioseo_meta.as_deref(),
            Self::Excerpt => editor.excerpt.as_deref(),
        }
    }
}

/// Redirect plugins, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectSource {
    Yoast,
    RankMath,
    Simple301,
}

impl RedirectSource {
    pub const CASCADE: [Self; 3] = [Self::Yoast, Self::RankMath, Self::Simple301];

    fn read(self, editor: &EditorSnapshot) -> Option<&str> {
        match self {
            Self::Yoast => editor.yoast_redirect.as_deref(),
            Self::RankMath => editor.rank_math_redirect.as_deref(),
            Self::Simple301 => editor.simple301_redirect.as_deref(),
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Yoast => "Yoast SEO",
            Self::RankMath => "Rank Math",
            Self::Simple301 => "Simple 301",
        }
    }
}

/// First candidate whose value is present and non-empty
pub fn first_non_empty<'a, S: Copy>(
    cascade: &[S],
    read: impl Fn(S) -> Option<&'a str>,
) -> Option<(S, &'a str)> {
    cascade
        .iter()
        .find_map(|&source| read(source).filter(|v| !v.is_empty()).map(|v| (source, v)))
}

/// Run extraction against a snapshot.
///
/// List pages yield stubs filtered by status and capped by `limit`. Editor
/// pages yield exactly one detailed record regardless of the include flags.
#[must_use]
pub fn extract(snapshot: &PageSnapshot, settings: &CrawlSettings) -> ExtractionOutcome {
    match snapshot {
        PageSnapshot::List { rows, .. } => ExtractionOutcome::Posts(extract_list(rows, settings)),
        PageSnapshot::Single {
            page_url, editor, ..
        } => ExtractionOutcome::Posts(vec![extract_single(page_url, editor, settings)]),
        PageSnapshot::Error { message, stack } => ExtractionOutcome::Failed {
            message: message.clone(),
            stack: stack.clone(),
        },
    }
}

/// Build stub records from list rows
#[must_use]
pub fn extract_list(rows: &[ListRow], settings: &CrawlSettings) -> Vec<PostRecord> {
    let cap = settings.row_cap().unwrap_or(usize::MAX);

    rows.iter()
        .filter_map(|row| {
            let status = PostStatus::from_row_classes(row.classes.split_whitespace());
            settings.includes(status).then(|| stub_from_row(row, status))
        })
        .take(cap)
        .collect()
}

fn stub_from_row(row: &ListRow, status: PostStatus) -> PostRecord {
    PostRecord {
        id: non_empty(row.id.as_deref()),
        title: row.title.clone().unwrap_or_default(),
        content: STUB_CONTENT.to_string(),
        meta_description: STUB_META_DESCRIPTION.to_string(),
        images: Vec::new(),
        status,
        url: row.href.clone().unwrap_or_default(),
        date: row.date.clone().unwrap_or_default(),
        is_redirected: false,
        redirect_url: String::new(),
        custom_fields: BTreeMap::new(),
        needs_detailed_crawl: true,
    }
}

/// Build the detailed record for an editor page
#[must_use]
pub fn extract_single(page_url: &str, editor: &EditorSnapshot, settings: &CrawlSettings) -> PostRecord {
    let content = first_non_empty(&ContentSource::CASCADE, |s| s.read(editor))
        .map(|(_, v)| v.to_string())
        .unwrap_or_default();

    let meta_description = meta_description(editor);

    let redirect = first_non_empty(&RedirectSource::CASCADE, |s| s.read(editor));
    if let Some((source, target)) = redirect {
        log::debug!("Post redirects via {} to {}", source.label(), target);
    }

    let mut images = Vec::new();
    if let Some(featured) = editor.featured_image.as_ref() {
        images.push(ImageRef {
            url: featured.src.clone(),
            alt: featured.alt.clone(),
            title: "Featured Image".to_string(),
            kind: ImageKind::Featured,
        });
    }
    images.extend(extract_content_images(&content, page_url));

    let content = if settings.remove_shortcodes {
        remove_shortcodes(&content)
    } else {
        content
    };

    PostRecord {
        id: non_empty(editor.post_id.as_deref()),
        title: editor.title.clone().unwrap_or_default(),
        content,
        meta_description,
        images,
        status: editor
            .status
            .as_deref()
            .map_or(PostStatus::Unknown, PostStatus::from_editor_value),
        url: editor.permalink.clone().unwrap_or_default(),
        date: String::new(),
        is_redirected: redirect.is_some(),
        redirect_url: redirect.map(|(_, v)| v.to_string()).unwrap_or_default(),
        custom_fields: custom_fields(editor),
        needs_detailed_crawl: false,
    }
}

/// Meta description cascade; an excerpt fallback is cut to 160 characters
#[must_use]
pub fn meta_description(editor: &EditorSnapshot) -> String {
    match first_non_empty(&MetaSource::CASCADE, |s| s.read(editor)) {
        Some((MetaSource::Excerpt, excerpt)) => excerpt.chars().take(EXCERPT_META_CHARS).collect(),
        Some((_, value)) => value.to_string(),
        None => String::new(),
    }
}

/// Custom field values; within a field a later control overrides an earlier one
#[must_use]
pub fn custom_fields(editor: &EditorSnapshot) -> BTreeMap<String, String> {
    if !editor.acf_present {
        return BTreeMap::new();
    }
    editor
        .acf_fields
        .iter()
        .filter(|field| !field.name.is_empty())
        .filter_map(|field| acf_value(field).map(|v| (field.name.clone(), v.to_string())))
        .collect()
}

fn acf_value(field: &AcfFieldSnapshot) -> Option<&str> {
    field
        .image
        .as_deref()
        .or(field.checked.as_deref())
        .or(field.select.as_deref())
        .or(field.wysiwyg.as_deref())
        .or(field.text.as_deref())
}

/// Every `<img>` in the post body, resolved against the editor URL
#[must_use]
pub fn extract_content_images(content: &str, page_url: &str) -> Vec<ImageRef> {
    if content.is_empty() {
        return Vec::new();
    }
    let base = Url::parse(page_url).ok();
    let fragment = Html::parse_fragment(content);

    fragment
        .select(&IMG_SELECTOR)
        .filter_map(|img| {
            let src = img.value().attr("src")?.trim();
            if src.is_empty() {
                return None;
            }
            Some(ImageRef {
                url: resolve_url(base.as_ref(), src),
                alt: img.value().attr("alt").unwrap_or_default().to_string(),
                title: img.value().attr("title").unwrap_or_default().to_string(),
                kind: ImageKind::Content,
            })
        })
        .collect()
}

fn resolve_url(base: Option<&Url>, src: &str) -> String {
    match base.and_then(|b| b.join(src).ok()) {
        Some(url) => url.to_string(),
        None => src.to_string(),
    }
}

/// Strip WordPress shortcodes from post content
#[must_use]
pub fn remove_shortcodes(content: &str) -> String {
    SHORTCODE_RE.replace_all(content, "").into_owned()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

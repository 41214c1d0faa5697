//! Raw DOM captures returned by the in-page snapshot script
//!
//! The script only reads the DOM. Every decision about which candidate
//! wins, which rows are kept and how records are shaped is made in Rust by
//! [`super::extractors::extract`].

use serde::{Deserialize, Serialize};

/// What the snapshot script saw on the current admin page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum PageSnapshot {
    /// `edit.php` post list
    List {
        page_url: String,
        rows: Vec<ListRow>,
        #[serde(default)]
        notes: Vec<String>,
    },
    /// `post.php` single-post editor
    Single {
        page_url: String,
        editor: EditorSnapshot,
        #[serde(default)]
        notes: Vec<String>,
    },
    /// The script caught an exception while reading the page
    Error {
        message: String,
        #[serde(default)]
        stack: Option<String>,
    },
}

impl PageSnapshot {
    #[must_use]
    pub fn page_url(&self) -> Option<&str> {
        match self {
            Self::List { page_url, .. } | Self::Single { page_url, .. } => Some(page_url),
            Self::Error { .. } => None,
        }
    }

    /// Diagnostics the script collected while reading optional sources
    #[must_use]
    pub fn notes(&self) -> &[String] {
        match self {
            Self::List { notes, .. } | Self::Single { notes, .. } => notes,
            Self::Error { .. } => &[],
        }
    }
}

/// One `<tr>` of the admin post list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ListRow {
    /// Raw `class` attribute, e.g. `iedit type-post status-draft`
    pub classes: String,
    /// Value of the row's `post[]` checkbox
    pub id: Option<String>,
    pub title: Option<String>,
    pub href: Option<String>,
    pub date: Option<String>,
}

/// Image element as read from the editor chrome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RawImage {
    pub src: String,
    pub alt: String,
}

/// One `.acf-field` container and every control it holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AcfFieldSnapshot {
    pub name: String,
    pub text: Option<String>,
    pub wysiwyg: Option<String>,
    pub select: Option<String>,
    pub checked: Option<String>,
    pub image: Option<String>,
}

/// Values read from a single-post editor page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorSnapshot {
    pub post_id: Option<String>,
    pub title: Option<String>,

    pub block_editor_content: Option<String>,
    pub classic_editor_content: Option<String>,
    pub textarea_content: Option<String>,

    pub yoast_meta: Option<String>,
    pub rank_math_meta: Option<String>,
    pub aioseo_meta: Option<String>,
    pub excerpt: Option<String>,

    pub yoast_redirect: Option<String>,
    pub rank_math_redirect: Option<String>,
    pub simple301_redirect: Option<String>,

    pub status: Option<String>,
    pub permalink: Option<String>,
    pub featured_image: Option<RawImage>,

    /// Whether the ACF runtime is loaded on the page
    pub acf_present: bool,
    pub acf_fields: Vec<AcfFieldSnapshot>,
}

//! Post record types produced by extraction
//!
//! These are the records the orchestrator accumulates and the export
//! renderer writes out. JSON field names follow the admin's camelCase
//! convention so exported files stay compatible with existing tooling.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Publication status of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Publish,
    Draft,
    Pending,
    Future,
    Private,
    /// Editor status values outside the known set
    #[serde(other)]
    Unknown,
}

impl PostStatus {
    /// Classify a list row by its CSS classes.
    ///
    /// Rows without one of the `status-*` markers are published posts.
    #[must_use]
    pub fn from_row_classes<'a>(classes: impl IntoIterator<Item = &'a str>) -> Self {
        let mut status = Self::Publish;
        for class in classes {
            match class {
                "status-draft" => return Self::Draft,
                "status-pending" => status = Self::Pending,
                "status-future" if status == Self::Publish => status = Self::Future,
                _ => {}
            }
        }
        status
    }

    /// Parse the value of the editor's `#post_status` control
    #[must_use]
    pub fn from_editor_value(value: &str) -> Self {
        match value.trim() {
            "publish" => Self::Publish,
            "draft" | "auto-draft" => Self::Draft,
            "pending" => Self::Pending,
            "future" => Self::Future,
            "private" => Self::Private,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Publish => "publish",
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Future => "future",
            Self::Private => "private",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an image was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Featured,
    Content,
}

impl ImageKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::Content => "content",
        }
    }
}

/// An image referenced by a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ImageKind,
}

/// One post, either a list-view stub or a detailed editor record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    pub meta_description: String,
    /// Featured image first when present, then content images in document order
    pub images: Vec<ImageRef>,
    pub status: PostStatus,
    pub url: String,
    pub date: String,
    pub is_redirected: bool,
    pub redirect_url: String,
    /// Custom (ACF) field values keyed by field name
    #[serde(rename = "acfFields", alias = "customFields")]
    pub custom_fields: BTreeMap<String, String>,
    /// Only list-view stubs carry this flag
    #[serde(default)]
    pub needs_detailed_crawl: bool,
}

impl PostRecord {
    #[must_use]
    pub fn is_stub(&self) -> bool {
        self.needs_detailed_crawl
    }

    /// Identifier used in filenames: the post id, or the 1-based position
    #[must_use]
    pub fn file_id(&self, index: usize) -> String {
        match self.id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => (index + 1).to_string(),
        }
    }
}

//! Text guide listing where each post's images were saved

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;

/// One downloaded image inside a post folder
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestImage {
    pub filename: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub alt: String,
}

/// Images saved for one post
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub post_id: String,
    pub post_title: String,
    pub folder: String,
    pub images: Vec<ManifestImage>,
}

pub const MANIFEST_FILE_NAME: &str = "IMAGE-ORGANIZATION-GUIDE.txt";

const RULE: &str = "================================";

/// Render the organization guide for organized image downloads
#[must_use]
pub fn render_image_manifest(entries: &[ManifestEntry], generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(out, "WordPress Post Images - Organization Guide");
    let _ = writeln!(out, "{RULE}\n");
    let _ = writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "Total Posts: {}\n", entries.len());

    let _ = writeln!(out, "IMAGE ORGANIZATION LIST");
    let _ = writeln!(out, "{RULE}\n");
    for (index, entry) in entries.iter().enumerate() {
        let _ = writeln!(out, "{}. POST: {} (ID: {})", index + 1, entry.post_title, entry.post_id);
        let _ = writeln!(out, "   Folder: {}", entry.folder);
        let _ = writeln!(out, "   Images ({}):", entry.images.len());
        for image in &entry.images {
            let _ = writeln!(out, "   - {} ({})", image.filename, image.kind);
            if !image.alt.is_empty() {
                let _ = writeln!(out, "     Alt: {}", image.alt);
            }
        }
        out.push('\n');
    }

    let _ = writeln!(out, "QUICK REFERENCE");
    let _ = writeln!(out, "{RULE}");
    for entry in entries {
        let _ = writeln!(out, "{}/ ({} images)", entry.folder, entry.images.len());
    }
    let _ = writeln!(out, "\n{RULE}");
    let _ = writeln!(out, "END OF GUIDE");
    out
}

//! Export renderer: JSON, CSV, crawl log and image downloads

mod csv_export;
mod image_saver;
mod json_export;
pub mod manifest;
pub mod naming;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use csv_export::{CSV_HEADERS, render_csv, save_csv_per_post, save_single_csv};
pub use image_saver::{ImageDownloadReport, ImageLayout, ImageSaver};
pub use json_export::{render_json, save_json, save_logs};
pub use manifest::{ManifestEntry, ManifestImage, render_image_manifest};
pub use naming::{export_timestamp, image_extension, sanitize_title};

use crate::page_extractor::PostRecord;

/// Post export format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    Json,
    Csv,
    /// One CSV file per post
    CsvPerPost,
}

/// Write `posts` in every requested format, returning the files written
pub async fn export_posts(
    output_dir: &Path,
    posts: &[PostRecord],
    formats: &[ExportFormat],
) -> Result<Vec<PathBuf>> {
    let timestamp = export_timestamp();
    let mut written = Vec::new();
    for format in formats {
        match format {
            ExportFormat::Json => written.push(save_json(output_dir, posts, timestamp).await?),
            ExportFormat::Csv => written.push(save_single_csv(output_dir, posts, timestamp).await?),
            ExportFormat::CsvPerPost => written.extend(save_csv_per_post(output_dir, posts).await?),
        }
    }
    Ok(written)
}

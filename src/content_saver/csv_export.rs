//! CSV rendering of crawled posts
//!
//! One row per post with the columns below. Custom fields collapse into a
//! single `key: value | key: value` cell and image URLs into a `|` list.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::json_export::write_file;
use super::naming::{post_csv_name, posts_csv_name};
use crate::page_extractor::PostRecord;

pub const CSV_HEADERS: [&str; 12] = [
    "ID",
    "Title",
    "Content",
    "Meta Description",
    "ACF Fields",
    "Status",
    "URL",
    "Date",
    "Is Redirected",
    "Redirect URL",
    "Image Count",
    "Image URLs",
];

fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn record_fields(post: &PostRecord) -> [String; 12] {
    let custom_fields = post
        .custom_fields
        .iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect::<Vec<_>>()
        .join(" | ");
    let image_urls = post
        .images
        .iter()
        .map(|image| image.url.as_str())
        .collect::<Vec<_>>()
        .join("|");

    [
        post.id.clone().unwrap_or_default(),
        post.title.clone(),
        post.content.clone(),
        post.meta_description.clone(),
        custom_fields,
        post.status.to_string(),
        post.url.clone(),
        post.date.clone(),
        post.is_redirected.to_string(),
        post.redirect_url.clone(),
        post.images.len().to_string(),
        image_urls,
    ]
}

fn render_rows<'a>(posts: impl IntoIterator<Item = &'a PostRecord>) -> Result<String> {
    let mut writer = csv_writer();
    writer
        .write_record(CSV_HEADERS)
        .context("Failed to write CSV header")?;
    for post in posts {
        writer
            .write_record(record_fields(post))
            .context("Failed to write CSV row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {e}"))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Header plus one row per post
pub fn render_csv(posts: &[PostRecord]) -> Result<String> {
    render_rows(posts)
}

/// Write every post into `wordpress-posts-<timestamp>.csv`
pub async fn save_single_csv(output_dir: &Path, posts: &[PostRecord], timestamp: i64) -> Result<PathBuf> {
    let path = output_dir.join(posts_csv_name(timestamp));
    write_file(&path, render_csv(posts)?).await?;
    log::info!("Saved {} posts to {}", posts.len(), path.display());
    Ok(path)
}

/// Write one `post-<id>-<slug>.csv` per post
pub async fn save_csv_per_post(output_dir: &Path, posts: &[PostRecord]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(posts.len());
    for (index, post) in posts.iter().enumerate() {
        let path = output_dir.join(post_csv_name(&post.file_id(index), &post.title));
        write_file(&path, render_rows([post])?).await?;
        paths.push(path);
    }
    log::info!("Saved {} per-post CSV files to {}", paths.len(), output_dir.display());
    Ok(paths)
}

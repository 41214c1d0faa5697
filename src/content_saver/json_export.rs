use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::naming::{logs_json_name, posts_json_name};
use crate::crawl_engine::LogEntry;
use crate::page_extractor::PostRecord;

/// Pretty-printed JSON array of posts
pub fn render_json(posts: &[PostRecord]) -> Result<String> {
    serde_json::to_string_pretty(posts).context("Failed to serialize posts")
}

/// Write `wordpress-posts-<timestamp>.json` into `output_dir`
pub async fn save_json(output_dir: &Path, posts: &[PostRecord], timestamp: i64) -> Result<PathBuf> {
    let path = output_dir.join(posts_json_name(timestamp));
    write_file(&path, render_json(posts)?).await?;
    log::info!("Saved {} posts to {}", posts.len(), path.display());
    Ok(path)
}

/// Write the crawl log as `wp-crawler-logs-<timestamp>.json`
pub async fn save_logs(output_dir: &Path, logs: &[LogEntry], timestamp: i64) -> Result<PathBuf> {
    let path = output_dir.join(logs_json_name(timestamp));
    let json = serde_json::to_string_pretty(logs).context("Failed to serialize crawl log")?;
    write_file(&path, json).await?;
    log::info!("Saved {} log entries to {}", logs.len(), path.display());
    Ok(path)
}

pub(super) async fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

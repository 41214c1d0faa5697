//! Image downloads for crawled posts
//!
//! Two layouts are supported. `Organized` writes one folder per post plus a
//! text guide, `Flat` writes every unique image into the output directory.
//! Downloads run one at a time with a pause before each request.

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::json_export::write_file;
use super::manifest::{MANIFEST_FILE_NAME, ManifestEntry, ManifestImage, render_image_manifest};
use super::naming::{image_extension, post_folder_name, sanitize_title};
use crate::config::CrawlerConfig;
use crate::page_extractor::PostRecord;
use crate::utils::constants::CHROME_USER_AGENT;

/// Where downloaded images are placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImageLayout {
    /// `post-<id>-<slug>/<type>-<n>.<ext>` plus an organization guide
    #[default]
    Organized,
    /// `post-<id>-<type>-<n>.<ext>`, each URL downloaded once
    Flat,
}

/// Counts and paths of one download pass
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDownloadReport {
    pub downloaded: usize,
    pub failed: usize,
    pub files: Vec<PathBuf>,
    pub manifest: Option<PathBuf>,
}

struct PlannedImage {
    url: String,
    path: PathBuf,
}

pub struct ImageSaver {
    client: Client,
    output_dir: PathBuf,
    delay: Duration,
}

impl ImageSaver {
    pub fn new(output_dir: impl Into<PathBuf>, delay: Duration, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(CHROME_USER_AGENT)
            .timeout(request_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            output_dir: output_dir.into(),
            delay,
        })
    }

    pub fn from_config(config: &CrawlerConfig) -> Result<Self> {
        Self::new(
            config.output_dir().join("images"),
            config.image_download_delay(),
            config.image_request_timeout(),
        )
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub async fn save(&self, posts: &[PostRecord], layout: ImageLayout) -> Result<ImageDownloadReport> {
        match layout {
            ImageLayout::Organized => self.save_organized(posts).await,
            ImageLayout::Flat => self.save_flat(posts).await,
        }
    }

    /// One folder per post that has images, plus `IMAGE-ORGANIZATION-GUIDE.txt`
    pub async fn save_organized(&self, posts: &[PostRecord]) -> Result<ImageDownloadReport> {
        let mut report = ImageDownloadReport::default();
        let mut entries = Vec::new();

        for (index, post) in posts.iter().enumerate() {
            if post.images.is_empty() {
                continue;
            }
            let post_id = post.file_id(index);
            let folder = post_folder_name(&post_id, &post.title);
            let mut saved = Vec::new();

            for (img_index, image) in post.images.iter().enumerate() {
                let filename = format!(
                    "{}-{}.{}",
                    sanitize_title(image.kind.as_str()),
                    img_index + 1,
                    image_extension(&image.url)
                );
                let planned = PlannedImage {
                    url: image.url.clone(),
                    path: self.output_dir.join(&folder).join(&filename),
                };
                if self.download_counted(&planned, &mut report).await {
                    saved.push(ManifestImage {
                        filename,
                        url: image.url.clone(),
                        kind: image.kind.as_str().to_string(),
                        alt: image.alt.clone(),
                    });
                }
            }

            if !saved.is_empty() {
                entries.push(ManifestEntry {
                    post_id,
                    post_title: post.title.clone(),
                    folder,
                    images: saved,
                });
            }
        }

        if !entries.is_empty() {
            let path = self.output_dir.join(MANIFEST_FILE_NAME);
            write_file(&path, render_image_manifest(&entries, Utc::now())).await?;
            report.manifest = Some(path);
        }

        log::info!(
            "Image download finished: {} downloaded, {} failed",
            report.downloaded,
            report.failed
        );
        Ok(report)
    }

    /// Every unique image URL straight into the output directory
    pub async fn save_flat(&self, posts: &[PostRecord]) -> Result<ImageDownloadReport> {
        let mut report = ImageDownloadReport::default();
        let mut seen = HashSet::new();
        let mut planned = Vec::new();

        for (index, post) in posts.iter().enumerate() {
            let post_id = post.file_id(index);
            for image in &post.images {
                if !seen.insert(image.url.as_str()) {
                    continue;
                }
                let filename = format!(
                    "post-{post_id}-{}-{}.{}",
                    sanitize_title(image.kind.as_str()),
                    planned.len() + 1,
                    image_extension(&image.url)
                );
                planned.push(PlannedImage {
                    url: image.url.clone(),
                    path: self.output_dir.join(filename),
                });
            }
        }

        for image in &planned {
            self.download_counted(image, &mut report).await;
        }

        log::info!(
            "Image download finished: {} downloaded, {} failed",
            report.downloaded,
            report.failed
        );
        Ok(report)
    }

    async fn download_counted(&self, image: &PlannedImage, report: &mut ImageDownloadReport) -> bool {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.download(&image.url, &image.path).await {
            Ok(()) => {
                log::debug!("Downloaded {} to {}", image.url, image.path.display());
                report.downloaded += 1;
                report.files.push(image.path.clone());
                true
            }
            Err(e) => {
                log::warn!("Failed to download image {}: {e:#}", image.url);
                report.failed += 1;
                false
            }
        }
    }

    async fn download(&self, url: &str, path: &Path) -> Result<()> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request failed for {url}"))?
            .error_for_status()
            .with_context(|| format!("Bad status for {url}"))?;
        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body of {url}"))?;
        write_file(path, bytes).await
    }
}

//! Shared helpers for the post crawler test suite

#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use wp_post_crawler::crawl_engine::{CrawlOrchestrator, CrawlSettings, NavigationTiming};
use wp_post_crawler::crawl_events::CrawlEventBus;
use wp_post_crawler::page_extractor::{EditorSnapshot, ListRow, PageSnapshot, RawImage};
use wp_post_crawler::tab::{LoadListener, TabDriver};

pub const ADMIN_LIST_URL: &str = "https://blog.test/wp-admin/edit.php";

type NavigateHook = Box<dyn Fn(usize, &str) + Send + Sync>;

/// In-memory tab that serves canned snapshots per URL.
///
/// `navigate` records the URL and, when `auto_load` is on, fires the load
/// event right away. URLs without a snapshot make `snapshot()` fail.
pub struct ScriptedTab {
    id: String,
    current_url: Mutex<String>,
    snapshots: Mutex<HashMap<String, PageSnapshot>>,
    navigations: Mutex<Vec<String>>,
    loads: broadcast::Sender<()>,
    auto_load: bool,
    on_navigate: Mutex<Option<NavigateHook>>,
}

impl ScriptedTab {
    pub fn new(start_url: &str) -> Self {
        let (loads, _) = broadcast::channel(16);
        Self {
            id: "tab-1".to_string(),
            current_url: Mutex::new(start_url.to_string()),
            snapshots: Mutex::new(HashMap::new()),
            navigations: Mutex::new(Vec::new()),
            loads,
            auto_load: true,
            on_navigate: Mutex::new(None),
        }
    }

    /// A tab whose pages never report load completion
    pub fn never_loading(start_url: &str) -> Self {
        Self {
            auto_load: false,
            ..Self::new(start_url)
        }
    }

    pub fn with_snapshot(self, url: &str, snapshot: PageSnapshot) -> Self {
        self.snapshots.lock().insert(url.to_string(), snapshot);
        self
    }

    pub fn set_on_navigate(&self, hook: impl Fn(usize, &str) + Send + Sync + 'static) {
        *self.on_navigate.lock() = Some(Box::new(hook));
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().clone()
    }

    /// Load listeners currently registered
    pub fn listener_count(&self) -> usize {
        self.loads.receiver_count()
    }

    pub fn fire_load(&self) {
        let _ = self.loads.send(());
    }
}

#[async_trait]
impl TabDriver for ScriptedTab {
    fn id(&self) -> &str {
        &self.id
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.current_url.lock().clone())
    }

    async fn subscribe_load(&self) -> Result<LoadListener> {
        let receiver = self.loads.subscribe();
        Ok(BroadcastStream::new(receiver)
            .filter_map(|event| async move { event.ok() })
            .boxed())
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        let index = {
            let mut navigations = self.navigations.lock();
            navigations.push(url.to_string());
            navigations.len() - 1
        };
        *self.current_url.lock() = url.to_string();
        if let Some(hook) = self.on_navigate.lock().as_ref() {
            hook(index, url);
        }
        if self.auto_load {
            self.fire_load();
        }
        Ok(())
    }

    async fn snapshot(&self) -> Result<PageSnapshot> {
        let url = self.current_url.lock().clone();
        self.snapshots
            .lock()
            .get(&url)
            .cloned()
            .ok_or_else(|| anyhow!("no document scripted for {url}"))
    }
}

pub fn edit_url(id: u32) -> String {
    format!("https://blog.test/wp-admin/post.php?post={id}&action=edit")
}

pub fn list_row(id: u32, title: &str, status: &str) -> ListRow {
    ListRow {
        classes: format!("iedit type-post status-{status}"),
        id: Some(id.to_string()),
        title: Some(title.to_string()),
        href: Some(edit_url(id)),
        date: Some("Published 2024/01/02".to_string()),
    }
}

pub fn list_page(rows: Vec<ListRow>) -> PageSnapshot {
    PageSnapshot::List {
        page_url: ADMIN_LIST_URL.to_string(),
        rows,
        notes: Vec::new(),
    }
}

pub fn editor_page(id: u32, title: &str) -> PageSnapshot {
    PageSnapshot::Single {
        page_url: edit_url(id),
        editor: EditorSnapshot {
            post_id: Some(id.to_string()),
            title: Some(title.to_string()),
            block_editor_content: Some(format!(
                "<p>Body of {title}</p><img src=\"/wp-content/uploads/{id}.png\" alt=\"inline\">"
            )),
            yoast_meta: Some(format!("About {title}")),
            status: Some("publish".to_string()),
            permalink: Some(format!("https://blog.test/post-{id}/")),
            featured_image: Some(RawImage {
                src: format!("https://blog.test/wp-content/uploads/featured-{id}.jpg"),
                alt: "featured".to_string(),
            }),
            ..Default::default()
        },
        notes: Vec::new(),
    }
}

pub fn redirected_editor_page(id: u32, title: &str, target: &str) -> PageSnapshot {
    match editor_page(id, title) {
        PageSnapshot::Single {
            page_url,
            mut editor,
            notes,
        } => {
            editor.yoast_redirect = Some(target.to_string());
            PageSnapshot::Single {
                page_url,
                editor,
                notes,
            }
        }
        other => other,
    }
}

pub fn fast_timing() -> NavigationTiming {
    NavigationTiming {
        load_timeout: Duration::from_millis(200),
        settle_delay: Duration::from_millis(10),
    }
}

pub fn orchestrator() -> CrawlOrchestrator {
    CrawlOrchestrator::new(CrawlEventBus::new(64), fast_timing())
}

pub fn visiting(settings: CrawlSettings) -> CrawlSettings {
    CrawlSettings {
        visit_pages: true,
        ..settings
    }
}

pub fn into_driver(tab: &Arc<ScriptedTab>) -> Arc<dyn TabDriver> {
    tab.clone()
}

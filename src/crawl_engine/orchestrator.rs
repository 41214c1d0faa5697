//! Crawl orchestrator
//!
//! Owns the crawl state and runs at most one crawl sequence at a time:
//! enumerate posts on the current admin page, optionally open each post's
//! editor for full content, filter redirects, then notify observers.
//!
//! State writes are tagged with the run epoch that was current when the
//! sequence started. `clear()` and every accepted `start()` bump the epoch,
//! so a superseded sequence can finish its in-flight step without touching
//! the new state.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::crawl_types::{CrawlError, CrawlResult, CrawlSettings, StartRejected};
use super::edit_link::derive_edit_url;
use super::navigation::{NavigationOutcome, NavigationTiming, navigate_and_wait, settle};
use super::state::{CrawlState, LogLevel};
use crate::crawl_events::{CrawlEvent, CrawlEventBus};
use crate::page_extractor::{ExtractionOutcome, PageSnapshot, PostRecord, extract};
use crate::tab::TabDriver;

type RunHandle = Shared<BoxFuture<'static, ()>>;

struct Inner {
    state: Mutex<CrawlState>,
    epoch: AtomicU64,
    events: CrawlEventBus,
    timing: NavigationTiming,
    current_run: Mutex<Option<RunHandle>>,
}

/// Handle to the crawl orchestrator. Clones share the same state.
#[derive(Clone)]
pub struct CrawlOrchestrator {
    inner: Arc<Inner>,
}

impl CrawlOrchestrator {
    #[must_use]
    pub fn new(events: CrawlEventBus, timing: NavigationTiming) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(CrawlState::default()),
                epoch: AtomicU64::new(0),
                events,
                timing,
                current_run: Mutex::new(None),
            }),
        }
    }

    /// Start a crawl on `tab`. Returns whether the request was accepted.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, settings: CrawlSettings, tab: Arc<dyn TabDriver>) -> bool {
        match self.try_start(settings, tab) {
            Ok(run_id) => {
                log::debug!("Crawl {run_id} accepted");
                true
            }
            Err(reason) => {
                log::debug!("Crawl start rejected: {reason}");
                false
            }
        }
    }

    /// Like [`start`](Self::start) but reports why a request was rejected.
    ///
    /// # Errors
    /// `InvalidSettings` leaves the state untouched. `AlreadyRunning`
    /// appends a WARN entry to the running crawl's log.
    pub fn try_start(
        &self,
        settings: CrawlSettings,
        tab: Arc<dyn TabDriver>,
    ) -> Result<Uuid, StartRejected> {
        settings.validate()?;

        let run_id = Uuid::new_v4();
        let epoch = {
            let mut state = self.inner.state.lock();
            if state.is_running {
                state.log(LogLevel::Warn, "Crawl already in progress", Value::Null);
                return Err(StartRejected::AlreadyRunning);
            }
            state.begin(settings, run_id);
            state.log(
                LogLevel::Info,
                "Starting crawl operation",
                serde_json::to_value(settings).unwrap_or(Value::Null),
            );
            self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1
        };

        let run = CrawlRun {
            orchestrator: self.clone(),
            epoch,
            run_id,
            settings,
            tab,
        };

        let mut slot = self.inner.current_run.lock();
        // A stopped sequence may still be finishing a visit on the same tab
        let previous = slot.clone();
        let handle = tokio::spawn(async move {
            if let Some(previous) = previous {
                previous.await;
            }
            run.execute().await;
        });
        *slot = Some(handle.map(|_| ()).boxed().shared());

        Ok(run_id)
    }

    /// Ask the running crawl to stop before its next post.
    ///
    /// The visit in flight is not interrupted. Returns whether a crawl was running.
    pub fn stop(&self) -> bool {
        let mut state = self.inner.state.lock();
        state.log(LogLevel::Info, "Stopping crawl", Value::Null);
        std::mem::replace(&mut state.is_running, false)
    }

    /// Snapshot of the current state
    #[must_use]
    pub fn get_state(&self) -> CrawlState {
        self.inner.state.lock().clone()
    }

    /// Reset to the zero state and detach any sequence still in flight
    pub fn clear(&self) {
        let mut state = self.inner.state.lock();
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        *state = CrawlState::default();
        log::info!("Crawl state cleared");
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.state.lock().is_running
    }

    #[must_use]
    pub fn events(&self) -> &CrawlEventBus {
        &self.inner.events
    }

    /// Subscribe to progress, completion and error notifications
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CrawlEvent> {
        self.inner.events.subscribe()
    }

    /// Wait until no crawl sequence is executing
    pub async fn wait_until_idle(&self) {
        loop {
            let Some(current) = self.inner.current_run.lock().clone() else {
                return;
            };
            current.clone().await;

            let latest = self.inner.current_run.lock().clone();
            match latest {
                Some(latest) if !Shared::ptr_eq(&latest, &current) => continue,
                _ => return,
            }
        }
    }
}

/// One accepted crawl sequence
struct CrawlRun {
    orchestrator: CrawlOrchestrator,
    epoch: u64,
    run_id: Uuid,
    settings: CrawlSettings,
    tab: Arc<dyn TabDriver>,
}

impl CrawlRun {
    async fn execute(self) {
        if let Err(err) = self.sequence().await {
            self.fail(&err);
        }
    }

    async fn sequence(&self) -> CrawlResult<()> {
        self.log(
            LogLevel::Info,
            "Enumerating posts on current page",
            json!({ "tab": self.tab.id() }),
        );

        let snapshot = self.tab.snapshot().await.map_err(|e| CrawlError::Enumeration {
            message: format!("{e:#}"),
            stack: None,
        })?;
        self.log_page_notes(&snapshot);

        let mut posts = match extract(&snapshot, &self.settings) {
            ExtractionOutcome::Posts(posts) => posts,
            ExtractionOutcome::Failed { message, stack } => {
                return Err(CrawlError::Enumeration { message, stack });
            }
        };

        if posts.is_empty() {
            self.log(
                LogLevel::Warn,
                "No posts matched the selected statuses on this page",
                json!({ "url": snapshot.page_url() }),
            );
        }
        self.log(
            LogLevel::Info,
            "Initial posts retrieved",
            json!({ "count": posts.len() }),
        );

        let total = posts.len();
        let enumerated = self.update(|state| {
            state.total_posts = total;
            state.posts = posts.clone();
        });
        if enumerated.is_none() {
            return Ok(());
        }

        let needs_visits = self.settings.visit_pages && posts.first().is_some_and(PostRecord::is_stub);
        if needs_visits {
            self.log(LogLevel::Info, "Starting individual page visits", Value::Null);
            if !self.visit_all(&mut posts).await {
                return Ok(());
            }
        } else if self.update(|state| state.crawled_posts = total).is_none() {
            return Ok(());
        }

        if self.settings.skip_redirects {
            let before = posts.len();
            posts.retain(|post| !post.is_redirected);
            self.log(
                LogLevel::Info,
                "Filtered redirects",
                json!({ "before": before, "after": posts.len() }),
            );
        }

        let finished = self.update(|state| {
            state.posts = posts;
            state.log(
                LogLevel::Info,
                "Crawl completed successfully",
                json!({ "totalPosts": state.posts.len() }),
            );
            state.is_running = false;
            state.finished_at = Some(chrono::Utc::now());
            (state.posts.clone(), state.logs.clone())
        });

        if let Some((posts, logs)) = finished {
            self.notify(CrawlEvent::complete(self.run_id, posts, logs));
        }
        Ok(())
    }

    /// Detailed visits in list order. Returns false when the run was superseded.
    async fn visit_all(&self, posts: &mut [PostRecord]) -> bool {
        let total = posts.len();

        for i in 0..total {
            match self.checkpoint() {
                Checkpoint::Continue => {}
                Checkpoint::Stopped => {
                    self.log(LogLevel::Warn, "Crawl stopped by user", Value::Null);
                    break;
                }
                Checkpoint::Superseded => return false,
            }

            let stub = &posts[i];
            self.log(
                LogLevel::Info,
                format!("Visiting post {}/{}", i + 1, total),
                json!({ "id": stub.id, "title": stub.title }),
            );

            let mut enriched = false;
            match self.visit(stub).await {
                Ok(Some(detailed)) => {
                    self.log(
                        LogLevel::Info,
                        "Post crawled successfully",
                        json!({ "id": detailed.id }),
                    );
                    posts[i] = detailed;
                    enriched = true;
                }
                Ok(None) => self.log(
                    LogLevel::Warn,
                    "Failed to crawl post details, keeping basic info",
                    json!({ "id": posts[i].id }),
                ),
                Err(err) => self.log(
                    LogLevel::Error,
                    "Error crawling post",
                    json!({ "id": posts[i].id, "error": format!("{err:#}") }),
                ),
            }

            let progressed = self.update(|state| {
                state.crawled_posts = i + 1;
                if enriched {
                    state.enriched_posts += 1;
                }
                state.posts = posts.to_vec();
            });
            if progressed.is_none() {
                return false;
            }

            self.notify(CrawlEvent::progress(self.run_id, i + 1, total, posts[i].clone()));
        }
        true
    }

    /// Open one post's editor and extract it. `Ok(None)` keeps the stub.
    async fn visit(&self, stub: &PostRecord) -> anyhow::Result<Option<PostRecord>> {
        let timing = self.orchestrator.inner.timing;
        let url = derive_edit_url(stub).ok_or_else(|| anyhow::anyhow!("Post has no URL to visit"))?;

        let outcome = navigate_and_wait(self.tab.as_ref(), &url, timing.load_timeout).await?;
        if outcome == NavigationOutcome::TimedOut {
            self.log(
                LogLevel::Debug,
                "Page load not confirmed before timeout, extracting anyway",
                json!({ "url": url, "timeoutMs": timing.load_timeout.as_millis() as u64 }),
            );
        }
        settle(timing.settle_delay).await;

        let snapshot = self.tab.snapshot().await?;
        self.log_page_notes(&snapshot);

        match extract(&snapshot, &self.settings.detailed()) {
            ExtractionOutcome::Posts(mut found) => {
                // Landing on a list page instead of the editor yields stubs
                let detailed = (!found.is_empty()).then(|| found.swap_remove(0));
                Ok(detailed.filter(|post| !post.is_stub()))
            }
            ExtractionOutcome::Failed { message, .. } => {
                Err(anyhow::anyhow!("Extractor error: {message}"))
            }
        }
    }

    fn fail(&self, err: &CrawlError) {
        let message = err.to_string();
        let CrawlError::Enumeration { stack, .. } = err;

        let logs = self.update(|state| {
            state.log(
                LogLevel::Error,
                "Fatal crawl error",
                json!({ "message": message, "stack": stack }),
            );
            state.is_running = false;
            state.error = Some(message.clone());
            state.finished_at = Some(chrono::Utc::now());
            state.logs.clone()
        });

        if let Some(logs) = logs {
            self.notify(CrawlEvent::error(self.run_id, message, logs));
        }
    }

    /// Best-effort push; a missing observer is only worth a DEBUG line
    fn notify(&self, event: CrawlEvent) {
        let kind = event.kind();
        if self.orchestrator.inner.events.publish(event).is_err() {
            self.log(
                LogLevel::Debug,
                "No observer available to receive update",
                json!({ "type": kind }),
            );
        }
    }

    fn checkpoint(&self) -> Checkpoint {
        let state = self.orchestrator.inner.state.lock();
        if !self.is_current() {
            Checkpoint::Superseded
        } else if state.is_running {
            Checkpoint::Continue
        } else {
            Checkpoint::Stopped
        }
    }

    fn is_current(&self) -> bool {
        self.orchestrator.inner.epoch.load(Ordering::SeqCst) == self.epoch
    }

    /// Apply `f` unless this run has been superseded
    fn update<R>(&self, f: impl FnOnce(&mut CrawlState) -> R) -> Option<R> {
        let mut state = self.orchestrator.inner.state.lock();
        if !self.is_current() {
            return None;
        }
        Some(f(&mut state))
    }

    fn log(&self, level: LogLevel, message: impl Into<String>, data: Value) {
        let _ = self.update(|state| state.log(level, message, data));
    }

    fn log_page_notes(&self, snapshot: &PageSnapshot) {
        for note in snapshot.notes() {
            self.log(LogLevel::Debug, "Page extractor note", json!({ "note": note }));
        }
    }
}

enum Checkpoint {
    Continue,
    Stopped,
    Superseded,
}

//! End-to-end behavior of the crawl orchestrator against a scripted tab

mod common;

use common::*;
use std::sync::Arc;
use tokio::sync::broadcast;

use wp_post_crawler::crawl_engine::{CrawlSettings, CrawlState, LogLevel, StartRejected};
use wp_post_crawler::crawl_events::{CrawlEvent, EventKind};
use wp_post_crawler::page_extractor::{PageSnapshot, PostStatus};

fn drain(receiver: &mut broadcast::Receiver<CrawlEvent>) -> Vec<CrawlEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

fn has_log(state: &CrawlState, level: LogLevel, message: &str) -> bool {
    state
        .logs
        .iter()
        .any(|entry| entry.level == level && entry.message == message)
}

fn three_post_tab() -> ScriptedTab {
    ScriptedTab::new(ADMIN_LIST_URL)
        .with_snapshot(
            ADMIN_LIST_URL,
            list_page(vec![
                list_row(1, "A", "publish"),
                list_row(2, "B", "publish"),
                list_row(3, "C", "publish"),
            ]),
        )
        .with_snapshot(&edit_url(1), editor_page(1, "A"))
        .with_snapshot(&edit_url(2), editor_page(2, "B"))
        .with_snapshot(&edit_url(3), editor_page(3, "C"))
}

#[tokio::test(start_paused = true)]
async fn test_start_rejected_without_any_status() {
    let orchestrator = orchestrator();
    let tab = Arc::new(three_post_tab());
    let settings = CrawlSettings {
        include_published: false,
        ..CrawlSettings::default()
    };

    let result = orchestrator.try_start(settings, into_driver(&tab));

    assert!(matches!(result, Err(StartRejected::InvalidSettings(_))));
    assert!(!orchestrator.start(settings, into_driver(&tab)));
    orchestrator.wait_until_idle().await;
    assert!(tab.navigations().is_empty());
    assert_eq!(orchestrator.get_state(), CrawlState::default());
}

#[tokio::test(start_paused = true)]
async fn test_list_only_crawl_keeps_published_stubs() {
    let mut rows: Vec<_> = (1..=5).map(|id| list_row(id, &format!("Post {id}"), "publish")).collect();
    rows.insert(2, list_row(6, "Draft one", "draft"));
    rows.push(list_row(7, "Draft two", "draft"));
    let tab = Arc::new(ScriptedTab::new(ADMIN_LIST_URL).with_snapshot(ADMIN_LIST_URL, list_page(rows)));

    let orchestrator = orchestrator();
    let mut events = orchestrator.subscribe();
    assert!(orchestrator.start(CrawlSettings::default(), into_driver(&tab)));
    orchestrator.wait_until_idle().await;

    let state = orchestrator.get_state();
    assert!(!state.is_running);
    assert_eq!(state.total_posts, 5);
    assert_eq!(state.crawled_posts, 5);
    assert_eq!(state.posts.len(), 5);
    assert!(state.posts.iter().all(|p| p.is_stub() && p.status == PostStatus::Publish));
    assert!(tab.navigations().is_empty());

    let events = drain(&mut events);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), EventKind::Complete);
}

#[tokio::test(start_paused = true)]
async fn test_visits_replace_stubs_and_emit_one_completion() {
    let tab = Arc::new(
        ScriptedTab::new(ADMIN_LIST_URL)
            .with_snapshot(
                ADMIN_LIST_URL,
                list_page(vec![list_row(1, "A", "publish"), list_row(2, "B", "publish")]),
            )
            .with_snapshot(&edit_url(1), editor_page(1, "A"))
            .with_snapshot(&edit_url(2), editor_page(2, "B")),
    );

    let orchestrator = orchestrator();
    let mut events = orchestrator.subscribe();
    assert!(orchestrator.start(visiting(CrawlSettings::default()), into_driver(&tab)));
    orchestrator.wait_until_idle().await;

    let state = orchestrator.get_state();
    assert_eq!(state.crawled_posts, 2);
    assert_eq!(state.enriched_posts, 2);
    assert!(state.posts.iter().all(|p| !p.is_stub()));
    assert!(state.posts[0].content.contains("Body of A"));
    assert_eq!(state.posts[0].images.len(), 2);
    assert_eq!(tab.navigations(), vec![edit_url(1), edit_url(2)]);

    let events = drain(&mut events);
    let completions: Vec<_> = events.iter().filter(|e| e.kind() == EventKind::Complete).collect();
    assert_eq!(completions.len(), 1);
    match completions[0] {
        CrawlEvent::Complete { posts, logs, .. } => {
            assert_eq!(posts.len(), 2);
            assert!(!logs.is_empty());
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(events.iter().filter(|e| e.kind() == EventKind::Progress).count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_visit_order_matches_list_order() {
    let tab = Arc::new(three_post_tab());
    let orchestrator = orchestrator();
    orchestrator.start(visiting(CrawlSettings::default()), into_driver(&tab));
    orchestrator.wait_until_idle().await;

    let ids: Vec<_> = orchestrator
        .get_state()
        .posts
        .into_iter()
        .map(|p| (p.id.clone().unwrap_or_default(), p.is_stub()))
        .collect();
    assert_eq!(
        ids,
        vec![("1".into(), false), ("2".into(), false), ("3".into(), false)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_progress_counters_never_decrease() {
    let tab = Arc::new(three_post_tab());
    let orchestrator = orchestrator();
    let mut events = orchestrator.subscribe();
    orchestrator.start(visiting(CrawlSettings::default()), into_driver(&tab));
    orchestrator.wait_until_idle().await;

    let progress: Vec<(usize, usize)> = drain(&mut events)
        .into_iter()
        .filter_map(|event| match event {
            CrawlEvent::Progress { current, total, .. } => Some((current, total)),
            _ => None,
        })
        .collect();

    assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
    let state = orchestrator.get_state();
    assert!(state.crawled_posts <= state.total_posts);
}

#[tokio::test(start_paused = true)]
async fn test_redirects_filtered_after_all_visits() {
    let tab = Arc::new(
        three_post_tab().with_snapshot(
            &edit_url(2),
            redirected_editor_page(2, "B", "https://elsewhere.test/"),
        ),
    );
    let orchestrator = orchestrator();
    orchestrator.start(visiting(CrawlSettings::default()), into_driver(&tab));
    orchestrator.wait_until_idle().await;

    let state = orchestrator.get_state();
    assert_eq!(tab.navigations().len(), 3);
    assert_eq!(state.total_posts, 3);
    let ids: Vec<_> = state.posts.iter().filter_map(|p| p.id.clone()).collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert!(has_log(&state, LogLevel::Info, "Filtered redirects"));
}

#[tokio::test(start_paused = true)]
async fn test_redirects_kept_when_not_skipping() {
    let tab = Arc::new(
        three_post_tab().with_snapshot(
            &edit_url(2),
            redirected_editor_page(2, "B", "https://elsewhere.test/"),
        ),
    );
    let orchestrator = orchestrator();
    let settings = CrawlSettings {
        skip_redirects: false,
        ..visiting(CrawlSettings::default())
    };
    orchestrator.start(settings, into_driver(&tab));
    orchestrator.wait_until_idle().await;

    let state = orchestrator.get_state();
    assert_eq!(state.posts.len(), 3);
    assert!(state.posts[1].is_redirected);
    assert_eq!(state.posts[1].redirect_url, "https://elsewhere.test/");
}

#[tokio::test(start_paused = true)]
async fn test_failed_visit_keeps_stub_and_continues() {
    let tab = Arc::new(
        ScriptedTab::new(ADMIN_LIST_URL)
            .with_snapshot(
                ADMIN_LIST_URL,
                list_page(vec![
                    list_row(1, "A", "publish"),
                    list_row(2, "B", "publish"),
                    list_row(3, "C", "publish"),
                ]),
            )
            .with_snapshot(&edit_url(1), editor_page(1, "A"))
            .with_snapshot(&edit_url(3), editor_page(3, "C")),
    );
    let orchestrator = orchestrator();
    orchestrator.start(visiting(CrawlSettings::default()), into_driver(&tab));
    orchestrator.wait_until_idle().await;

    let state = orchestrator.get_state();
    assert!(!state.is_running);
    assert!(state.error.is_none());
    assert_eq!(state.posts.len(), 3);
    assert!(!state.posts[0].is_stub());
    assert!(state.posts[1].is_stub());
    assert!(!state.posts[2].is_stub());
    assert_eq!(state.crawled_posts, 3);
    assert_eq!(state.enriched_posts, 2);
    assert!(has_log(&state, LogLevel::Error, "Error crawling post"));
}

#[tokio::test(start_paused = true)]
async fn test_editor_redirect_back_to_list_keeps_stub() {
    // Landing on a list page again means the editor never opened
    let tab = Arc::new(
        three_post_tab().with_snapshot(&edit_url(2), list_page(vec![list_row(2, "B", "publish")])),
    );
    let orchestrator = orchestrator();
    orchestrator.start(visiting(CrawlSettings::default()), into_driver(&tab));
    orchestrator.wait_until_idle().await;

    let state = orchestrator.get_state();
    assert!(state.posts[1].is_stub());
    assert!(has_log(
        &state,
        LogLevel::Warn,
        "Failed to crawl post details, keeping basic info"
    ));
}

#[tokio::test(start_paused = true)]
async fn test_start_while_running_is_rejected() {
    let tab = Arc::new(three_post_tab());
    let orchestrator = orchestrator();
    let first = visiting(CrawlSettings::default());
    let second = CrawlSettings {
        include_drafts: true,
        ..first
    };

    assert!(orchestrator.start(first, into_driver(&tab)));
    let run_id = orchestrator.get_state().run_id;
    assert!(matches!(
        orchestrator.try_start(second, into_driver(&tab)),
        Err(StartRejected::AlreadyRunning)
    ));

    let state = orchestrator.get_state();
    assert!(state.is_running);
    assert_eq!(state.run_id, run_id);
    assert_eq!(state.settings, Some(first));
    assert!(has_log(&state, LogLevel::Warn, "Crawl already in progress"));

    orchestrator.wait_until_idle().await;
    assert_eq!(orchestrator.get_state().posts.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_first_visit_keeps_remaining_stubs() {
    let tab = Arc::new(three_post_tab());
    let orchestrator = orchestrator();
    let stopper = orchestrator.clone();
    tab.set_on_navigate(move |index, _| {
        if index == 0 {
            stopper.stop();
        }
    });

    orchestrator.start(visiting(CrawlSettings::default()), into_driver(&tab));
    orchestrator.wait_until_idle().await;

    let state = orchestrator.get_state();
    assert!(!state.is_running);
    assert_eq!(state.crawled_posts, 1);
    assert_eq!(tab.navigations().len(), 1);
    assert!(!state.posts[0].is_stub());
    assert!(state.posts[1].is_stub());
    assert!(state.posts[2].is_stub());
    assert!(has_log(&state, LogLevel::Warn, "Crawl stopped by user"));
}

#[tokio::test(start_paused = true)]
async fn test_clear_detaches_running_sequence() {
    let tab = Arc::new(three_post_tab());
    let orchestrator = orchestrator();
    let clearer = orchestrator.clone();
    tab.set_on_navigate(move |index, _| {
        if index == 0 {
            clearer.clear();
        }
    });

    let mut events = orchestrator.subscribe();
    orchestrator.start(visiting(CrawlSettings::default()), into_driver(&tab));
    orchestrator.wait_until_idle().await;

    assert_eq!(orchestrator.get_state(), CrawlState::default());
    assert_eq!(tab.navigations().len(), 1);
    assert!(drain(&mut events).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_restart_enumerates_the_page_the_tab_is_on() {
    let tab = Arc::new(three_post_tab());
    let orchestrator = orchestrator();
    let stopper = orchestrator.clone();
    tab.set_on_navigate(move |index, _| {
        if index == 0 {
            stopper.stop();
        }
    });

    orchestrator.start(visiting(CrawlSettings::default()), into_driver(&tab));
    orchestrator.wait_until_idle().await;
    assert!(orchestrator.start(CrawlSettings::default(), into_driver(&tab)));
    orchestrator.wait_until_idle().await;

    // The tab was left on the first post's editor
    let state = orchestrator.get_state();
    assert_eq!(state.total_posts, 1);
    assert_eq!(state.posts[0].id.as_deref(), Some("1"));
    assert!(!state.posts[0].is_stub());
    assert!(!has_log(&state, LogLevel::Warn, "Crawl stopped by user"));
}

#[tokio::test(start_paused = true)]
async fn test_enumeration_error_ends_crawl() {
    let tab = Arc::new(ScriptedTab::new(ADMIN_LIST_URL).with_snapshot(
        ADMIN_LIST_URL,
        PageSnapshot::Error {
            message: "table missing".into(),
            stack: Some("at readRows".into()),
        },
    ));
    let orchestrator = orchestrator();
    let mut events = orchestrator.subscribe();
    orchestrator.start(CrawlSettings::default(), into_driver(&tab));
    orchestrator.wait_until_idle().await;

    let state = orchestrator.get_state();
    assert!(!state.is_running);
    assert!(state.failed());
    assert_eq!(
        state.error.as_deref(),
        Some("Failed to get initial post list: table missing")
    );
    assert!(has_log(&state, LogLevel::Error, "Fatal crawl error"));

    let events = drain(&mut events);
    assert_eq!(events.len(), 1);
    match &events[0] {
        CrawlEvent::Error { message, logs, .. } => {
            assert!(message.contains("table missing"));
            assert!(!logs.is_empty());
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_empty_list_completes_with_warning() {
    let tab = Arc::new(ScriptedTab::new(ADMIN_LIST_URL).with_snapshot(ADMIN_LIST_URL, list_page(vec![])));
    let orchestrator = orchestrator();
    orchestrator.start(visiting(CrawlSettings::default()), into_driver(&tab));
    orchestrator.wait_until_idle().await;

    let state = orchestrator.get_state();
    assert!(!state.is_running);
    assert!(state.error.is_none());
    assert_eq!(state.total_posts, 0);
    assert!(has_log(&state, LogLevel::Info, "Crawl completed successfully"));
    assert!(
        state
            .logs
            .iter()
            .any(|entry| entry.level == LogLevel::Warn)
    );
}

#[tokio::test(start_paused = true)]
async fn test_load_timeout_still_extracts() {
    let tab = Arc::new(
        ScriptedTab::never_loading(ADMIN_LIST_URL)
            .with_snapshot(ADMIN_LIST_URL, list_page(vec![list_row(1, "A", "publish")]))
            .with_snapshot(&edit_url(1), editor_page(1, "A")),
    );
    let orchestrator = orchestrator();
    orchestrator.start(visiting(CrawlSettings::default()), into_driver(&tab));
    orchestrator.wait_until_idle().await;

    let state = orchestrator.get_state();
    assert!(!state.posts[0].is_stub());
    assert_eq!(tab.listener_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_state_snapshots_are_stable_without_mutation() {
    let tab = Arc::new(three_post_tab());
    let orchestrator = orchestrator();
    orchestrator.start(CrawlSettings::default(), into_driver(&tab));
    orchestrator.wait_until_idle().await;

    assert_eq!(orchestrator.get_state(), orchestrator.get_state());
}

#[tokio::test(start_paused = true)]
async fn test_limit_caps_enumerated_rows() {
    let tab = Arc::new(three_post_tab());
    let orchestrator = orchestrator();
    let settings = CrawlSettings {
        limit: 2,
        ..CrawlSettings::default()
    };
    orchestrator.start(settings, into_driver(&tab));
    orchestrator.wait_until_idle().await;

    assert_eq!(orchestrator.get_state().total_posts, 2);
}

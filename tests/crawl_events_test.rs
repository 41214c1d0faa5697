use futures::StreamExt;
use std::time::Duration;
use tokio::time::timeout;
use uuid::Uuid;

use wp_post_crawler::crawl_events::*;
use wp_post_crawler::page_extractor::PostRecord;

fn progress(current: usize) -> CrawlEvent {
    CrawlEvent::progress(Uuid::new_v4(), current, 3, PostRecord::default())
}

#[tokio::test]
async fn test_event_bus_creation() {
    let bus = CrawlEventBus::new(100);
    assert_eq!(bus.subscriber_count(), 0);
    assert!(!bus.has_subscribers());
    assert_eq!(bus.config().capacity, 100);
}

#[tokio::test]
async fn test_publish_with_no_subscribers() {
    let bus = CrawlEventBus::new(10);

    let result = bus.publish(progress(1));

    assert_eq!(result, Err(EventBusError::NoSubscribers));
    let metrics = bus.metrics().snapshot();
    assert_eq!(metrics.events_undelivered, 1);
    assert_eq!(metrics.events_delivered, 0);
}

#[tokio::test]
async fn test_subscribe_and_publish() {
    let bus = CrawlEventBus::new(10);
    let mut receiver = bus.subscribe();

    assert_eq!(bus.publish(progress(1)), Ok(1));

    let received = timeout(Duration::from_millis(100), receiver.recv())
        .await
        .expect("timed out waiting for event")
        .expect("bus closed");
    match received {
        CrawlEvent::Progress { current, total, .. } => {
            assert_eq!(current, 1);
            assert_eq!(total, 3);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_late_subscriber_sees_no_replay() {
    let bus = CrawlEventBus::new(10);
    let _early = bus.subscribe();
    bus.publish(progress(1)).unwrap();

    let mut late = bus.subscribe();
    assert!(late.try_recv().is_err());
}

#[tokio::test]
async fn test_multiple_subscribers_and_peak_metrics() {
    let bus = CrawlEventBus::new(10);
    let mut first = bus.subscribe();
    let mut second = bus.subscribe();

    assert_eq!(bus.publish(CrawlEvent::complete(Uuid::new_v4(), vec![], vec![])), Ok(2));
    assert!(first.recv().await.unwrap().is_terminal());
    assert!(second.recv().await.unwrap().is_terminal());

    drop(second);
    bus.publish(progress(1)).unwrap();

    let metrics = bus.metrics().snapshot();
    assert_eq!(metrics.events_delivered, 2);
    assert_eq!(metrics.progress_events, 1);
    assert_eq!(metrics.terminal_events, 1);
    assert_eq!(metrics.active_subscribers, 1);
    assert_eq!(metrics.peak_subscribers, 2);
    assert_eq!(metrics.total_events(), 2);
}

#[tokio::test]
async fn test_kind_filtered_receiver_skips_other_events() {
    let bus = CrawlEventBus::new(10);
    let mut terminal = bus.subscribe_kind(EventKind::Error);

    bus.publish(progress(1)).unwrap();
    bus.publish(CrawlEvent::error(Uuid::new_v4(), "boom", vec![])).unwrap();

    match terminal.recv().await.unwrap() {
        CrawlEvent::Error { message, .. } => assert_eq!(message, "boom"),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(matches!(terminal.try_recv(), Ok(None)));
}

#[tokio::test]
async fn test_filtered_receiver_reports_shutdown() {
    let bus = CrawlEventBus::new(10);
    let mut receiver = bus.subscribe_filtered(|event| event.is_terminal());
    drop(bus);

    assert!(matches!(receiver.recv().await, Err(EventBusError::Shutdown)));
}

#[tokio::test]
async fn test_lagging_receiver_is_told_how_much_it_missed() {
    let bus = CrawlEventBus::new(2);
    let mut receiver = bus.subscribe_filtered(|_| true);
    for i in 0..5 {
        bus.publish(progress(i)).unwrap();
    }

    assert!(matches!(
        receiver.try_recv(),
        Err(EventBusError::ReceiverLagged(3))
    ));
}

#[tokio::test]
async fn test_event_stream_filters_by_kind_and_surfaces_lag() {
    let bus = CrawlEventBus::new(2);
    let stream = event_stream(bus.subscribe(), Some(EventKind::Complete));
    for i in 0..3 {
        bus.publish(progress(i)).unwrap();
    }
    bus.publish(CrawlEvent::complete(Uuid::new_v4(), vec![], vec![])).unwrap();
    drop(bus);

    let items: Vec<StreamItem> = stream.collect().await;

    assert!(matches!(items[0], StreamItem::Lagged(2)));
    assert_eq!(items.len(), 2);
    assert!(matches!(&items[1], StreamItem::Event(event) if event.kind() == EventKind::Complete));
}

#[test]
fn test_events_serialize_with_type_tag() {
    let event = progress(2);
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["type"], "progress");
    assert_eq!(value["current"], 2);
    assert!(value["runId"].is_string());
    assert_eq!(value["post"]["needsDetailedCrawl"], false);

    let parsed: CrawlEvent = serde_json::from_value(value).unwrap();
    assert_eq!(parsed.kind(), EventKind::Progress);
    assert_eq!("complete".parse::<EventKind>(), Ok(EventKind::Complete));
    assert!("finished".parse::<EventKind>().is_err());
}

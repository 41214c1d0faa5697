//! Filtered receivers and stream adapters over the event bus

use futures::Stream;
use futures::StreamExt;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use super::errors::EventBusError;
use super::types::{CrawlEvent, EventKind};

/// Receiver that skips events rejected by `filter`
pub struct FilteredReceiver<F>
where
    F: Fn(&CrawlEvent) -> bool + Send + Sync + 'static,
{
    receiver: broadcast::Receiver<CrawlEvent>,
    filter: F,
}

impl<F> FilteredReceiver<F>
where
    F: Fn(&CrawlEvent) -> bool + Send + Sync + 'static,
{
    pub fn new(receiver: broadcast::Receiver<CrawlEvent>, filter: F) -> Self {
        Self { receiver, filter }
    }

    /// Wait for the next matching event
    ///
    /// # Errors
    /// `Shutdown` once every sender is gone, `ReceiverLagged` when buffered
    /// events were overwritten before this receiver read them.
    pub async fn recv(&mut self) -> Result<CrawlEvent, EventBusError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if (self.filter)(&event) => return Ok(event),
                Ok(_) => {}
                Err(RecvError::Closed) => return Err(EventBusError::Shutdown),
                Err(RecvError::Lagged(skipped)) => {
                    return Err(EventBusError::ReceiverLagged(skipped));
                }
            }
        }
    }

    /// Drain buffered events without waiting; `Ok(None)` when nothing matches
    pub fn try_recv(&mut self) -> Result<Option<CrawlEvent>, EventBusError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if (self.filter)(&event) => return Ok(Some(event)),
                Ok(_) => {}
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Closed) => return Err(EventBusError::Shutdown),
                Err(TryRecvError::Lagged(skipped)) => {
                    return Err(EventBusError::ReceiverLagged(skipped));
                }
            }
        }
    }
}

/// Item of an event stream: an event, or a note that some were missed
#[derive(Debug, Clone)]
pub enum StreamItem {
    Event(CrawlEvent),
    Lagged(u64),
}

/// Adapt a receiver into a stream, optionally restricted to one kind.
///
/// Lag is surfaced as an item so the consumer can tell its observer to
/// re-poll the crawl state.
pub fn event_stream(
    receiver: broadcast::Receiver<CrawlEvent>,
    kind: Option<EventKind>,
) -> impl Stream<Item = StreamItem> + Send + 'static {
    BroadcastStream::new(receiver).filter_map(move |result| async move {
        match result {
            Ok(event) if kind.is_none_or(|k| event.kind() == k) => Some(StreamItem::Event(event)),
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(missed)) => Some(StreamItem::Lagged(missed)),
        }
    })
}

//! Progress reporting for a crawl run
//!
//! The crawl loop is the only publisher. At most one subscriber receives
//! events through a bounded channel; subscribing again replaces the
//! previous receiver. Intermediate updates never block the crawl: a full
//! or closed channel drops the event and logs it. The terminal update is
//! sent with [`ProgressBroadcaster::finish`], which waits for room and then
//! closes the stream.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc::{
    self,
    error::{SendTimeoutError, TrySendError},
};

/// Upper bound on waiting for a lagging subscriber to take the final event
const FINISH_SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// A single progress update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Completion percentage, 0 to 100
    pub percent: u8,

    /// Human-readable status line
    pub message: String,
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>3}%] {}", self.percent, self.message)
    }
}

/// Single-subscriber progress channel
#[derive(Debug)]
pub struct ProgressBroadcaster {
    capacity: usize,
    subscriber: Mutex<Option<mpsc::Sender<ProgressEvent>>>,
    last_percent: AtomicU8,
}

impl ProgressBroadcaster {
    /// Creates a broadcaster whose subscribers buffer up to `capacity` events
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            subscriber: Mutex::new(None),
            last_percent: AtomicU8::new(0),
        }
    }

    /// Registers a new subscriber, replacing any existing one
    pub fn subscribe(&self) -> mpsc::Receiver<ProgressEvent> {
        let (tx, rx) = mpsc::channel(self.capacity);
        let mut slot = self.subscriber.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.replace(tx).is_some() {
            tracing::debug!("Progress subscriber replaced");
        }
        rx
    }

    /// Drops the current subscriber, if any
    pub fn unsubscribe(&self) {
        let mut slot = self.subscriber.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }

    /// Returns true while a subscriber is registered
    pub fn has_subscriber(&self) -> bool {
        self.subscriber
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Percentage carried by the most recently published event
    pub fn last_percent(&self) -> u8 {
        self.last_percent.load(Ordering::SeqCst)
    }

    /// Publishes an event to the subscriber
    ///
    /// Delivery failures are logged and otherwise ignored.
    pub fn publish(&self, percent: u8, message: impl Into<String>) {
        let event = ProgressEvent {
            percent: percent.min(100),
            message: message.into(),
        };
        self.last_percent.store(event.percent, Ordering::SeqCst);

        let mut slot = self.subscriber.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = slot.as_ref() else {
            return;
        };

        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!("Progress subscriber lagging, dropped update: {}", event);
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("Progress subscriber disconnected");
                *slot = None;
            }
        }
    }

    /// Publishes the terminal event of a run and closes the stream
    ///
    /// Unlike [`Self::publish`], a full channel is waited on so the
    /// subscriber always sees how the run ended. The subscriber is detached
    /// afterwards, so its receiver yields `None` once drained.
    pub async fn finish(&self, percent: u8, message: impl Into<String>) {
        let event = ProgressEvent {
            percent: percent.min(100),
            message: message.into(),
        };
        self.last_percent.store(event.percent, Ordering::SeqCst);

        let sender = self
            .subscriber
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(tx) = sender else {
            return;
        };

        match tx.send_timeout(event, FINISH_SEND_TIMEOUT).await {
            Ok(()) => {}
            Err(SendTimeoutError::Timeout(event)) => {
                tracing::warn!("Progress subscriber stalled, dropped final update: {}", event);
            }
            Err(SendTimeoutError::Closed(_)) => {
                tracing::debug!("Progress subscriber disconnected");
            }
        }
    }
}

impl Default for ProgressBroadcaster {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscriber() {
        let progress = ProgressBroadcaster::new(4);
        progress.publish(50, "halfway");
        assert_eq!(progress.last_percent(), 50);
        assert!(!progress.has_subscriber());
    }

    #[test]
    fn test_subscriber_receives_events() {
        let progress = ProgressBroadcaster::new(4);
        let mut rx = progress.subscribe();

        progress.publish(10, "a");
        progress.publish(250, "b");

        assert_eq!(
            rx.try_recv().unwrap(),
            ProgressEvent {
                percent: 10,
                message: "a".to_string()
            }
        );
        assert_eq!(rx.try_recv().unwrap().percent, 100);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_second_subscriber_replaces_first() {
        let progress = ProgressBroadcaster::new(4);
        let mut first = progress.subscribe();
        let mut second = progress.subscribe();

        progress.publish(1, "x");

        assert!(first.try_recv().is_err());
        assert_eq!(second.try_recv().unwrap().message, "x");
    }

    #[test]
    fn test_full_channel_drops_without_panicking() {
        let progress = ProgressBroadcaster::new(1);
        let mut rx = progress.subscribe();

        progress.publish(1, "kept");
        progress.publish(2, "dropped");

        assert_eq!(rx.try_recv().unwrap().message, "kept");
        assert!(rx.try_recv().is_err());
        assert!(progress.has_subscriber());
    }

    #[test]
    fn test_closed_subscriber_is_cleared() {
        let progress = ProgressBroadcaster::new(4);
        drop(progress.subscribe());

        progress.publish(5, "nobody listening");
        assert!(!progress.has_subscriber());
    }

    #[test]
    fn test_unsubscribe() {
        let progress = ProgressBroadcaster::new(4);
        let _rx = progress.subscribe();
        progress.unsubscribe();
        assert!(!progress.has_subscriber());
    }

    #[test]
    fn test_event_display() {
        let event = ProgressEvent {
            percent: 7,
            message: "Scraping 1/14 pages... (7%)".to_string(),
        };
        assert_eq!(event.to_string(), "[  7%] Scraping 1/14 pages... (7%)");
    }

    #[tokio::test]
    async fn test_finish_waits_for_lagging_subscriber() {
        let progress = ProgressBroadcaster::new(1);
        let mut rx = progress.subscribe();

        progress.publish(50, "Scraping 1/2 pages... (50%)");
        progress.publish(100, "Scraping 2/2 pages... (100%)");

        let reader = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let mut events = Vec::new();
            while let Some(event) = rx.recv().await {
                events.push(event);
            }
            events
        });

        progress.finish(100, "Scraping complete.").await;
        let events = reader.await.unwrap();

        assert_eq!(
            events.iter().map(|e| e.message.as_str()).collect::<Vec<_>>(),
            vec!["Scraping 1/2 pages... (50%)", "Scraping complete."]
        );
        assert!(!progress.has_subscriber());
        assert_eq!(progress.last_percent(), 100);
    }

    #[tokio::test]
    async fn test_finish_without_subscriber() {
        let progress = ProgressBroadcaster::new(4);
        progress.finish(40, "Scraping canceled.").await;
        assert_eq!(progress.last_percent(), 40);
    }
}

use std::time::Duration;

use futures_util::{Stream, stream};

use super::dto::ProgressEvent;
use super::store::ProgressStore;

struct Poller<F> {
    store: ProgressStore,
    interval: Duration,
    encode: F,
    first: bool,
}

/// Samples the store every `interval` until a completed sample has been emitted.
///
/// `encode` turns a sample into a stream item. An `Err` item is emitted and ends
/// the stream.
pub fn poll_progress<T, F>(store: ProgressStore, interval: Duration, encode: F) -> impl Stream<Item = T>
where
    F: Fn(&ProgressEvent) -> Result<T, T>,
{
    let poller = Poller {
        store,
        interval,
        encode,
        first: true,
    };

    stream::unfold(Some(poller), |state| async move {
        let mut poller = state?;
        if !poller.first {
            tokio::time::sleep(poller.interval).await;
        }
        poller.first = false;

        let snapshot = poller.store.get_progress();
        let event = ProgressEvent::from(snapshot);

        match (poller.encode)(&event) {
            Ok(item) if snapshot.completed => Some((item, None)),
            Ok(item) => Some((item, Some(poller))),
            Err(item) => Some((item, None)),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    fn identity(event: &ProgressEvent) -> Result<ProgressEvent, ProgressEvent> {
        Ok(event.clone())
    }

    #[tokio::test]
    async fn completed_store_yields_one_event() {
        let store = ProgressStore::new();
        store.set_progress(100.0);

        let events: Vec<_> = poll_progress(store, Duration::from_millis(1), identity)
            .collect()
            .await;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].percentage, 100.0);
        assert_eq!(events[0].progress, "Compression complete");
    }

    #[tokio::test]
    async fn follows_job_until_completion() {
        let store = ProgressStore::new();
        store.set_progress(20.0);

        let writer = store.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            writer.set_progress(60.0);
            tokio::time::sleep(Duration::from_millis(20)).await;
            writer.set_progress(100.0);
        });

        let events: Vec<_> = poll_progress(store, Duration::from_millis(2), identity)
            .collect()
            .await;

        assert_eq!(events.first().map(|e| e.percentage), Some(20.0));
        assert_eq!(events.last().map(|e| e.percentage), Some(100.0));
        assert!(events.windows(2).all(|w| w[0].percentage <= w[1].percentage));
        assert_eq!(
            events.iter().filter(|e| e.progress == "Compression complete").count(),
            1
        );
    }

    #[tokio::test]
    async fn encode_failure_closes_stream() {
        let store = ProgressStore::new();
        store.set_progress(10.0);

        let events: Vec<String> = poll_progress(store, Duration::from_millis(1), |_| {
            Err::<String, String>("encode failed".to_string())
        })
        .collect()
        .await;

        assert_eq!(events, vec!["encode failed".to_string()]);
    }

    #[tokio::test]
    async fn dropping_the_stream_stops_polling() {
        let store = ProgressStore::new();
        let mut events = Box::pin(poll_progress(store, Duration::from_millis(1), identity));

        assert_eq!(events.next().await.map(|e| e.percentage), Some(0.0));
        assert_eq!(events.next().await.map(|e| e.percentage), Some(0.0));
        drop(events);
    }
}

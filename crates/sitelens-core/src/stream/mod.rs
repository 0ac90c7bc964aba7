// ── Registry subscriptions ──
//
// Read side of the site registry: a snapshot you can hold on to plus a
// way to wait for the next mutation.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Id-ordered view of a collection at one version.
pub type Snapshot<T> = Arc<Vec<Arc<T>>>;

/// Live view over a registry.
///
/// `seen` is the snapshot last handed out by [`changed`](Self::changed);
/// renderers re-draw from it and wait for the next version.
pub struct EntityStream<T: Clone + Send + Sync + 'static> {
    seen: Snapshot<T>,
    rx: watch::Receiver<Snapshot<T>>,
}

impl<T: Clone + Send + Sync + 'static> EntityStream<T> {
    pub(crate) fn new(mut rx: watch::Receiver<Snapshot<T>>) -> Self {
        let seen = Arc::clone(&rx.borrow_and_update());
        Self { seen, rx }
    }

    pub fn current(&self) -> &Snapshot<T> {
        &self.seen
    }

    /// Newest published snapshot. Does not count as seen.
    pub fn latest(&self) -> Snapshot<T> {
        Arc::clone(&self.rx.borrow())
    }

    /// A version newer than [`current`](Self::current) is waiting.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait for the registry to move past the seen version.
    ///
    /// `None` once the registry is gone. Several mutations between two
    /// calls collapse into one wake-up carrying the newest snapshot.
    pub async fn changed(&mut self) -> Option<Snapshot<T>> {
        self.rx.changed().await.ok()?;
        self.seen = Arc::clone(&self.rx.borrow_and_update());
        Some(Arc::clone(&self.seen))
    }

    pub fn into_stream(self) -> SnapshotStream<T> {
        SnapshotStream {
            inner: WatchStream::new(self.rx),
        }
    }
}

/// [`Stream`] of snapshots: the current one first, then one per change.
pub struct SnapshotStream<T: Clone + Send + Sync + 'static> {
    inner: WatchStream<Snapshot<T>>,
}

impl<T: Clone + Send + Sync + 'static> Stream for SnapshotStream<T> {
    type Item = Snapshot<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    fn snapshot(values: &[u8]) -> Snapshot<u8> {
        Arc::new(values.iter().copied().map(Arc::new).collect())
    }

    #[tokio::test]
    async fn stream_starts_with_current_snapshot() {
        let (tx, rx) = watch::channel(snapshot(&[1]));
        let mut stream = EntityStream::new(rx).into_stream();

        assert_eq!(stream.next().await.unwrap().len(), 1);

        tx.send_replace(snapshot(&[1, 2]));
        assert_eq!(stream.next().await.unwrap().len(), 2);

        drop(tx);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn changed_collapses_bursts_into_latest() {
        let (tx, rx) = watch::channel(snapshot(&[]));
        let mut stream = EntityStream::new(rx);
        assert!(!stream.has_changed());

        tx.send_replace(snapshot(&[9]));
        tx.send_replace(snapshot(&[9, 8]));
        assert!(stream.has_changed());
        assert_eq!(stream.latest().len(), 2);
        assert!(stream.current().is_empty());

        let seen = stream.changed().await.unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(stream.current().len(), 2);
        assert!(!stream.has_changed());
    }
}

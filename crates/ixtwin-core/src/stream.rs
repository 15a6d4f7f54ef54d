// ── Reactive state streams ──
//
// Subscription handle over a component's observable state.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A subscription to one component's state.
///
/// Provides both point-in-time snapshot access and change notification
/// via [`changed()`](Self::changed) or by converting to a `Stream`.
pub struct StateStream<T: Clone + Send + Sync + 'static> {
    current: T,
    receiver: watch::Receiver<T>,
}

impl<T: Clone + Send + Sync + 'static> StateStream<T> {
    pub(crate) fn new(mut receiver: watch::Receiver<T>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation or by the last `changed()`.
    pub fn current(&self) -> &T {
        &self.current
    }

    /// The latest state (may have changed since `current`).
    pub fn latest(&self) -> T {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new state.
    /// Returns `None` once the owning component has been dropped.
    pub async fn changed(&mut self) -> Option<T> {
        self.receiver.changed().await.ok()?;
        let next = self.receiver.borrow_and_update().clone();
        self.current = next.clone();
        Some(next)
    }

    /// Convert into a `Stream` that yields the current state first,
    /// then every subsequent change.
    pub fn into_stream(self) -> StateWatchStream<T> {
        StateWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct StateWatchStream<T: Clone + Send + Sync + 'static> {
    inner: WatchStream<T>,
}

impl<T: Clone + Send + Sync + 'static> Stream for StateWatchStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // WatchStream is Unpin, so projecting through `&mut` is fine.
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;

    use super::*;

    #[tokio::test]
    async fn stream_yields_current_then_changes() {
        let (tx, rx) = watch::channel(1_u32);
        let mut stream = StateStream::new(rx).into_stream();
        assert_eq!(stream.next().await, Some(1));

        tx.send_replace(2);
        assert_eq!(stream.next().await, Some(2));

        drop(tx);
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn changed_updates_snapshot() {
        let (tx, rx) = watch::channel("idle");
        let mut state = StateStream::new(rx);
        assert_eq!(*state.current(), "idle");

        tx.send_replace("busy");
        assert_eq!(state.changed().await, Some("busy"));
        assert_eq!(*state.current(), "busy");
    }
}

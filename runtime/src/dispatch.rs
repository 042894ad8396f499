//! Action queue between synchronous callbacks and the [`Store`](crate::Store).
//!
//! Bus subscribers and view callbacks run while an event is being
//! published, so they cannot await the store. They hold a [`Dispatcher`]
//! instead and enqueue actions; the owner of the [`Inbox`] later feeds
//! them to [`Store::drain`](crate::Store::drain) in FIFO order.

use tokio::sync::mpsc;

/// Create a connected dispatcher/inbox pair
#[must_use]
pub fn channel<A>() -> (Dispatcher<A>, Inbox<A>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Dispatcher { tx }, Inbox { rx })
}

/// Cloneable sending side of the action queue
pub struct Dispatcher<A> {
    tx: mpsc::UnboundedSender<A>,
}

impl<A> Dispatcher<A> {
    /// Enqueue an action
    ///
    /// Returns `false` when the inbox has been dropped and the action was
    /// discarded.
    pub fn dispatch(&self, action: A) -> bool {
        if self.tx.send(action).is_err() {
            tracing::warn!("Dropped action: inbox closed");
            return false;
        }
        true
    }
}

impl<A> Clone for Dispatcher<A> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<A> std::fmt::Debug for Dispatcher<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

/// Receiving side of the action queue
#[derive(Debug)]
pub struct Inbox<A> {
    rx: mpsc::UnboundedReceiver<A>,
}

impl<A> Inbox<A> {
    /// Take the next queued action without waiting
    pub fn try_next(&mut self) -> Option<A> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next action; `None` once every dispatcher is gone
    pub async fn next(&mut self) -> Option<A> {
        self.rx.recv().await
    }

    /// Whether no action is currently queued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

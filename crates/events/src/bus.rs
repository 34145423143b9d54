//! Publish/subscribe abstraction (mechanics only).
//!
//! The bus distributes change notifications to every live subscriber:
//!
//! - **Broadcast**: each subscription gets its own copy of every message
//! - **Ordered per publisher**: messages from one thread arrive in publish order
//! - **No persistence**: a subscriber that was not listening misses the message;
//!   it re-reads current state from the store instead
//!
//! Consumers should treat a notification as "re-read this view", not as a
//! delta to apply, which makes duplicate or coalesced delivery harmless.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvError, RecvTimeoutError, TryRecvError};
use std::time::Duration;

/// A subscription to a message stream.
///
/// ```ignore
/// let subscription = store.subscribe(StoreView::Pending);
///
/// while let Ok(change) = subscription.try_recv() {
///     redraw_pending(store.pending_stocks());
/// }
/// ```
///
/// Subscriptions are meant for single-threaded consumption. Dropping one
/// unsubscribes it; the bus prunes it on the next publish.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain every message that is already queued.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Transport-agnostic pub/sub bus.
///
/// `publish()` can fail (e.g. poisoned internal state). Callers that treat
/// notifications as best-effort log the failure and move on.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}

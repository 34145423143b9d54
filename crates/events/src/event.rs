use chrono::{DateTime, Utc};

/// A change notification.
///
/// Events are **immutable** facts about a state transition that already
/// happened in memory.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "inventory.item.promoted").
    fn event_type(&self) -> &'static str;

    /// When the change happened.
    fn occurred_at(&self) -> DateTime<Utc>;
}

use chrono::{DateTime, Utc};

use stockbook_core::ItemId;
use stockbook_events::Event;

/// Notification that the item lists changed in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryChange {
    PendingAdded { item_id: ItemId, occurred_at: DateTime<Utc> },
    Promoted { item_id: ItemId, occurred_at: DateTime<Utc> },
    Updated { item_id: ItemId, occurred_at: DateTime<Utc> },
    Deleted { item_id: ItemId, occurred_at: DateTime<Utc> },
    /// The inventory list was replaced from durable storage.
    Loaded { count: usize, occurred_at: DateTime<Utc> },
    /// All in-memory lists were cleared.
    Reset { occurred_at: DateTime<Utc> },
}

impl InventoryChange {
    pub fn item_id(&self) -> Option<&ItemId> {
        match self {
            InventoryChange::PendingAdded { item_id, .. }
            | InventoryChange::Promoted { item_id, .. }
            | InventoryChange::Updated { item_id, .. }
            | InventoryChange::Deleted { item_id, .. } => Some(item_id),
            InventoryChange::Loaded { .. } | InventoryChange::Reset { .. } => None,
        }
    }
}

impl Event for InventoryChange {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryChange::PendingAdded { .. } => "inventory.item.pending_added",
            InventoryChange::Promoted { .. } => "inventory.item.promoted",
            InventoryChange::Updated { .. } => "inventory.item.updated",
            InventoryChange::Deleted { .. } => "inventory.item.deleted",
            InventoryChange::Loaded { .. } => "inventory.list.loaded",
            InventoryChange::Reset { .. } => "inventory.list.reset",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InventoryChange::PendingAdded { occurred_at, .. }
            | InventoryChange::Promoted { occurred_at, .. }
            | InventoryChange::Updated { occurred_at, .. }
            | InventoryChange::Deleted { occurred_at, .. }
            | InventoryChange::Loaded { occurred_at, .. }
            | InventoryChange::Reset { occurred_at } => *occurred_at,
        }
    }
}

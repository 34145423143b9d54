//! The inventory state container.
//!
//! Three views over the item lists:
//!
//! - **pending**: recorded, not yet received (`status = pending`)
//! - **inventory**: received items (`status = added`), mirrored to storage
//! - **recent activity**: inventory items added on the current calendar day
//!
//! Mutations update memory synchronously under one write lock and then hand a
//! snapshot of the inventory list to the background writer. Nothing here
//! returns a storage or image error to the caller: failures are logged and the
//! in-memory state stays authoritative.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use stockbook_core::{Clock, DomainResult, Entity, ItemId, SystemClock};
use stockbook_events::{Event, EventBus, InMemoryEventBus, Subscription};
use stockbook_inventory::{
    InventoryChange, InventoryItem, ItemQuery, QrPayload, decode_inventory_list,
};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::images::{FsImageLoader, ImageLoader, validate_images};
use crate::storage::{InMemoryStorage, KeyValueStorage, SqliteStorage};
use crate::writer::{PersistenceStats, PersistenceWriter};

/// A slice of store state consumers can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreView {
    Pending,
    Inventory,
    RecentActivity,
}

const PENDING_VIEWS: &[StoreView] = &[StoreView::Pending];
const INVENTORY_VIEWS: &[StoreView] = &[StoreView::Inventory, StoreView::RecentActivity];
const ALL_VIEWS: &[StoreView] = &[
    StoreView::Pending,
    StoreView::Inventory,
    StoreView::RecentActivity,
];

#[derive(Debug, Default)]
struct InventoryState {
    pending: Vec<InventoryItem>,
    inventory: Vec<InventoryItem>,
    /// Ids into `inventory`, in promotion order.
    recent: Vec<ItemId>,
}

impl InventoryState {
    fn contains(&self, id: &ItemId) -> bool {
        self.pending.iter().any(|item| item.id() == id)
            || self.inventory.iter().any(|item| item.id() == id)
    }

    fn inventory_item(&self, id: &ItemId) -> Option<&InventoryItem> {
        self.inventory.iter().find(|item| item.id() == id)
    }
}

#[derive(Debug, Default)]
struct ViewBuses {
    pending: InMemoryEventBus<InventoryChange>,
    inventory: InMemoryEventBus<InventoryChange>,
    recent: InMemoryEventBus<InventoryChange>,
}

impl ViewBuses {
    fn bus(&self, view: StoreView) -> &InMemoryEventBus<InventoryChange> {
        match view {
            StoreView::Pending => &self.pending,
            StoreView::Inventory => &self.inventory,
            StoreView::RecentActivity => &self.recent,
        }
    }
}

struct Inner {
    state: RwLock<InventoryState>,
    storage: Arc<dyn KeyValueStorage>,
    images: Arc<dyn ImageLoader>,
    clock: Arc<dyn Clock>,
    config: StoreConfig,
    writer: PersistenceWriter,
    buses: ViewBuses,
}

/// Injectable inventory store.
///
/// Cheap to clone; clones share state. Construct with [`InventoryStore::builder`]
/// (inside a Tokio runtime, the background writer is spawned on build).
#[derive(Clone)]
pub struct InventoryStore {
    inner: Arc<Inner>,
}

impl core::fmt::Debug for InventoryStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.read_state();
        f.debug_struct("InventoryStore")
            .field("storage_key", &self.inner.config.storage_key)
            .field("pending", &state.pending.len())
            .field("inventory", &state.inventory.len())
            .field("recent", &state.recent.len())
            .finish()
    }
}

/// Builder for [`InventoryStore`].
///
/// Defaults: in-memory storage, filesystem image loader, system clock,
/// default configuration.
#[derive(Default)]
pub struct InventoryStoreBuilder {
    storage: Option<Arc<dyn KeyValueStorage>>,
    images: Option<Arc<dyn ImageLoader>>,
    clock: Option<Arc<dyn Clock>>,
    config: Option<StoreConfig>,
}

impl InventoryStoreBuilder {
    pub fn storage(mut self, storage: Arc<dyn KeyValueStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn images(mut self, images: Arc<dyn ImageLoader>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Assemble the store and spawn its writer task on the current Tokio
    /// runtime. Outside a runtime the store still works in memory but
    /// persists nothing (logged).
    pub fn build(self) -> InventoryStore {
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(InMemoryStorage::new()));
        let config = self.config.unwrap_or_default();
        let writer = PersistenceWriter::spawn(storage.clone(), config.storage_key.clone());

        InventoryStore {
            inner: Arc::new(Inner {
                state: RwLock::new(InventoryState::default()),
                storage,
                images: self.images.unwrap_or_else(|| Arc::new(FsImageLoader::new())),
                clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
                config,
                writer,
                buses: ViewBuses::default(),
            }),
        }
    }
}

impl InventoryStore {
    pub fn builder() -> InventoryStoreBuilder {
        InventoryStoreBuilder::default()
    }

    /// Open a store backed by the SQLite file named in `config`.
    ///
    /// The persisted list is not read here; call
    /// [`load_inventory_list`](Self::load_inventory_list) explicitly.
    pub async fn open(config: StoreConfig) -> Result<Self, StoreError> {
        let path = config.database_path()?;
        let storage = SqliteStorage::connect(&path).await?;
        tracing::info!(path = %path.display(), key = %config.storage_key, "inventory store opened");

        Ok(Self::builder()
            .storage(Arc::new(storage))
            .config(config)
            .build())
    }

    fn read_state(&self) -> RwLockReadGuard<'_, InventoryState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, InventoryState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, views: &[StoreView], change: InventoryChange) {
        tracing::trace!(event = change.event_type(), ?views, "notifying views");
        for view in views {
            if let Err(err) = self.inner.buses.bus(*view).publish(change.clone()) {
                tracing::warn!(?view, error = %err, "failed to notify subscribers");
            }
        }
    }

    // ---------------------------------------------------------------------
    // Operations
    // ---------------------------------------------------------------------

    /// Append `item` to the pending list, keeping only images that load.
    ///
    /// The item enters as `pending` whatever status it carried. An id that is
    /// already present in either list is ignored.
    pub async fn add_pending_item(&self, mut item: InventoryItem) {
        item.images = validate_images(self.inner.images.as_ref(), item.images).await;
        let item = item.into_pending();
        let id = item.id().clone();

        {
            let mut state = self.write_state();
            if state.contains(&id) {
                tracing::warn!(item_id = %id, "ignoring pending item with an id already in the store");
                return;
            }
            state.pending.push(item);
        }

        tracing::debug!(item_id = %id, "pending item added");
        self.notify(
            PENDING_VIEWS,
            InventoryChange::PendingAdded {
                item_id: id,
                occurred_at: self.inner.clock.now(),
            },
        );
    }

    /// Promote a pending item into the inventory.
    ///
    /// Returns `false` (and changes nothing) when `id` is not pending. The
    /// lookup, removal and append happen under one lock, so back-to-back
    /// promotions each see the result of the previous one.
    pub fn mark_item_as_added(&self, id: &ItemId) -> bool {
        let clock = &self.inner.clock;
        let now = clock.now();
        let today = clock.local_date(now);

        {
            let mut state = self.write_state();
            let Some(position) = state.pending.iter().position(|item| item.id() == id) else {
                tracing::debug!(item_id = %id, "mark as added: no pending item with this id");
                return false;
            };

            let item = state.pending.remove(position).promote(now);
            state.inventory.push(item);

            let InventoryState {
                inventory, recent, ..
            } = &mut *state;
            recent.retain(|recent_id| {
                inventory
                    .iter()
                    .find(|item| item.id() == recent_id)
                    .is_some_and(|item| clock.local_date(item.added_at()) == today)
            });
            recent.push(id.clone());

            // Scheduled under the lock so snapshots reach the writer in
            // mutation order.
            self.inner.writer.schedule(state.inventory.clone());
        }
        tracing::info!(item_id = %id, "item marked as added");
        self.notify(
            ALL_VIEWS,
            InventoryChange::Promoted {
                item_id: id.clone(),
                occurred_at: now,
            },
        );
        true
    }

    /// Replace the in-memory inventory list with the persisted one.
    ///
    /// A missing slot, a read failure or an unparseable payload leaves the
    /// list as it was.
    pub async fn load_inventory_list(&self) {
        let key = &self.inner.config.storage_key;

        let payload = match self.inner.storage.get(key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                tracing::debug!(key = %key, "no persisted inventory list");
                return;
            }
            Err(err) => {
                tracing::error!(key = %key, error = %err, "failed to load inventory list");
                return;
            }
        };

        let items = match decode_inventory_list(&payload) {
            Ok(items) => items,
            Err(err) => {
                tracing::error!(key = %key, error = %err, "failed to parse persisted inventory list");
                return;
            }
        };

        let count = {
            let mut state = self.write_state();
            let mut loaded: Vec<InventoryItem> = Vec::with_capacity(items.len());
            for item in items {
                if loaded.iter().any(|existing| existing.id() == item.id()) {
                    tracing::warn!(item_id = %item.id(), "skipping duplicate id in persisted list");
                    continue;
                }
                // Entries of the persisted list are in stock by definition.
                let item = if item.is_pending() {
                    let at = item.added_at();
                    item.promote(at)
                } else {
                    item
                };
                loaded.push(item);
            }

            state
                .pending
                .retain(|pending| !loaded.iter().any(|item| item.id() == pending.id()));
            let InventoryState { recent, .. } = &mut *state;
            recent.retain(|id| loaded.iter().any(|item| item.id() == id));
            state.inventory = loaded;
            state.inventory.len()
        };

        tracing::info!(key = %key, items = count, "inventory list loaded");
        self.notify(
            ALL_VIEWS,
            InventoryChange::Loaded {
                count,
                occurred_at: self.inner.clock.now(),
            },
        );
    }

    /// Overwrite an item's fields in whichever list holds it, then persist the
    /// inventory list.
    ///
    /// Images are re-validated like on add. Identity, status and the added
    /// timestamp stay those of the stored item. Returns `false` for an
    /// unknown id, which writes nothing.
    pub async fn update_item(&self, mut item: InventoryItem) -> bool {
        item.images = validate_images(self.inner.images.as_ref(), item.images).await;
        let id = item.id().clone();

        let views = {
            let mut state = self.write_state();

            let views = if let Some(slot) = state.pending.iter_mut().find(|stored| stored.id() == &id) {
                *slot = item.with_lifecycle_of(slot);
                PENDING_VIEWS
            } else if let Some(slot) = state.inventory.iter_mut().find(|stored| stored.id() == &id) {
                *slot = item.with_lifecycle_of(slot);
                INVENTORY_VIEWS
            } else {
                tracing::debug!(item_id = %id, "update: no item with this id");
                return false;
            };

            self.inner.writer.schedule(state.inventory.clone());
            views
        };

        tracing::debug!(item_id = %id, "item updated");
        self.notify(
            views,
            InventoryChange::Updated {
                item_id: id,
                occurred_at: self.inner.clock.now(),
            },
        );
        true
    }

    /// Remove `id` from every list and persist the inventory list. Returns
    /// whether anything was removed; an unknown id writes nothing.
    pub fn delete_item(&self, id: &ItemId) -> bool {
        let (removed_pending, removed_inventory) = {
            let mut state = self.write_state();

            let pending_before = state.pending.len();
            state.pending.retain(|item| item.id() != id);
            let removed_pending = state.pending.len() != pending_before;

            let inventory_before = state.inventory.len();
            state.inventory.retain(|item| item.id() != id);
            let removed_inventory = state.inventory.len() != inventory_before;

            state.recent.retain(|recent_id| recent_id != id);

            if removed_pending || removed_inventory {
                self.inner.writer.schedule(state.inventory.clone());
            }
            (removed_pending, removed_inventory)
        };

        if !removed_pending && !removed_inventory {
            tracing::debug!(item_id = %id, "delete: no item with this id");
            return false;
        }

        let views = match (removed_pending, removed_inventory) {
            (true, true) => ALL_VIEWS,
            (true, false) => PENDING_VIEWS,
            _ => INVENTORY_VIEWS,
        };

        tracing::info!(item_id = %id, "item deleted");
        self.notify(
            views,
            InventoryChange::Deleted {
                item_id: id.clone(),
                occurred_at: self.inner.clock.now(),
            },
        );
        true
    }

    // ---------------------------------------------------------------------
    // Views
    // ---------------------------------------------------------------------

    pub fn pending_stocks(&self) -> Vec<InventoryItem> {
        self.read_state().pending.clone()
    }

    pub fn inventory_list(&self) -> Vec<InventoryItem> {
        self.read_state().inventory.clone()
    }

    /// Inventory items added today, in promotion order.
    pub fn recent_activity(&self) -> Vec<InventoryItem> {
        let clock = &self.inner.clock;
        let today = clock.today();
        let state = self.read_state();

        state
            .recent
            .iter()
            .filter_map(|id| state.inventory_item(id))
            .filter(|item| clock.local_date(item.added_at()) == today)
            .cloned()
            .collect()
    }

    pub fn find(&self, id: &ItemId) -> Option<InventoryItem> {
        let state = self.read_state();
        state
            .pending
            .iter()
            .chain(state.inventory.iter())
            .find(|item| item.id() == id)
            .cloned()
    }

    /// Resolve scanned QR label text to the stored item it names.
    pub fn find_by_qr(&self, text: &str) -> DomainResult<Option<InventoryItem>> {
        let payload = QrPayload::parse(text)?;
        Ok(self.find(&payload.id))
    }

    /// Filter/sort the inventory list.
    pub fn query(&self, query: &ItemQuery) -> Vec<InventoryItem> {
        let state = self.read_state();
        query.apply(&state.inventory, self.inner.clock.as_ref())
    }

    /// Be told whenever `view` changes.
    pub fn subscribe(&self, view: StoreView) -> Subscription<InventoryChange> {
        self.inner.buses.bus(view).subscribe()
    }

    // ---------------------------------------------------------------------
    // Persistence control / test support
    // ---------------------------------------------------------------------

    /// Wait until every write scheduled so far has been attempted.
    pub async fn flush(&self) {
        self.inner.writer.flush().await;
    }

    pub fn persistence_stats(&self) -> PersistenceStats {
        self.inner.writer.stats()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Clear every in-memory list. Storage is left untouched.
    pub fn reset(&self) {
        {
            let mut state = self.write_state();
            *state = InventoryState::default();
        }
        self.notify(
            ALL_VIEWS,
            InventoryChange::Reset {
                occurred_at: self.inner.clock.now(),
            },
        );
    }
}

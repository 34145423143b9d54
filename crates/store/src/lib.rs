//! `stockbook-store`
//!
//! **Responsibility:** the inventory state container and its durable mirror.
//!
//! This crate provides:
//! - [`InventoryStore`]: the only place item lists are mutated
//! - key-value storage backends (in-memory, SQLite)
//! - image reference validation
//! - a background writer that mirrors the inventory list to storage
//!
//! In-memory state is authoritative. Storage is a best-effort copy that can
//! lag one mutation behind if the process exits mid-write.

pub mod config;
pub mod error;
pub mod images;
pub mod storage;
pub mod store;
mod writer;

pub use config::StoreConfig;
pub use error::{ConfigError, ImageError, StorageError, StoreError};
pub use images::{FsImageLoader, ImageLoader, validate_images};
pub use storage::{InMemoryStorage, KeyValueStorage, SqliteStorage};
pub use store::{InventoryStore, InventoryStoreBuilder, StoreView};
pub use writer::PersistenceStats;

//! Inventory domain module.
//!
//! This crate contains the item model and the pure logic around it (image set
//! bookkeeping, persisted record format, QR payloads, list queries). No IO, no
//! async, no storage.

pub mod change;
pub mod draft;
pub mod images;
pub mod item;
pub mod qr;
pub mod query;
pub mod record;

pub use change::InventoryChange;
pub use draft::ItemDraft;
pub use images::ImageSet;
pub use item::{ColorEntry, InventoryItem, ItemStatus, Packaging, Pricing, SellingUnit, SpecificationEntry};
pub use qr::QrPayload;
pub use query::{ItemQuery, SortOrder};
pub use record::{ItemRecord, decode_inventory_list, encode_inventory_list};

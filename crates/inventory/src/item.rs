use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{Entity, ItemId, ValueObject};

use crate::images::ImageSet;
use crate::record::{ItemRecord, finite_or_zero, number_or_zero};

/// Lifecycle status of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Recorded but not yet confirmed as received.
    Pending,
    /// Promoted into the inventory list.
    Added,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Added => "added",
        }
    }
}

/// One colour variant and how many units of it are stocked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorEntry {
    pub name: String,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub quantity: f64,
    /// Hex colour code, e.g. `#ff0000`. Empty when unknown.
    pub code: String,
}

impl ValueObject for ColorEntry {}

impl ColorEntry {
    pub(crate) fn finite(self) -> Self {
        Self {
            quantity: finite_or_zero(self.quantity),
            ..self
        }
    }
}

/// A titled specification line ("Material: steel").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificationEntry {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl ValueObject for SpecificationEntry {}

impl SpecificationEntry {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Packaging metadata (all optional).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Packaging {
    pub item_per_pack: Option<f64>,
    pub item_per_pack_unit: Option<String>,
    pub box_quantity: Option<f64>,
    pub box_unit: Option<String>,
}

impl ValueObject for Packaging {}

/// Purchase/sale price pair, in the shop's currency.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pricing {
    pub purchased: f64,
    pub selling: f64,
}

impl ValueObject for Pricing {}

impl Pricing {
    pub fn new(purchased: f64, selling: f64) -> Self {
        Self { purchased, selling }
    }
}

/// Quantity/unit an item is sold in (e.g. 1 "kg").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SellingUnit {
    pub quantity: Option<f64>,
    pub unit: Option<String>,
}

impl ValueObject for SellingUnit {}

/// A stocked product.
///
/// Descriptive fields are public and freely editable. Identity, status and the
/// added timestamp only change through the lifecycle methods so the list
/// invariants held by the store cannot be broken from outside.
///
/// Serialization goes through [`ItemRecord`], which is where the legacy single
/// `color` / `specifications` / `imageUri` fields are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ItemRecord", into = "ItemRecord")]
pub struct InventoryItem {
    id: ItemId,
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: Option<String>,
    pub packaging: Packaging,
    pub company_name: String,
    pub pricing: Pricing,
    pub quality: Option<String>,
    pub description: String,
    pub specifications: Vec<SpecificationEntry>,
    pub colors: Vec<ColorEntry>,
    pub selling: SellingUnit,
    pub images: ImageSet,
    /// Serialized QR payload printed on the item label.
    pub qr_data: String,
    added_at: DateTime<Utc>,
    status: ItemStatus,
}

impl InventoryItem {
    /// Create a pending item with empty optional metadata.
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        category: impl Into<String>,
        quantity: f64,
        pricing: Pricing,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category: category.into(),
            quantity,
            unit: None,
            packaging: Packaging::default(),
            company_name: String::new(),
            pricing,
            quality: None,
            description: String::new(),
            specifications: Vec::new(),
            colors: Vec::new(),
            selling: SellingUnit::default(),
            images: ImageSet::default(),
            qr_data: String::new(),
            added_at: created_at,
            status: ItemStatus::Pending,
        }
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    pub fn is_pending(&self) -> bool {
        self.status == ItemStatus::Pending
    }

    /// Promote to `added`, stamping the promotion time.
    pub fn promote(mut self, at: DateTime<Utc>) -> Self {
        self.status = ItemStatus::Added;
        self.added_at = at;
        self
    }

    /// Force the item back to `pending`. Used when an item enters the pending
    /// list with whatever status the caller left on it.
    pub fn into_pending(mut self) -> Self {
        self.status = ItemStatus::Pending;
        self
    }

    /// Take the lifecycle fields (status, timestamp) from `stored`, keeping
    /// everything else from `self`. Edits never move an item through its
    /// lifecycle.
    pub fn with_lifecycle_of(mut self, stored: &InventoryItem) -> Self {
        self.status = stored.status;
        self.added_at = stored.added_at;
        self
    }

    /// Legacy single-colour name: the first structured entry.
    pub fn legacy_color(&self) -> Option<&str> {
        self.colors.first().map(|c| c.name.as_str())
    }

    /// Legacy newline-joined specification text.
    pub fn legacy_specifications(&self) -> String {
        self.specifications
            .iter()
            .map(|spec| {
                if spec.description.is_empty() {
                    spec.title.clone()
                } else {
                    format!("{}: {}", spec.title, spec.description)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Total units across colour variants.
    pub fn color_quantity(&self) -> f64 {
        self.colors.iter().map(|c| c.quantity).sum()
    }

    pub(crate) fn from_parts(id: ItemId, added_at: DateTime<Utc>, status: ItemStatus) -> Self {
        let mut item = Self::new(id, "", "", 0.0, Pricing::default(), added_at);
        item.status = status;
        item
    }
}

impl Entity for InventoryItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

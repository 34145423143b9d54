//! QR label payload.
//!
//! Labels carry a JSON object describing the item at the time it was recorded.
//! Scanning a label resolves back to a stored item through `id`; the rest of
//! the payload is informational (a label may be older than the stored item).
//! Decoding the QR image itself happens outside this crate.

use serde::{Deserialize, Serialize};

use stockbook_core::{DomainError, DomainResult, Entity, ItemId};

use crate::item::{ColorEntry, InventoryItem, SpecificationEntry};
use crate::record::{finite_or_zero, number_or_zero};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    pub id: ItemId,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub item_category: String,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_per_pack: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_per_pack_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub how_much_in_one_box: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub how_much_in_one_box_unit: Option<String>,
    #[serde(default)]
    pub company_name: String,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub purchased_price: f64,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub selling_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selling_quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selling_unit: Option<String>,
    #[serde(default)]
    pub colors: Vec<ColorEntry>,
    #[serde(default)]
    pub specifications_list: Vec<SpecificationEntry>,
}

impl QrPayload {
    pub fn from_item(item: &InventoryItem) -> Self {
        Self {
            id: item.id().clone(),
            item_name: item.name.clone(),
            item_category: item.category.clone(),
            quantity: finite_or_zero(item.quantity),
            unit: item.unit.clone(),
            item_per_pack: item.packaging.item_per_pack.map(finite_or_zero),
            item_per_pack_unit: item.packaging.item_per_pack_unit.clone(),
            how_much_in_one_box: item.packaging.box_quantity.map(finite_or_zero),
            how_much_in_one_box_unit: item.packaging.box_unit.clone(),
            company_name: item.company_name.clone(),
            purchased_price: finite_or_zero(item.pricing.purchased),
            selling_price: finite_or_zero(item.pricing.selling),
            quality: item.quality.clone(),
            description: item.description.clone(),
            selling_quantity: item.selling.quantity.map(finite_or_zero),
            selling_unit: item.selling.unit.clone(),
            colors: item.colors.iter().cloned().map(ColorEntry::finite).collect(),
            specifications_list: item.specifications.clone(),
        }
    }

    /// Parse scanned label text.
    ///
    /// Unknown keys are ignored; labels printed by older builds also carry
    /// image and legacy fields.
    pub fn parse(text: &str) -> DomainResult<Self> {
        let payload: QrPayload = serde_json::from_str(text.trim())
            .map_err(|e| DomainError::malformed(format!("qr payload: {e}")))?;

        if payload.id.as_str().trim().is_empty() {
            return Err(DomainError::invalid_id("qr payload has an empty id"));
        }
        Ok(payload)
    }

    pub fn to_json(&self) -> DomainResult<String> {
        serde_json::to_string(self)
            .map_err(|e| DomainError::malformed(format!("qr payload encode: {e}")))
    }
}

impl InventoryItem {
    /// Regenerate `qr_data` from the current fields.
    pub fn refresh_qr_data(&mut self) -> DomainResult<()> {
        self.qr_data = QrPayload::from_item(self).to_json()?;
        Ok(())
    }
}

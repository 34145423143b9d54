//! Persisted record format.
//!
//! The durable slot holds a JSON array of camelCase item records. Records
//! written by older builds carry only the single `color` / `specifications` /
//! `imageUri` fields; newer ones carry the structured lists as well. The
//! structured lists are the source of truth in memory; the legacy fields are
//! derived here on write and folded back in on read when the lists are empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use stockbook_core::{DomainError, DomainResult, Entity, ItemId};

use crate::images::ImageSet;
use crate::item::{
    ColorEntry, InventoryItem, ItemStatus, Packaging, Pricing, SellingUnit, SpecificationEntry,
};

/// Wire shape of one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: ItemId,
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
    /// Legacy newline-joined specification text.
    #[serde(default)]
    pub specifications: String,
    #[serde(default)]
    pub specifications_list: Vec<SpecificationEntry>,
    /// Legacy single colour name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub colors: Vec<ColorEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selling_quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selling_unit: Option<String>,
    /// Legacy main image URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    #[serde(default)]
    pub image_uris: Vec<String>,
    #[serde(default)]
    pub main_image_index: usize,
    #[serde(default)]
    pub qr_data: String,
    pub added_at: DateTime<Utc>,
    pub status: ItemStatus,
}

impl From<InventoryItem> for ItemRecord {
    fn from(item: InventoryItem) -> Self {
        let color = item.legacy_color().map(str::to_string);
        let specifications = item.legacy_specifications();
        let image_uri = item.images.main_uri().map(str::to_string);

        Self {
            id: item.id().clone(),
            added_at: item.added_at(),
            status: item.status(),
            item_name: item.name,
            item_category: item.category,
            quantity: finite_or_zero(item.quantity),
            unit: item.unit,
            item_per_pack: item.packaging.item_per_pack.map(finite_or_zero),
            item_per_pack_unit: item.packaging.item_per_pack_unit,
            how_much_in_one_box: item.packaging.box_quantity.map(finite_or_zero),
            how_much_in_one_box_unit: item.packaging.box_unit,
            company_name: item.company_name,
            purchased_price: finite_or_zero(item.pricing.purchased),
            selling_price: finite_or_zero(item.pricing.selling),
            quality: item.quality,
            description: item.description,
            specifications,
            specifications_list: item.specifications,
            color,
            colors: item.colors.into_iter().map(ColorEntry::finite).collect(),
            selling_quantity: item.selling.quantity.map(finite_or_zero),
            selling_unit: item.selling.unit,
            image_uri,
            main_image_index: item.images.main_index(),
            image_uris: item.images.uris().to_vec(),
            qr_data: item.qr_data,
        }
    }
}

impl From<ItemRecord> for InventoryItem {
    fn from(record: ItemRecord) -> Self {
        let colors = if record.colors.is_empty() {
            record
                .color
                .filter(|name| !name.trim().is_empty())
                .map(|name| {
                    vec![ColorEntry {
                        name,
                        quantity: 0.0,
                        code: String::new(),
                    }]
                })
                .unwrap_or_default()
        } else {
            record.colors
        };

        let specifications = if record.specifications_list.is_empty() {
            parse_legacy_specifications(&record.specifications)
        } else {
            record.specifications_list
        };

        let images = if record.image_uris.is_empty() {
            ImageSet::from_uris(record.image_uri.into_iter().collect())
        } else {
            ImageSet::new(record.image_uris, record.main_image_index)
        };

        let mut item = InventoryItem::from_parts(record.id, record.added_at, record.status);
        item.name = record.item_name;
        item.category = record.item_category;
        item.quantity = record.quantity;
        item.unit = record.unit;
        item.packaging = Packaging {
            item_per_pack: record.item_per_pack,
            item_per_pack_unit: record.item_per_pack_unit,
            box_quantity: record.how_much_in_one_box,
            box_unit: record.how_much_in_one_box_unit,
        };
        item.company_name = record.company_name;
        item.pricing = Pricing::new(record.purchased_price, record.selling_price);
        item.quality = record.quality;
        item.description = record.description;
        item.specifications = specifications;
        item.colors = colors;
        item.selling = SellingUnit {
            quantity: record.selling_quantity,
            unit: record.selling_unit,
        };
        item.images = images;
        item.qr_data = record.qr_data;
        item
    }
}

/// JSON has no NaN or infinity; such values are written as zero so one bad
/// number cannot make the whole list unreadable.
pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Reads `null` (how non-finite numbers were written by older builds) as zero.
pub(crate) fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

/// Split legacy `title: description` lines into structured entries.
fn parse_legacy_specifications(text: &str) -> Vec<SpecificationEntry> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once(": ") {
            Some((title, description)) => SpecificationEntry::new(title, description),
            None => SpecificationEntry::new(line, ""),
        })
        .collect()
}

/// Serialize a list for the durable slot.
pub fn encode_inventory_list(items: &[InventoryItem]) -> DomainResult<String> {
    serde_json::to_string(items)
        .map_err(|e| DomainError::malformed(format!("inventory list encode: {e}")))
}

/// Parse the durable slot back into items, timestamps re-hydrated.
pub fn decode_inventory_list(payload: &str) -> DomainResult<Vec<InventoryItem>> {
    serde_json::from_str(payload)
        .map_err(|e| DomainError::malformed(format!("inventory list decode: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-10T09:15:30Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn sample_item() -> InventoryItem {
        let mut item = InventoryItem::new(
            ItemId::from("item-1"),
            "Paint",
            "Paint",
            12.0,
            Pricing::new(40.0, 55.5),
            test_time(),
        )
        .promote(test_time());
        item.unit = Some("l".into());
        item.colors = vec![ColorEntry {
            name: "White".into(),
            quantity: 12.0,
            code: "#ffffff".into(),
        }];
        item.specifications = vec![SpecificationEntry::new("Finish", "matte")];
        item.images = ImageSet::new(vec!["file:///a.png".into(), "file:///b.png".into()], 1);
        item
    }

    #[test]
    fn record_carries_derived_legacy_fields() {
        let json = serde_json::to_value(sample_item()).unwrap();

        assert_eq!(json["itemName"], "Paint");
        assert_eq!(json["status"], "added");
        assert_eq!(json["color"], "White");
        assert_eq!(json["specifications"], "Finish: matte");
        assert_eq!(json["imageUri"], "file:///b.png");
        assert_eq!(json["mainImageIndex"], 1);
        assert_eq!(json["addedAt"], "2024-05-10T09:15:30Z");
        assert!(json.get("quality").is_none());
    }

    #[test]
    fn list_survives_encode_decode() {
        let items = vec![sample_item()];
        let payload = encode_inventory_list(&items).unwrap();
        let decoded = decode_inventory_list(&payload).unwrap();

        assert_eq!(decoded, items);
        assert_eq!(decoded[0].added_at(), test_time());
    }

    #[test]
    fn legacy_only_records_are_folded_into_structured_fields() {
        let payload = r#"[{
            "id": "old-1",
            "itemName": "Nails",
            "itemCategory": "Nails",
            "quantity": 5,
            "companyName": "Acme",
            "purchasedPrice": 100,
            "sellingPrice": 150,
            "description": "",
            "specifications": "Length: 5cm\nGalvanized",
            "color": "Grey",
            "imageUri": "file:///nails.png",
            "qrData": "{}",
            "addedAt": "2024-05-09T18:00:00.000Z",
            "status": "added"
        }]"#;

        let items = decode_inventory_list(payload).unwrap();
        let item = &items[0];

        assert_eq!(item.id().as_str(), "old-1");
        assert_eq!(item.colors.len(), 1);
        assert_eq!(item.colors[0].name, "Grey");
        assert_eq!(
            item.specifications,
            vec![
                SpecificationEntry::new("Length", "5cm"),
                SpecificationEntry::new("Galvanized", ""),
            ]
        );
        assert_eq!(item.images.main_uri(), Some("file:///nails.png"));
        assert_eq!(item.status(), ItemStatus::Added);
    }

    #[test]
    fn structured_lists_win_over_legacy_fields() {
        let payload = r##"[{
            "id": "new-1",
            "itemName": "Paint",
            "specifications": "stale text",
            "specificationsList": [{"title": "Finish", "description": "gloss"}],
            "color": "Stale",
            "colors": [{"name": "Blue", "quantity": 2, "code": "#0000ff"}],
            "imageUris": ["a", "b"],
            "mainImageIndex": 9,
            "addedAt": "2024-05-09T18:00:00Z",
            "status": "pending"
        }]"##;

        let item = decode_inventory_list(payload).unwrap().remove(0);
        assert_eq!(item.colors[0].name, "Blue");
        assert_eq!(item.specifications[0].description, "gloss");
        assert_eq!(item.images.main_index(), 0);
        assert!(item.is_pending());
    }

    #[test]
    fn non_finite_numbers_do_not_poison_the_list() {
        let mut broken = InventoryItem::new(
            ItemId::from("nan-1"),
            "Nails",
            "Nails",
            f64::INFINITY,
            Pricing::new(f64::NAN, f64::INFINITY),
            test_time(),
        )
        .promote(test_time());
        broken.colors = vec![ColorEntry {
            name: "Grey".into(),
            quantity: f64::NAN,
            code: String::new(),
        }];
        broken.selling.quantity = Some(f64::NEG_INFINITY);

        let payload = encode_inventory_list(&[broken, sample_item()]).unwrap();
        assert!(!payload.contains("null"), "{payload}");

        let decoded = decode_inventory_list(&payload).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].pricing, Pricing::new(0.0, 0.0));
        assert_eq!(decoded[0].quantity, 0.0);
        assert_eq!(decoded[0].colors[0].quantity, 0.0);
        assert_eq!(decoded[0].selling.quantity, Some(0.0));
        assert_eq!(decoded[1], sample_item());
    }

    #[test]
    fn null_numbers_from_older_builds_read_as_zero() {
        let payload = r#"[
            {"id": "a", "itemName": "A", "quantity": null, "purchasedPrice": null,
             "sellingPrice": 3, "colors": [{"name": "Red", "quantity": null, "code": ""}],
             "addedAt": "2024-05-09T18:00:00Z", "status": "added"},
            {"id": "b", "itemName": "B", "addedAt": "2024-05-09T18:00:00Z", "status": "added"}
        ]"#;

        let items = decode_inventory_list(payload).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].pricing, Pricing::new(0.0, 3.0));
        assert_eq!(items[0].colors[0].quantity, 0.0);
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert!(matches!(
            decode_inventory_list("not json"),
            Err(DomainError::Malformed(_))
        ));

        let bad_timestamp = r#"[{"id": "x", "itemName": "X", "addedAt": "yesterday", "status": "added"}]"#;
        assert!(decode_inventory_list(bad_timestamp).is_err());

        let bad_status = r#"[{"id": "x", "itemName": "X", "addedAt": "2024-05-09T18:00:00Z", "status": "sold"}]"#;
        assert!(decode_inventory_list(bad_status).is_err());
    }
}

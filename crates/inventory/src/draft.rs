use chrono::{DateTime, Utc};

use stockbook_core::{DomainError, DomainResult, ItemId};

use crate::images::ImageSet;
use crate::item::{
    ColorEntry, InventoryItem, Packaging, Pricing, SellingUnit, SpecificationEntry,
};

/// Output of the add-item form, before it has an id or a lifecycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDraft {
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
    pub image_uris: Vec<String>,
    pub main_image_index: usize,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>, category: impl Into<String>, quantity: f64) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            quantity,
            ..Self::default()
        }
    }

    fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("item name cannot be empty"));
        }
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(DomainError::validation("quantity must be greater than zero"));
        }
        let prices = [self.pricing.purchased, self.pricing.selling];
        if prices.iter().any(|price| !price.is_finite() || *price < 0.0) {
            return Err(DomainError::validation("prices must be finite and not negative"));
        }
        Ok(())
    }

    /// Turn the draft into a pending item with a filled-in QR payload.
    pub fn into_pending(self, id: ItemId, now: DateTime<Utc>) -> DomainResult<InventoryItem> {
        self.validate()?;

        let mut item = InventoryItem::new(
            id,
            self.name.trim(),
            self.category,
            self.quantity,
            self.pricing,
            now,
        );
        item.unit = self.unit;
        item.packaging = self.packaging;
        item.company_name = self.company_name;
        item.quality = self.quality;
        item.description = self.description;
        item.specifications = self.specifications;
        item.colors = self.colors;
        item.selling = self.selling;
        item.images = ImageSet::new(self.image_uris, self.main_image_index);
        item.refresh_qr_data()?;
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemStatus;
    use crate::qr::QrPayload;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn draft_becomes_pending_item_with_qr_payload() {
        let mut draft = ItemDraft::new("  Nails ", "Nails", 5.0);
        draft.unit = Some("kg".into());
        draft.pricing = Pricing::new(100.0, 150.0);
        draft.image_uris = vec!["file:///a.png".into()];

        let item = draft.into_pending(ItemId::from("d-1"), now()).unwrap();
        assert_eq!(item.status(), ItemStatus::Pending);
        assert_eq!(item.name, "Nails");
        assert_eq!(item.images.len(), 1);

        let payload = QrPayload::parse(&item.qr_data).unwrap();
        assert_eq!(payload.id.as_str(), "d-1");
        assert_eq!(payload.purchased_price, 100.0);
    }

    #[test]
    fn draft_rejects_blank_name() {
        let err = ItemDraft::new("   ", "Nails", 1.0)
            .into_pending(ItemId::from("d-2"), now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn draft_rejects_non_positive_quantity() {
        for quantity in [0.0, -1.0, f64::NAN] {
            let result = ItemDraft::new("Paint", "Paint", quantity)
                .into_pending(ItemId::from("d-3"), now());
            assert!(matches!(result, Err(DomainError::Validation(_))), "quantity {quantity}");
        }
    }

    #[test]
    fn draft_rejects_negative_or_non_finite_prices() {
        let bad = [
            Pricing::new(-1.0, 10.0),
            Pricing::new(f64::NAN, 10.0),
            Pricing::new(5.0, f64::INFINITY),
            Pricing::new(f64::NEG_INFINITY, 1.0),
        ];
        for pricing in bad {
            let mut draft = ItemDraft::new("Paint", "Paint", 1.0);
            draft.pricing = pricing;
            let result = draft.into_pending(ItemId::from("d-4"), now());
            assert!(matches!(result, Err(DomainError::Validation(_))), "{pricing:?}");
        }
    }

    #[test]
    fn draft_rejects_infinite_quantity() {
        let result = ItemDraft::new("Paint", "Paint", f64::INFINITY)
            .into_pending(ItemId::from("d-5"), now());
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}

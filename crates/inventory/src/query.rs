//! Filtering and sorting of item lists for list screens.
//!
//! A query is re-evaluated from scratch on every input change: a linear filter
//! pass followed by a stable sort, O(n log n).

use std::cmp::Ordering;

use chrono::NaiveDate;

use stockbook_core::Clock;

use crate::item::InventoryItem;

/// Sort orders offered by the inventory list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Purchased price, high to low.
    HighestPrice,
    /// Purchased price, low to high.
    LowestPrice,
    /// Most recently added first.
    Newest,
    /// Oldest first.
    Oldest,
}

impl SortOrder {
    fn compare(&self, a: &InventoryItem, b: &InventoryItem) -> Ordering {
        match self {
            SortOrder::HighestPrice => b.pricing.purchased.total_cmp(&a.pricing.purchased),
            SortOrder::LowestPrice => a.pricing.purchased.total_cmp(&b.pricing.purchased),
            SortOrder::Newest => b.added_at().cmp(&a.added_at()),
            SortOrder::Oldest => a.added_at().cmp(&b.added_at()),
        }
    }
}

/// Filter/sort criteria. Empty criteria match everything and keep input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemQuery {
    /// Case-insensitive substring of name or category.
    pub search: Option<String>,
    /// Exact category.
    pub category: Option<String>,
    /// Calendar day the item was added on.
    pub added_on: Option<NaiveDate>,
    pub sort: Option<SortOrder>,
}

impl ItemQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn added_on(mut self, date: NaiveDate) -> Self {
        self.added_on = Some(date);
        self
    }

    pub fn sort(mut self, order: SortOrder) -> Self {
        self.sort = Some(order);
        self
    }

    /// Does `item` pass every filter? Calendar days are taken from `clock`.
    pub fn matches(&self, item: &InventoryItem, clock: &dyn Clock) -> bool {
        if let Some(needle) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = needle.to_lowercase();
            if !item.name.to_lowercase().contains(&needle)
                && !item.category.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        if let Some(category) = &self.category {
            if &item.category != category {
                return false;
            }
        }

        if let Some(date) = self.added_on {
            if clock.local_date(item.added_at()) != date {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, items: &[InventoryItem], clock: &dyn Clock) -> Vec<InventoryItem> {
        let mut selected: Vec<InventoryItem> = items
            .iter()
            .filter(|item| self.matches(item, clock))
            .cloned()
            .collect();

        if let Some(order) = self.sort {
            selected.sort_by(|a, b| order.compare(a, b));
        }
        selected
    }
}

use chrono::{DateTime, Local, NaiveDate};
use rust_decimal::Decimal;

use pharmstock_core::{DomainError, DomainResult, ItemId};

use crate::item::InventoryItem;
use crate::stats::InventoryStats;

/// Items below this quantity are low on stock unless configured otherwise.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

/// Ordered collection of stock items.
///
/// Insertion order is preserved and ids are not required to be unique; lookups
/// by id return the first match. Items are never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    items: Vec<InventoryItem>,
}

impl Inventory {
    pub fn from_items(items: Vec<InventoryItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InventoryItem> {
        self.items.iter()
    }

    /// First item carrying `id`.
    pub fn get(&self, id: &ItemId) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.item_id() == id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.get(id).is_some()
    }

    /// Append an item and return a reference to it.
    pub fn push(&mut self, item: InventoryItem) -> &InventoryItem {
        self.items.push(item);
        &self.items[self.items.len() - 1]
    }

    /// Set the quantity of the first item carrying `id` and stamp it with `today`.
    ///
    /// Leaves the collection untouched when no item matches.
    pub fn update_quantity(
        &mut self,
        id: &ItemId,
        quantity: u32,
        today: NaiveDate,
    ) -> DomainResult<&InventoryItem> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.item_id() == id)
            .ok_or_else(|| DomainError::not_found(id.as_str()))?;
        item.set_quantity(quantity, today);
        Ok(item)
    }

    /// Items whose name or id contains `query`, ignoring case.
    ///
    /// An empty query matches everything.
    pub fn filter(&self, query: &str) -> Vec<&InventoryItem> {
        if query.is_empty() {
            return self.items.iter().collect();
        }
        let needle = query.to_lowercase();
        self.items
            .iter()
            .filter(|item| item.matches_lowercase(&needle))
            .collect()
    }

    /// Items with quantity strictly below `threshold`.
    pub fn low_stock(&self, threshold: u32) -> Vec<&InventoryItem> {
        self.items
            .iter()
            .filter(|item| item.is_low_stock(threshold))
            .collect()
    }

    pub fn statistics(&self, threshold: u32, computed_at: DateTime<Local>) -> InventoryStats {
        InventoryStats {
            total_items: self.items.len(),
            total_quantity: self.items.iter().map(|i| u64::from(i.quantity())).sum(),
            low_stock_count: self.items.iter().filter(|i| i.is_low_stock(threshold)).count(),
            low_stock_threshold: threshold,
            stock_value: self.stock_value(),
            computed_at,
        }
    }

    /// Σ quantity × price over items with a numeric price, or `None` when the
    /// total does not fit in a `Decimal`.
    fn stock_value(&self) -> Option<Decimal> {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |total, item| match item.price().amount() {
                Some(price) => total.checked_add(price.checked_mul(Decimal::from(item.quantity()))?),
                None => Some(total),
            })
    }
}

impl<'a> IntoIterator for &'a Inventory {
    type Item = &'a InventoryItem;
    type IntoIter = std::slice::Iter<'a, InventoryItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<InventoryItem> for Inventory {
    fn from_iter<T: IntoIterator<Item = InventoryItem>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<InventoryItem>> for Inventory {
    fn from(items: Vec<InventoryItem>) -> Self {
        Self::from_items(items)
    }
}

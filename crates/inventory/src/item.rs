use core::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pharmstock_core::{DomainError, DomainResult, Entity, ItemId, ValueObject};

/// Categories offered by the presentation layer. The store accepts any
/// non-blank category; this list is a suggestion, not a constraint.
pub const KNOWN_CATEGORIES: [&str; 6] = [
    "Pain Relief",
    "Antibiotic",
    "Cholesterol",
    "Asthma",
    "Diabetes",
    "Other",
];

/// Unit price of an item.
///
/// Stored as the exact text it was created from so it round-trips through the
/// data file unchanged. Arithmetic goes through [`Price::amount`], never floats.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(String);

impl ValueObject for Price {}

impl Price {
    /// Validate user input: must be a non-negative decimal number.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        let amount = Decimal::from_str(trimmed)
            .map_err(|_| DomainError::validation(format!("price '{trimmed}' is not a decimal number")))?;
        if amount < Decimal::ZERO {
            return Err(DomainError::validation("price cannot be negative"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Accept persisted text as-is. Loaded prices are free-form.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, if the text is a decimal number.
    pub fn amount(&self) -> Option<Decimal> {
        Decimal::from_str(self.0.trim()).ok()
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coerce a raw quantity field into a stock count.
///
/// This is the only place text becomes a quantity; everything downstream
/// compares integers.
pub fn parse_quantity(raw: &str) -> DomainResult<u32> {
    let trimmed = raw.trim();
    match trimmed.parse::<u32>() {
        Ok(q) => Ok(q),
        Err(_) if trimmed.len() > 1 && trimmed.starts_with('-') && trimmed[1..].chars().all(|c| c.is_ascii_digit()) => {
            Err(DomainError::validation("quantity cannot be negative"))
        }
        Err(_) => Err(DomainError::validation(format!(
            "quantity '{trimmed}' is not a whole number"
        ))),
    }
}

/// Raw field strings as entered by a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub id: String,
    pub name: String,
    pub quantity: String,
    pub price: String,
    pub category: String,
}

impl ItemDraft {
    /// Coerce every field exactly once.
    pub fn validate(&self) -> DomainResult<NewItem> {
        let id = ItemId::parse(&self.id)?;

        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        let quantity = parse_quantity(&self.quantity)?;
        let price = Price::parse(&self.price)?;

        let category = self.category.trim();
        if category.is_empty() {
            return Err(DomainError::validation("category cannot be empty"));
        }

        Ok(NewItem {
            id,
            name: name.to_string(),
            quantity,
            price,
            category: category.to_string(),
        })
    }
}

/// Validated fields of an item that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub id: ItemId,
    pub name: String,
    pub quantity: u32,
    pub price: Price,
    pub category: String,
}

/// One pharmacy stock record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    id: ItemId,
    name: String,
    quantity: u32,
    price: Price,
    category: String,
    last_updated: NaiveDate,
}

impl InventoryItem {
    /// Create a fresh item stamped with `today`.
    pub fn create(new: NewItem, today: NaiveDate) -> Self {
        Self {
            id: new.id,
            name: new.name,
            quantity: new.quantity,
            price: new.price,
            category: new.category,
            last_updated: today,
        }
    }

    /// Rebuild an item from persisted fields, keeping its stored date.
    pub fn restore(
        id: ItemId,
        name: impl Into<String>,
        quantity: u32,
        price: Price,
        category: impl Into<String>,
        last_updated: NaiveDate,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            quantity,
            price,
            category: category.into(),
            last_updated,
        }
    }

    pub fn item_id(&self) -> &ItemId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn price(&self) -> &Price {
        &self.price
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn last_updated(&self) -> NaiveDate {
        self.last_updated
    }

    pub fn is_low_stock(&self, threshold: u32) -> bool {
        self.quantity < threshold
    }

    /// Case-insensitive substring match on name or id. `needle` must already
    /// be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.id.as_str().to_lowercase().contains(needle)
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32, today: NaiveDate) {
        self.quantity = quantity;
        self.last_updated = today;
    }
}

impl Entity for InventoryItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

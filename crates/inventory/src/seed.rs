//! Sample stock used when no data file exists yet.

use chrono::NaiveDate;

use pharmstock_core::ItemId;

use crate::item::{InventoryItem, Price};

const SEED: [(&str, &str, u32, &str, &str); 5] = [
    ("1001", "Aspirin", 45, "5.99", "Pain Relief"),
    ("1002", "Amoxicillin", 8, "12.50", "Antibiotic"),
    ("1003", "Lipitor", 22, "15.75", "Cholesterol"),
    ("1004", "Ventolin", 5, "23.40", "Asthma"),
    ("1005", "Metformin", 34, "8.99", "Diabetes"),
];

/// The five sample items, all stamped with `today`.
pub fn seed_items(today: NaiveDate) -> Vec<InventoryItem> {
    SEED.iter()
        .map(|&(id, name, quantity, price, category)| {
            InventoryItem::restore(
                ItemId::new(id),
                name,
                quantity,
                Price::from_stored(price),
                category,
                today,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_has_five_named_items_in_order() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let items = seed_items(today);

        let summary: Vec<_> = items.iter().map(|i| (i.name(), i.quantity())).collect();
        assert_eq!(
            summary,
            vec![
                ("Aspirin", 45),
                ("Amoxicillin", 8),
                ("Lipitor", 22),
                ("Ventolin", 5),
                ("Metformin", 34),
            ]
        );
        assert!(items.iter().all(|i| i.last_updated() == today));
        assert!(items.iter().all(|i| i.price().amount().is_some()));
    }
}

//! The inventory store: sole owner of the in-memory inventory.

use std::sync::Arc;

use pharmstock_core::ItemId;
use pharmstock_inventory::{
    Clock, Inventory, InventoryItem, InventoryStats, ItemDraft, seed_items,
};

use crate::error::{SkippedRow, StorageError, StoreError};
use crate::repository::InventoryRepository;

/// Where the inventory came from when the store opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Read from persisted records.
    Persisted,
    /// Nothing was persisted; the sample set was created. `persisted` reports
    /// whether writing it out succeeded.
    Seeded { persisted: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenReport {
    pub origin: LoadOrigin,
    pub skipped: Vec<SkippedRow>,
}

/// Owns the inventory and mediates every read and write of its storage.
///
/// Each mutation saves the full inventory right away. When that save fails the
/// change stays in memory, the store is marked dirty and the caller gets the
/// storage error; the next successful save persists it.
pub struct InventoryStore<R> {
    inventory: Inventory,
    repository: R,
    clock: Arc<dyn Clock>,
    low_stock_threshold: u32,
    dirty: bool,
}

impl<R: InventoryRepository> InventoryStore<R> {
    /// Load persisted records, or create and persist the sample set when
    /// nothing has been stored yet.
    pub fn open(
        repository: R,
        clock: Arc<dyn Clock>,
        low_stock_threshold: u32,
    ) -> Result<(Self, OpenReport), StorageError> {
        let location = repository.location();

        match repository.load()? {
            Some(report) => {
                if !report.skipped.is_empty() {
                    tracing::warn!(
                        location = %location,
                        skipped = report.skipped.len(),
                        "malformed rows were left out and will be dropped by the next change"
                    );
                }
                tracing::info!(
                    location = %location,
                    items = report.inventory.len(),
                    "inventory loaded"
                );
                let store = Self {
                    inventory: report.inventory,
                    repository,
                    clock,
                    low_stock_threshold,
                    dirty: false,
                };
                let report = OpenReport {
                    origin: LoadOrigin::Persisted,
                    skipped: report.skipped,
                };
                Ok((store, report))
            }
            None => {
                let inventory = Inventory::from_items(seed_items(clock.today()));
                let mut store = Self {
                    inventory,
                    repository,
                    clock,
                    low_stock_threshold,
                    dirty: true,
                };
                let persisted = match store.save() {
                    Ok(()) => true,
                    Err(err) => {
                        tracing::warn!(location = %location, error = %err, "could not persist sample inventory");
                        false
                    }
                };
                tracing::info!(location = %location, items = store.inventory.len(), "sample inventory created");
                let report = OpenReport {
                    origin: LoadOrigin::Seeded { persisted },
                    skipped: Vec::new(),
                };
                Ok((store, report))
            }
        }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn items(&self) -> &[InventoryItem] {
        self.inventory.items()
    }

    pub fn get(&self, id: &ItemId) -> Option<&InventoryItem> {
        self.inventory.get(id)
    }

    pub fn low_stock_threshold(&self) -> u32 {
        self.low_stock_threshold
    }

    pub fn set_low_stock_threshold(&mut self, threshold: u32) {
        self.low_stock_threshold = threshold;
    }

    /// True when in-memory changes have not reached storage.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Validate `draft`, stamp it with today's date, append it and save.
    pub fn add_item(&mut self, draft: &ItemDraft) -> Result<InventoryItem, StoreError> {
        let new = draft.validate()?;
        if self.inventory.contains(&new.id) {
            tracing::warn!(item_id = %new.id, "adding an item whose id is already in use");
        }

        let item = self
            .inventory
            .push(InventoryItem::create(new, self.clock.today()))
            .clone();
        self.dirty = true;
        tracing::info!(item_id = %item.item_id(), name = item.name(), quantity = item.quantity(), "item added");

        self.save()?;
        Ok(item)
    }

    /// Set the quantity of the first item carrying `id`, stamp it and save.
    pub fn update_quantity(&mut self, id: &ItemId, quantity: u32) -> Result<InventoryItem, StoreError> {
        let today = self.clock.today();
        let item = self.inventory.update_quantity(id, quantity, today)?.clone();
        self.dirty = true;
        tracing::info!(item_id = %id, quantity, "quantity updated");

        self.save()?;
        Ok(item)
    }

    /// Items whose name or id contains `query`, ignoring case.
    pub fn filter(&self, query: &str) -> Vec<&InventoryItem> {
        self.inventory.filter(query)
    }

    /// Items below the configured threshold.
    pub fn low_stock(&self) -> Vec<&InventoryItem> {
        self.inventory.low_stock(self.low_stock_threshold)
    }

    pub fn low_stock_below(&self, threshold: u32) -> Vec<&InventoryItem> {
        self.inventory.low_stock(threshold)
    }

    pub fn statistics(&self) -> InventoryStats {
        self.inventory
            .statistics(self.low_stock_threshold, self.clock.now())
    }

    /// Save only when there are in-memory changes storage has not seen.
    ///
    /// A clean store never rewrites its file, so rows skipped on load stay on
    /// disk until something actually changes.
    pub fn save_if_dirty(&mut self) -> Result<bool, StorageError> {
        if !self.dirty {
            return Ok(false);
        }
        self.save().map(|()| true)
    }

    /// Overwrite storage with the current inventory.
    pub fn save(&mut self) -> Result<(), StorageError> {
        match self.repository.save(&self.inventory) {
            Ok(()) => {
                self.dirty = false;
                tracing::debug!(items = self.inventory.len(), "inventory saved");
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "inventory save failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pharmstock_core::DomainError;
    use pharmstock_inventory::{DEFAULT_LOW_STOCK_THRESHOLD, FixedClock};

    use crate::repository::{InMemoryRepository, read_inventory};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn open_at(repo: Arc<InMemoryRepository>, date: NaiveDate) -> InventoryStore<Arc<InMemoryRepository>> {
        let (store, _) =
            InventoryStore::open(repo, Arc::new(FixedClock::on(date)), DEFAULT_LOW_STOCK_THRESHOLD).unwrap();
        store
    }

    fn persisted(repo: &InMemoryRepository) -> Inventory {
        read_inventory(repo.contents().unwrap().as_slice(), "test")
            .unwrap()
            .inventory
    }

    fn draft(id: &str, name: &str, quantity: &str) -> ItemDraft {
        ItemDraft {
            id: id.to_string(),
            name: name.to_string(),
            quantity: quantity.to_string(),
            price: "3.10".to_string(),
            category: "Other".to_string(),
        }
    }

    #[test]
    fn first_open_seeds_and_persists_sample_items() {
        let repo = Arc::new(InMemoryRepository::new());
        let (store, report) = InventoryStore::open(
            repo.clone(),
            Arc::new(FixedClock::on(day(2024, 8, 1))),
            DEFAULT_LOW_STOCK_THRESHOLD,
        )
        .unwrap();

        assert_eq!(report.origin, LoadOrigin::Seeded { persisted: true });
        let names: Vec<_> = store.items().iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["Aspirin", "Amoxicillin", "Lipitor", "Ventolin", "Metformin"]);
        assert_eq!(persisted(&repo), *store.inventory());
        assert!(!store.is_dirty());
    }

    #[test]
    fn reopening_reads_what_was_saved() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut store = open_at(repo.clone(), day(2024, 8, 1));
        store.add_item(&draft("2001", "Zyrtec", "14")).unwrap();

        let (reopened, report) = InventoryStore::open(
            repo.clone(),
            Arc::new(FixedClock::on(day(2024, 9, 1))),
            DEFAULT_LOW_STOCK_THRESHOLD,
        )
        .unwrap();
        assert_eq!(report.origin, LoadOrigin::Persisted);
        assert_eq!(reopened.inventory(), store.inventory());
    }

    #[test]
    fn seeding_survives_unavailable_storage() {
        let repo = Arc::new(InMemoryRepository::new());
        // Loading succeeds (nothing stored) but the first write fails.
        let (mut store, report) = {
            let clock = Arc::new(FixedClock::on(day(2024, 8, 1)));
            struct FailingSaves(Arc<InMemoryRepository>);
            impl InventoryRepository for FailingSaves {
                fn load(&self) -> Result<Option<crate::repository::LoadReport>, StorageError> {
                    self.0.load()
                }
                fn save(&self, inventory: &Inventory) -> Result<(), StorageError> {
                    self.0.set_unavailable(true);
                    let result = self.0.save(inventory);
                    self.0.set_unavailable(false);
                    result
                }
                fn location(&self) -> String {
                    self.0.location()
                }
            }
            let (store, report) =
                InventoryStore::open(FailingSaves(repo.clone()), clock, 10).unwrap();
            (store, report)
        };

        assert_eq!(report.origin, LoadOrigin::Seeded { persisted: false });
        assert_eq!(store.items().len(), 5);
        assert!(store.is_dirty());
        assert!(store.save().is_err());
        assert_eq!(repo.save_count(), 0);
    }

    #[test]
    fn add_item_appends_stamps_and_saves() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut store = open_at(repo.clone(), day(2024, 8, 1));
        let saves_before = repo.save_count();

        let item = store.add_item(&draft("2001", "Zyrtec", "14")).unwrap();

        assert_eq!(store.items().len(), 6);
        assert_eq!(store.items()[5], item);
        assert_eq!(item.last_updated(), day(2024, 8, 1));
        assert_eq!(item.quantity(), 14);
        assert_eq!(repo.save_count(), saves_before + 1);
        assert_eq!(persisted(&repo), *store.inventory());
    }

    #[test]
    fn invalid_draft_changes_nothing() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut store = open_at(repo.clone(), day(2024, 8, 1));
        let before = store.inventory().clone();
        let saves_before = repo.save_count();

        let err = store.add_item(&draft("2001", "Zyrtec", "-2")).unwrap_err();

        assert!(matches!(err, StoreError::Domain(DomainError::Validation(_))));
        assert_eq!(*store.inventory(), before);
        assert_eq!(repo.save_count(), saves_before);
    }

    #[test]
    fn duplicate_ids_are_accepted_and_lookup_returns_first() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut store = open_at(repo, day(2024, 8, 1));

        store.add_item(&draft("1001", "Aspirin 500mg", "3")).unwrap();

        assert_eq!(store.items().len(), 6);
        assert_eq!(store.get(&ItemId::new("1001")).map(|i| i.name()), Some("Aspirin"));
    }

    #[test]
    fn update_quantity_changes_only_the_target() {
        let repo = Arc::new(InMemoryRepository::new());
        let before = open_at(repo.clone(), day(2024, 8, 1)).inventory().clone();
        // Reopen later so the new stamp differs from the seed date.
        let mut store = open_at(repo.clone(), day(2024, 8, 20));

        let updated = store.update_quantity(&ItemId::new("1003"), 3).unwrap();
        assert_eq!(updated.quantity(), 3);
        assert_eq!(updated.last_updated(), day(2024, 8, 20));
        assert_eq!(updated.name(), "Lipitor");
        assert_eq!(updated.price(), before.items()[2].price());
        assert_eq!(updated.category(), before.items()[2].category());

        for (idx, (after, before)) in store.items().iter().zip(before.items()).enumerate() {
            if idx != 2 {
                assert_eq!(after, before);
            }
        }
        assert_eq!(persisted(&repo), *store.inventory());
    }

    #[test]
    fn update_unknown_id_is_not_found_and_unsaved() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut store = open_at(repo.clone(), day(2024, 8, 1));
        let before = store.inventory().clone();
        let saves_before = repo.save_count();

        let err = store.update_quantity(&ItemId::new("4040"), 1).unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(*store.inventory(), before);
        assert_eq!(repo.save_count(), saves_before);
    }

    #[test]
    fn failed_save_keeps_change_in_memory_until_next_save() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut store = open_at(repo.clone(), day(2024, 8, 1));

        repo.set_unavailable(true);
        let err = store.update_quantity(&ItemId::new("1001"), 44).unwrap_err();
        assert!(err.is_storage());
        assert!(store.is_dirty());
        assert_eq!(store.get(&ItemId::new("1001")).map(|i| i.quantity()), Some(44));

        repo.set_unavailable(false);
        store.save().unwrap();
        assert!(!store.is_dirty());
        assert_eq!(persisted(&repo).items()[0].quantity(), 44);
    }

    #[test]
    fn save_if_dirty_skips_clean_stores() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut store = open_at(repo.clone(), day(2024, 8, 1));
        let saves = repo.save_count();

        assert!(!store.save_if_dirty().unwrap());
        assert_eq!(repo.save_count(), saves);

        repo.set_unavailable(true);
        store.update_quantity(&ItemId::new("1002"), 30).unwrap_err();
        repo.set_unavailable(false);

        assert!(store.save_if_dirty().unwrap());
        assert!(!store.is_dirty());
        assert_eq!(repo.save_count(), saves + 1);
        assert_eq!(persisted(&repo).items()[1].quantity(), 30);
    }

    #[test]
    fn low_stock_uses_the_configured_threshold() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut store = open_at(repo, day(2024, 8, 1));

        let quantities: Vec<_> = store.low_stock().iter().map(|i| i.quantity()).collect();
        assert_eq!(quantities, vec![8, 5]);

        store.set_low_stock_threshold(25);
        let quantities: Vec<_> = store.low_stock().iter().map(|i| i.quantity()).collect();
        assert_eq!(quantities, vec![8, 22, 5]);

        assert_eq!(store.low_stock_below(6).len(), 1);
        assert_eq!(store.statistics().low_stock_count, 3);
    }

    #[test]
    fn statistics_are_stamped_by_the_clock() {
        let repo = Arc::new(InMemoryRepository::new());
        let clock = FixedClock::on(day(2024, 8, 1));
        let (store, _) = InventoryStore::open(repo, Arc::new(clock), DEFAULT_LOW_STOCK_THRESHOLD).unwrap();

        let stats = store.statistics();
        assert_eq!(stats.total_items, 5);
        assert_eq!(stats.total_quantity, 114);
        assert_eq!(stats.low_stock_count, 2);
        assert_eq!(stats.computed_at, clock.now());
    }

    #[test]
    fn malformed_header_fails_open() {
        let repo = Arc::new(InMemoryRepository::with_contents(b"name,qty\r\nAspirin,4\r\n".to_vec()));
        let result = InventoryStore::open(repo.clone(), Arc::new(FixedClock::on(day(2024, 8, 1))), 10);
        assert!(matches!(result, Err(StorageError::MalformedHeader { .. })));
        // The unrecognised file is left alone.
        assert_eq!(repo.contents().unwrap(), b"name,qty\r\nAspirin,4\r\n".to_vec());
    }

    #[test]
    fn skipped_rows_are_reported_on_open() {
        let repo = Arc::new(InMemoryRepository::with_contents(
            b"id,name,quantity,price,category,last_updated\r\n\
              1,Aspirin,x,1.00,Other,2024-01-01\r\n\
              2,Ibuprofen,4,1.00,Other,2024-01-01\r\n"
                .to_vec(),
        ));
        let (store, report) =
            InventoryStore::open(repo, Arc::new(FixedClock::on(day(2024, 8, 1))), 10).unwrap();

        assert_eq!(report.origin, LoadOrigin::Persisted);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].line, 2);
        assert_eq!(store.items().len(), 1);
    }
}

//! Persistence boundary for the inventory.
//!
//! The store only needs two things from storage: read everything back, and
//! overwrite everything. Both implementations share the CSV codec so the
//! in-memory variant exercises the same format as the file.

pub mod codec;
pub mod csv_file;
pub mod in_memory;

use std::sync::Arc;

use pharmstock_inventory::Inventory;

use crate::error::StorageError;

pub use codec::{HEADER, LoadReport, read_inventory, write_inventory};
pub use csv_file::CsvFileRepository;
pub use in_memory::InMemoryRepository;

/// Whole-inventory storage.
pub trait InventoryRepository: Send + Sync {
    /// Read persisted records. `Ok(None)` means nothing has been persisted yet.
    fn load(&self) -> Result<Option<LoadReport>, StorageError>;

    /// Replace persisted records with `inventory`.
    fn save(&self, inventory: &Inventory) -> Result<(), StorageError>;

    /// Human-readable location, for logs and errors.
    fn location(&self) -> String;
}

impl<S> InventoryRepository for Arc<S>
where
    S: InventoryRepository + ?Sized,
{
    fn load(&self) -> Result<Option<LoadReport>, StorageError> {
        (**self).load()
    }

    fn save(&self, inventory: &Inventory) -> Result<(), StorageError> {
        (**self).save(inventory)
    }

    fn location(&self) -> String {
        (**self).location()
    }
}

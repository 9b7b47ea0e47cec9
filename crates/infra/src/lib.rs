//! Infrastructure layer: persistence, the inventory store and its service task.

pub mod config;
pub mod error;
pub mod repository;
pub mod service;
pub mod store;

use std::sync::Arc;

use tokio::task::JoinHandle;

use pharmstock_inventory::SystemClock;

pub use config::{DEFAULT_AUTOSAVE_INTERVAL, StoreConfig, default_data_file};
pub use error::{RowError, SkippedRow, StorageError, StoreError};
pub use repository::{CsvFileRepository, InMemoryRepository, InventoryRepository, LoadReport};
pub use service::{StoreHandle, StoreService};
pub use store::{InventoryStore, LoadOrigin, OpenReport};

/// Open the CSV-backed store described by `config` and start its service task.
///
/// Must be called from within a tokio runtime.
pub fn open_file_store(
    config: &StoreConfig,
) -> Result<(StoreHandle, JoinHandle<()>, OpenReport), StorageError> {
    let repository = CsvFileRepository::new(&config.data_file);
    let (store, report) = InventoryStore::open(
        repository,
        Arc::new(SystemClock),
        config.low_stock_threshold,
    )?;
    let (handle, join) = StoreService::spawn(store, config.autosave_interval);
    Ok((handle, join, report))
}

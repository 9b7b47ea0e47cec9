use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use pharmstock_inventory::Inventory;

use super::InventoryRepository;
use super::codec::{LoadReport, read_inventory, write_inventory};
use crate::error::StorageError;

const LOCATION: &str = "memory";

/// In-memory repository holding the encoded CSV bytes.
///
/// Intended for tests/dev. Storage can be switched off to simulate an
/// unwritable disk.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    contents: Mutex<Option<Vec<u8>>>,
    unavailable: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with previously persisted bytes.
    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            contents: Mutex::new(Some(bytes.into())),
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Option<Vec<u8>> {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Make every subsequent load and save fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable(
                LOCATION,
                io::Error::new(io::ErrorKind::PermissionDenied, "storage switched off"),
            ));
        }
        Ok(())
    }
}

impl InventoryRepository for InMemoryRepository {
    fn load(&self) -> Result<Option<LoadReport>, StorageError> {
        self.check_available()?;
        match self.contents() {
            Some(bytes) => read_inventory(bytes.as_slice(), LOCATION).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, inventory: &Inventory) -> Result<(), StorageError> {
        self.check_available()?;
        let mut buf = Vec::new();
        write_inventory(&mut buf, inventory, LOCATION)?;
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = Some(buf);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        LOCATION.to_string()
    }
}

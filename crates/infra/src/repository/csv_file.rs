use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use pharmstock_inventory::Inventory;

use super::InventoryRepository;
use super::codec::{LoadReport, read_inventory, write_inventory};
use crate::error::StorageError;

/// Inventory persisted as a CSV file.
///
/// Saves write a sibling temp file, fsync it and rename it over the target, so a
/// reader sees either the previous file or the new one, never a partial write.
#[derive(Debug, Clone)]
pub struct CsvFileRepository {
    path: PathBuf,
}

impl CsvFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl InventoryRepository for CsvFileRepository {
    fn load(&self) -> Result<Option<LoadReport>, StorageError> {
        let location = self.location();
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no inventory file yet");
                return Ok(None);
            }
            Err(err) => return Err(StorageError::unavailable(location, err)),
        };

        let report = read_inventory(file, &location)?;
        tracing::debug!(
            path = %self.path.display(),
            items = report.inventory.len(),
            skipped = report.skipped.len(),
            "read inventory file"
        );
        Ok(Some(report))
    }

    fn save(&self, inventory: &Inventory) -> Result<(), StorageError> {
        let location = self.location();
        let dir = self.parent_dir();

        fs::create_dir_all(dir).map_err(|e| StorageError::unavailable(&location, e))?;

        let mut tmp =
            NamedTempFile::new_in(dir).map_err(|e| StorageError::unavailable(&location, e))?;
        write_inventory(&mut tmp, inventory, &location)?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| StorageError::unavailable(&location, e))?;
        tmp.persist(&self.path)
            .map_err(|e| StorageError::unavailable(&location, e.error))?;

        tracing::debug!(path = %self.path.display(), items = inventory.len(), "wrote inventory file");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

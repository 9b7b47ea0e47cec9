//! Store configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

use pharmstock_inventory::DEFAULT_LOW_STOCK_THRESHOLD;

/// How often the store service writes the inventory out on its own.
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

pub const DATA_FILE_NAME: &str = "pharmacy_inventory.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// CSV file holding the inventory.
    pub data_file: PathBuf,
    /// Items with quantity strictly below this are low on stock.
    pub low_stock_threshold: u32,
    /// `None` disables auto-save.
    pub autosave_interval: Option<Duration>,
}

impl StoreConfig {
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            autosave_interval: Some(DEFAULT_AUTOSAVE_INTERVAL),
        }
    }

    pub fn with_low_stock_threshold(mut self, threshold: u32) -> Self {
        self.low_stock_threshold = threshold;
        self
    }

    /// Zero disables auto-save.
    pub fn with_autosave_interval(mut self, interval: Duration) -> Self {
        self.autosave_interval = (!interval.is_zero()).then_some(interval);
        self
    }

    pub fn without_autosave(mut self) -> Self {
        self.autosave_interval = None;
        self
    }
}

/// Resolve the default data file:
/// `{app_data_dir}/pharmstock/pharmacy_inventory.csv`.
///
/// The directory is created on first save, not here.
pub fn default_data_file() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;

    let mut path = base;
    path.push("pharmstock");
    path.push(DATA_FILE_NAME);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_pharmacy_setup() {
        let config = StoreConfig::new("inventory.csv");
        assert_eq!(config.low_stock_threshold, 10);
        assert_eq!(config.autosave_interval, Some(Duration::from_secs(30)));
    }

    #[test]
    fn zero_interval_disables_autosave() {
        let config = StoreConfig::new("inventory.csv").with_autosave_interval(Duration::ZERO);
        assert_eq!(config.autosave_interval, None);
    }

    #[test]
    fn default_data_file_ends_with_app_dir_and_file_name() {
        if let Ok(path) = default_data_file() {
            assert!(path.ends_with("pharmstock/pharmacy_inventory.csv"));
        }
    }
}

//! Inventory domain module.
//!
//! This crate contains the pharmacy stock model and the rules that govern it,
//! implemented purely as deterministic domain logic (no IO, no storage). The
//! current date is always passed in, either directly or through a [`Clock`].

pub mod clock;
pub mod inventory;
pub mod item;
pub mod seed;
pub mod stats;

pub use clock::{Clock, FixedClock, SystemClock};
pub use inventory::{DEFAULT_LOW_STOCK_THRESHOLD, Inventory};
pub use item::{InventoryItem, ItemDraft, KNOWN_CATEGORIES, NewItem, Price, parse_quantity};
pub use seed::seed_items;
pub use stats::InventoryStats;

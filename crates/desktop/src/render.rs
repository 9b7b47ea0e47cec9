//! Plain-text and JSON rendering of store results.

use std::io::Write;

use serde::Serialize;

use pharmstock_inventory::{InventoryItem, InventoryStats};

const HEADERS: [&str; 6] = ["ID", "Name", "Quantity", "Price", "Category", "Last Updated"];
const LOW_MARKER: &str = "LOW";

#[derive(Debug, Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

pub fn print_json<T: Serialize>(out: &mut dyn Write, data: T) -> anyhow::Result<()> {
    writeln!(
        out,
        "{}",
        serde_json::to_string_pretty(&JsonOut { ok: true, data })?
    )?;
    Ok(())
}

/// Fixed-width table of items; rows under `threshold` get a trailing marker.
pub fn item_table(items: &[InventoryItem], threshold: u32) -> String {
    let rows: Vec<[String; 6]> = items
        .iter()
        .map(|item| {
            [
                item.item_id().to_string(),
                item.name().to_string(),
                item.quantity().to_string(),
                item.price().to_string(),
                item.category().to_string(),
                item.last_updated().to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut table = String::new();
    push_row(&mut table, &HEADERS.map(String::from), &widths, None);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut table, &rule, &widths, None);
    for (row, item) in rows.iter().zip(items) {
        let marker = item.is_low_stock(threshold).then_some(LOW_MARKER);
        push_row(&mut table, row, &widths, marker);
    }
    table
}

fn push_row(table: &mut String, cells: &[String], widths: &[usize], marker: Option<&str>) {
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        line.push_str(cell);
        let pad = width.saturating_sub(cell.chars().count());
        line.extend(std::iter::repeat_n(' ', pad));
    }
    if let Some(marker) = marker {
        line.push_str("  ");
        line.push_str(marker);
    }
    table.push_str(line.trim_end());
    table.push('\n');
}

/// The low-stock alert: one line per item, or a single all-clear line.
pub fn low_stock_alert(items: &[InventoryItem]) -> String {
    if items.is_empty() {
        return "No items are low in stock.\n".to_string();
    }

    let mut message = String::from("The following items are low in stock:\n");
    for item in items {
        message.push_str(&format!(
            "{} (ID: {}): {} remaining\n",
            item.name(),
            item.item_id(),
            item.quantity()
        ));
    }
    message
}

pub fn stats_summary(stats: &InventoryStats) -> String {
    let stock_value = match stats.stock_value {
        Some(value) => value.to_string(),
        None => "too large to display".to_string(),
    };
    format!(
        "Inventory Statistics\n\
         Total Items:     {}\n\
         Total Quantity:  {}\n\
         Low Stock Items: {} (below {})\n\
         Stock Value:     {}\n\
         Last Updated:    {}\n",
        stats.total_items,
        stats.total_quantity,
        stats.low_stock_count,
        stats.low_stock_threshold,
        stock_value,
        stats.computed_at.format("%Y-%m-%d %H:%M"),
    )
}

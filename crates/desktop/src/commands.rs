//! Store commands shared by the one-shot CLI and the interactive shell.

use std::io::Write;

use anyhow::Context;

use pharmstock_core::ItemId;
use pharmstock_infra::{StoreError, StoreHandle};
use pharmstock_inventory::{ItemDraft, parse_quantity};

use crate::cli::StoreCommand;
use crate::render;

/// Run one store command against the service and write its output.
pub async fn execute(
    handle: &StoreHandle,
    command: StoreCommand,
    json: bool,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match command {
        StoreCommand::List => {
            let items = handle.items().await?;
            if json {
                return render::print_json(out, items);
            }
            let threshold = handle.low_stock_threshold().await?;
            write!(out, "{}", render::item_table(&items, threshold))?;
        }
        StoreCommand::Search { query } => {
            let items = handle.filter(query.as_str()).await?;
            if json {
                return render::print_json(out, items);
            }
            if items.is_empty() {
                writeln!(out, "No items match '{query}'.")?;
            } else {
                let threshold = handle.low_stock_threshold().await?;
                write!(out, "{}", render::item_table(&items, threshold))?;
            }
        }
        StoreCommand::Add {
            id,
            name,
            quantity,
            price,
            category,
        } => {
            let draft = ItemDraft {
                id,
                name,
                quantity,
                price,
                category,
            };
            let item = handle
                .add_item(draft)
                .await
                .map_err(unsaved_change)
                .context("could not add item")?;
            if json {
                return render::print_json(out, item);
            }
            writeln!(out, "Item added successfully!")?;
        }
        StoreCommand::Update { id, quantity } => {
            let id = ItemId::parse(&id)?;
            let quantity = parse_quantity(&quantity)?;
            let item = handle
                .update_quantity(id, quantity)
                .await
                .map_err(unsaved_change)
                .context("could not update quantity")?;
            if json {
                return render::print_json(out, item);
            }
            writeln!(out, "Quantity updated successfully!")?;
            writeln!(
                out,
                "{} (ID: {}): {}",
                item.name(),
                item.item_id(),
                item.quantity()
            )?;
        }
        StoreCommand::LowStock { below } => {
            let items = match below {
                Some(threshold) => handle.low_stock_below(threshold).await?,
                None => handle.low_stock().await?,
            };
            if json {
                return render::print_json(out, items);
            }
            write!(out, "{}", render::low_stock_alert(&items))?;
        }
        StoreCommand::Stats => {
            let stats = handle.statistics().await?;
            if json {
                return render::print_json(out, stats);
            }
            write!(out, "{}", render::stats_summary(&stats))?;
        }
    }
    Ok(())
}

/// A failed save still leaves the change in memory; say so.
fn unsaved_change(err: StoreError) -> anyhow::Error {
    if err.is_storage() {
        tracing::warn!(error = %err, "change kept in memory but not saved");
        anyhow::Error::new(err).context("change kept in memory but not saved to disk")
    } else {
        anyhow::Error::new(err)
    }
}

//! CSV encoding of the inventory.
//!
//! Layout: a header row `id,name,quantity,price,category,last_updated`, one
//! record per item, CRLF line endings, RFC 4180 quoting where needed. Encoding
//! the same inventory always yields the same bytes.

use std::io::{Read, Write};

use chrono::NaiveDate;
use csv::{ByteRecord, ReaderBuilder, StringRecord, Terminator, WriterBuilder};

use pharmstock_core::ItemId;
use pharmstock_inventory::{Inventory, InventoryItem, Price, parse_quantity};

use crate::error::{RowError, SkippedRow, StorageError};

pub const HEADER: [&str; 6] = ["id", "name", "quantity", "price", "category", "last_updated"];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Result of decoding a data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub inventory: Inventory,
    /// Rows that could not be coerced and were left out.
    pub skipped: Vec<SkippedRow>,
}

pub fn write_inventory<W: Write>(
    writer: W,
    inventory: &Inventory,
    location: &str,
) -> Result<(), StorageError> {
    let mut out = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(writer);

    out.write_record(HEADER)
        .map_err(|e| csv_write_error(e, location))?;

    for item in inventory {
        let quantity = item.quantity().to_string();
        let last_updated = item.last_updated().format(DATE_FORMAT).to_string();
        out.write_record([
            item.item_id().as_str(),
            item.name(),
            quantity.as_str(),
            item.price().as_str(),
            item.category(),
            last_updated.as_str(),
        ])
        .map_err(|e| csv_write_error(e, location))?;
    }

    out.flush()
        .map_err(|e| StorageError::unavailable(location, e))
}

/// Decode a data file, skipping rows that cannot be coerced.
///
/// A missing or unexpected header fails the whole read.
pub fn read_inventory<R: Read>(reader: R, location: &str) -> Result<LoadReport, StorageError> {
    let mut input = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut record = ByteRecord::new();

    let has_header = input
        .read_byte_record(&mut record)
        .map_err(|e| csv_read_error(e, location))?;
    check_header(has_header.then_some(&record), location)?;

    let mut items = Vec::new();
    let mut skipped = Vec::new();

    while input
        .read_byte_record(&mut record)
        .map_err(|e| csv_read_error(e, location))?
    {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        match decode_row(&record) {
            Ok(item) => items.push(item),
            Err(reason) => {
                tracing::warn!(location, line, %reason, "skipping malformed inventory row");
                skipped.push(SkippedRow { line, reason });
            }
        }
    }

    Ok(LoadReport {
        inventory: Inventory::from_items(items),
        skipped,
    })
}

fn check_header(record: Option<&ByteRecord>, location: &str) -> Result<(), StorageError> {
    let found: Vec<String> = record
        .map(|r| {
            r.iter()
                .map(|field| String::from_utf8_lossy(field).trim_start_matches('\u{feff}').trim().to_string())
                .collect()
        })
        .unwrap_or_default();

    if found.iter().map(String::as_str).eq(HEADER) {
        return Ok(());
    }

    Err(StorageError::MalformedHeader {
        location: location.to_string(),
        expected: HEADER.join(","),
        found: found.join(","),
    })
}

fn decode_row(record: &ByteRecord) -> Result<InventoryItem, RowError> {
    let record = StringRecord::from_byte_record(record.clone()).map_err(|_| RowError::Encoding)?;

    if record.len() != HEADER.len() {
        return Err(RowError::FieldCount {
            expected: HEADER.len(),
            found: record.len(),
        });
    }

    let raw_quantity = &record[2];
    let quantity = parse_quantity(raw_quantity).map_err(|reason| RowError::Quantity {
        value: raw_quantity.to_string(),
        reason,
    })?;

    let raw_date = &record[5];
    let last_updated = NaiveDate::parse_from_str(raw_date.trim(), DATE_FORMAT)
        .map_err(|_| RowError::Date(raw_date.to_string()))?;

    Ok(InventoryItem::restore(
        ItemId::new(&record[0]),
        &record[1],
        quantity,
        Price::from_stored(&record[3]),
        &record[4],
        last_updated,
    ))
}

fn csv_write_error(err: csv::Error, location: &str) -> StorageError {
    match err.into_kind() {
        csv::ErrorKind::Io(source) => StorageError::unavailable(location, source),
        other => StorageError::Encode {
            location: location.to_string(),
            message: format!("{other:?}"),
        },
    }
}

fn csv_read_error(err: csv::Error, location: &str) -> StorageError {
    match err.into_kind() {
        csv::ErrorKind::Io(source) => StorageError::unavailable(location, source),
        other => StorageError::unavailable(
            location,
            std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{other:?}")),
        ),
    }
}

use csv::{ReaderBuilder, StringRecord, Trim};
use shared::domain::{DatabaseName, ItemName, PoNumber};
use tracing::debug;

use crate::{error::DataFetchError, index::ReferenceIndex};

pub const DATABASE_COLUMN: &str = "Database";
pub const PO_NUMBER_COLUMN: &str = "Nomor PO";
pub const ITEM_COLUMN: &str = "Item";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRow {
    pub database: DatabaseName,
    pub po_number: PoNumber,
    pub item: ItemName,
}

/// Rows of the reference sheet, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTable {
    rows: Vec<ReferenceRow>,
}

impl ReferenceTable {
    /// Parses CSV text with a header row. Columns are located by name; any
    /// other columns are ignored. Rows with a blank key cell are skipped.
    pub fn from_csv(text: &str) -> Result<Self, DataFetchError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| DataFetchError::Malformed(e.to_string()))?
            .clone();
        let database_at = column_position(&headers, DATABASE_COLUMN)?;
        let po_number_at = column_position(&headers, PO_NUMBER_COLUMN)?;
        let item_at = column_position(&headers, ITEM_COLUMN)?;

        let mut rows = Vec::new();
        for (offset, record) in reader.records().enumerate() {
            let record = record.map_err(|e| DataFetchError::Malformed(e.to_string()))?;
            let database = record.get(database_at).unwrap_or_default();
            let po_number = normalize_po_number(record.get(po_number_at).unwrap_or_default());
            let item = record.get(item_at).unwrap_or_default();

            if database.is_empty() || po_number.is_empty() || item.is_empty() {
                // +2: header line, and lines are 1-based
                debug!(line = offset + 2, "skipping incomplete reference row");
                continue;
            }

            rows.push(ReferenceRow {
                database: DatabaseName::from(database),
                po_number: PoNumber::from(po_number),
                item: ItemName::from(item),
            });
        }

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_index(self) -> ReferenceIndex {
        ReferenceIndex::from_rows(self.rows)
    }
}

fn column_position(headers: &StringRecord, name: &'static str) -> Result<usize, DataFetchError> {
    headers
        .iter()
        .position(|header| header.trim_start_matches('\u{feff}') == name)
        .ok_or(DataFetchError::MissingColumn(name))
}

/// Spreadsheet exports sometimes render numeric PO numbers as `100.0`.
pub fn normalize_po_number(raw: &str) -> &str {
    match raw.split_once('.') {
        Some((whole, fraction))
            if !whole.is_empty()
                && whole.bytes().all(|b| b.is_ascii_digit())
                && !fraction.is_empty()
                && fraction.bytes().all(|b| b == b'0') =>
        {
            whole
        }
        _ => raw,
    }
}

//! Reference data for the intake form: the sheet of databases, purchase
//! orders and their expected items.

mod cache;
pub mod error;
mod index;
mod source;
mod table;

pub use cache::ReferenceCache;
pub use error::DataFetchError;
pub use index::{DatabaseEntry, PurchaseOrderEntry, ReferenceIndex};
pub use source::{gviz_csv_url, HttpReferenceSource, ReferenceSource, StaticReferenceSource};
pub use table::{
    normalize_po_number, ReferenceRow, ReferenceTable, DATABASE_COLUMN, ITEM_COLUMN,
    PO_NUMBER_COLUMN,
};

/// Fetches the sheet once and reshapes it into a [`ReferenceIndex`]. No retry.
pub async fn load(source: &dyn ReferenceSource) -> Result<ReferenceIndex, DataFetchError> {
    let text = source.fetch_csv().await?;
    parse_reference_csv(&text)
}

pub fn parse_reference_csv(text: &str) -> Result<ReferenceIndex, DataFetchError> {
    Ok(ReferenceTable::from_csv(text)?.into_index())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/cache_tests.rs"]
mod cache_tests;

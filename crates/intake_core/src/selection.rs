use reference::ReferenceIndex;
use shared::domain::{DatabaseName, ItemName, PoNumber};

use crate::error::ValidationError;

/// What the user picked on the form for one submit cycle.
///
/// Items keep the order they were selected in; selecting an item twice
/// overwrites its quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub database: DatabaseName,
    pub po_number: PoNumber,
    quantities: Vec<(ItemName, u32)>,
}

impl Selection {
    pub fn new(database: impl Into<DatabaseName>, po_number: impl Into<PoNumber>) -> Self {
        Self {
            database: database.into(),
            po_number: po_number.into(),
            quantities: Vec::new(),
        }
    }

    pub fn with_item(mut self, item: impl Into<ItemName>, quantity: u32) -> Self {
        self.set_quantity(item, quantity);
        self
    }

    pub fn set_quantity(&mut self, item: impl Into<ItemName>, quantity: u32) {
        let item = item.into();
        match self.quantities.iter_mut().find(|(name, _)| *name == item) {
            Some((_, existing)) => *existing = quantity,
            None => self.quantities.push((item, quantity)),
        }
    }

    pub fn deselect(&mut self, item: &str) {
        self.quantities.retain(|(name, _)| name.as_str() != item);
    }

    pub fn quantity(&self, item: &str) -> Option<u32> {
        self.quantities
            .iter()
            .find(|(name, _)| name.as_str() == item)
            .map(|(_, quantity)| *quantity)
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemName> {
        self.quantities.iter().map(|(name, _)| name)
    }

    pub fn quantities(&self) -> &[(ItemName, u32)] {
        &self.quantities
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Selected items with a positive quantity.
    pub fn received(&self) -> impl Iterator<Item = (&ItemName, u32)> {
        self.quantities
            .iter()
            .filter(|(_, quantity)| *quantity > 0)
            .map(|(name, quantity)| (name, *quantity))
    }

    /// Rejects names that the reference sheet does not list.
    pub fn check_against(&self, index: &ReferenceIndex) -> Result<(), ValidationError> {
        let database = index
            .database(self.database.as_str())
            .ok_or_else(|| ValidationError::UnknownDatabase(self.database.to_string()))?;
        let purchase_order = database
            .purchase_order(self.po_number.as_str())
            .ok_or_else(|| ValidationError::UnknownPurchaseOrder {
                database: self.database.to_string(),
                po_number: self.po_number.to_string(),
            })?;
        if let Some(item) = self
            .items()
            .find(|item| !purchase_order.items.contains(*item))
        {
            return Err(ValidationError::UnknownItem {
                po_number: self.po_number.to_string(),
                item: item.to_string(),
            });
        }
        Ok(())
    }
}

pub fn validate(selection: &Selection) -> Result<(), ValidationError> {
    if selection.received().next().is_none() {
        return Err(ValidationError::NoPositiveQuantity);
    }
    Ok(())
}

pub fn is_valid(selection: &Selection) -> bool {
    validate(selection).is_ok()
}

/// Parses a quantity field; a blank field counts as 0.
pub fn parse_quantity(item: &str, raw: &str) -> Result<u32, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse::<u32>()
        .map_err(|_| ValidationError::InvalidQuantity {
            item: item.to_string(),
            value: raw.to_string(),
        })
}

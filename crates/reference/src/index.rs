use std::collections::HashMap;

use serde::Serialize;
use shared::domain::{DatabaseName, ItemName, PoNumber};

use crate::table::ReferenceRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseOrderEntry {
    pub number: PoNumber,
    pub items: Vec<ItemName>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseEntry {
    pub name: DatabaseName,
    pub purchase_orders: Vec<PurchaseOrderEntry>,
}

impl DatabaseEntry {
    pub fn purchase_order(&self, po_number: &str) -> Option<&PurchaseOrderEntry> {
        self.purchase_orders
            .iter()
            .find(|entry| entry.number.as_str() == po_number)
    }
}

/// Database → PO number → items, every level in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceIndex {
    databases: Vec<DatabaseEntry>,
}

impl ReferenceIndex {
    pub fn from_rows(rows: impl IntoIterator<Item = ReferenceRow>) -> Self {
        let mut databases: Vec<DatabaseEntry> = Vec::new();
        let mut database_slots: HashMap<DatabaseName, usize> = HashMap::new();
        let mut po_slots: HashMap<(usize, PoNumber), usize> = HashMap::new();

        for row in rows {
            let db_slot = *database_slots
                .entry(row.database.clone())
                .or_insert_with(|| {
                    databases.push(DatabaseEntry {
                        name: row.database.clone(),
                        purchase_orders: Vec::new(),
                    });
                    databases.len() - 1
                });
            let purchase_orders = &mut databases[db_slot].purchase_orders;
            let po_slot = *po_slots
                .entry((db_slot, row.po_number.clone()))
                .or_insert_with(|| {
                    purchase_orders.push(PurchaseOrderEntry {
                        number: row.po_number.clone(),
                        items: Vec::new(),
                    });
                    purchase_orders.len() - 1
                });
            let items = &mut purchase_orders[po_slot].items;
            if !items.contains(&row.item) {
                items.push(row.item);
            }
        }

        Self { databases }
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    pub fn entries(&self) -> &[DatabaseEntry] {
        &self.databases
    }

    pub fn databases(&self) -> impl Iterator<Item = &DatabaseName> {
        self.databases.iter().map(|entry| &entry.name)
    }

    pub fn database(&self, name: &str) -> Option<&DatabaseEntry> {
        self.databases
            .iter()
            .find(|entry| entry.name.as_str() == name)
    }

    pub fn po_numbers(&self, database: &str) -> Option<Vec<&PoNumber>> {
        self.database(database).map(|entry| {
            entry
                .purchase_orders
                .iter()
                .map(|po| &po.number)
                .collect()
        })
    }

    pub fn items(&self, database: &str, po_number: &str) -> Option<&[ItemName]> {
        self.database(database)?
            .purchase_order(po_number)
            .map(|po| po.items.as_slice())
    }

    pub fn contains_item(&self, database: &str, po_number: &str, item: &str) -> bool {
        self.items(database, po_number)
            .is_some_and(|items| items.iter().any(|candidate| candidate.as_str() == item))
    }

    /// Number of distinct (database, PO) keys.
    pub fn pair_count(&self) -> usize {
        self.databases
            .iter()
            .map(|entry| entry.purchase_orders.len())
            .sum()
    }
}

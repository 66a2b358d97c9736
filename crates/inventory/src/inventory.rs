use serde::{Deserialize, Serialize};

use petcare_core::{DomainError, DomainResult, InventoryId};

use crate::catalog::{Catalog, CatalogEntry, ItemKind};

/// One stock line: `{name, kind, count}`. Counts are unsigned, so a line can
/// never go negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    pub kind: ItemKind,
    pub count: u32,
}

impl InventoryItem {
    pub fn new(name: impl Into<String>, kind: ItemKind, count: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            count,
        }
    }
}

/// Per-owner stock record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    id: InventoryId,
    items: Vec<InventoryItem>,
}

impl Inventory {
    pub fn new(id: InventoryId, items: Vec<InventoryItem>) -> Self {
        Self { id, items }
    }

    /// A fresh record holding the catalog's starter set.
    pub fn with_defaults(id: InventoryId, catalog: &Catalog) -> Self {
        Self::new(id, catalog.default_items())
    }

    pub fn id(&self) -> InventoryId {
        self.id
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn item(&self, name: &str) -> Option<&InventoryItem> {
        self.items.iter().find(|i| i.name == name)
    }

    /// Units on hand; `0` when the line is absent.
    pub fn count_of(&self, name: &str) -> u32 {
        self.item(name).map(|i| i.count).unwrap_or(0)
    }

    /// Remove `amount` units if (and only if) at least that many are on hand.
    ///
    /// Returns `false` without touching the record when the line is absent or
    /// short. Callers holding the record under a lock get an atomic
    /// check-and-decrement.
    pub fn try_remove(&mut self, name: &str, amount: u32) -> bool {
        match self.items.iter_mut().find(|i| i.name == name) {
            Some(line) if line.count >= amount => {
                line.count -= amount;
                true
            }
            _ => false,
        }
    }

    /// Add `amount` units, appending a new line for an item not yet held.
    pub fn add(&mut self, entry: &CatalogEntry, amount: u32) -> DomainResult<()> {
        match self.items.iter_mut().find(|i| i.name == entry.name) {
            Some(line) => {
                line.count = line.count.checked_add(amount).ok_or_else(|| {
                    DomainError::invalid_argument(format!("stock of '{}' would overflow", entry.name))
                })?;
            }
            None => self
                .items
                .push(InventoryItem::new(entry.name.clone(), entry.kind, amount)),
        }
        Ok(())
    }

    /// Replace every line with the catalog's starter set.
    pub fn reset(&mut self, catalog: &Catalog) {
        self.items = catalog.default_items();
    }
}

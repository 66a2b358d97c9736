use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use petcare_core::InventoryId;
use petcare_inventory::{CatalogEntry, Inventory};

use crate::error::{StoreError, StoreResult};

/// Result of a conditional decrement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecrementOutcome {
    /// Stock sufficed; carries the record after the decrement.
    Applied(Inventory),
    /// Record absent, line absent or short. Nothing changed.
    NotApplied,
}

impl DecrementOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, DecrementOutcome::Applied(_))
    }
}

/// Inventory persistence with atomic stock mutations.
///
/// Implementations must make `conditional_decrement` and `increment` single
/// atomic operations against the backing store (a conditional update, not a
/// read followed by a write).
pub trait InventoryStore: Send + Sync {
    fn insert(&self, inventory: Inventory) -> StoreResult<Inventory>;

    fn get(&self, id: InventoryId) -> StoreResult<Inventory>;

    /// Decrement only if at least `amount` units are on hand.
    fn conditional_decrement(
        &self,
        id: InventoryId,
        item_name: &str,
        amount: u32,
    ) -> StoreResult<DecrementOutcome>;

    /// Add units, appending the line when the record does not hold the item yet.
    fn increment(&self, id: InventoryId, item: &CatalogEntry, amount: u32) -> StoreResult<Inventory>;

    /// Overwrite the items of an existing record.
    fn replace(&self, inventory: Inventory) -> StoreResult<Inventory>;

    /// Returns whether a record was removed.
    fn delete(&self, id: InventoryId) -> StoreResult<bool>;
}

impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    fn insert(&self, inventory: Inventory) -> StoreResult<Inventory> {
        (**self).insert(inventory)
    }

    fn get(&self, id: InventoryId) -> StoreResult<Inventory> {
        (**self).get(id)
    }

    fn conditional_decrement(
        &self,
        id: InventoryId,
        item_name: &str,
        amount: u32,
    ) -> StoreResult<DecrementOutcome> {
        (**self).conditional_decrement(id, item_name, amount)
    }

    fn increment(&self, id: InventoryId, item: &CatalogEntry, amount: u32) -> StoreResult<Inventory> {
        (**self).increment(id, item, amount)
    }

    fn replace(&self, inventory: Inventory) -> StoreResult<Inventory> {
        (**self).replace(inventory)
    }

    fn delete(&self, id: InventoryId) -> StoreResult<bool> {
        (**self).delete(id)
    }
}

/// In-memory inventory store for tests/dev.
///
/// Every mutation runs under the map's write lock, which is what makes the
/// check-and-decrement atomic here.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    inventories: RwLock<HashMap<InventoryId, Inventory>>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InventoryStore for InMemoryInventoryStore {
    fn insert(&self, inventory: Inventory) -> StoreResult<Inventory> {
        let mut map = self.inventories.write().map_err(|_| StoreError::poisoned())?;
        let id = inventory.id();
        if map.contains_key(&id) {
            return Err(StoreError::Duplicate(format!("inventory {id}")));
        }
        map.insert(id, inventory.clone());
        Ok(inventory)
    }

    fn get(&self, id: InventoryId) -> StoreResult<Inventory> {
        let map = self.inventories.read().map_err(|_| StoreError::poisoned())?;
        map.get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("inventory".to_string()))
    }

    fn conditional_decrement(
        &self,
        id: InventoryId,
        item_name: &str,
        amount: u32,
    ) -> StoreResult<DecrementOutcome> {
        let mut map = self.inventories.write().map_err(|_| StoreError::poisoned())?;
        let Some(inventory) = map.get_mut(&id) else {
            return Ok(DecrementOutcome::NotApplied);
        };
        if inventory.try_remove(item_name, amount) {
            Ok(DecrementOutcome::Applied(inventory.clone()))
        } else {
            Ok(DecrementOutcome::NotApplied)
        }
    }

    fn increment(&self, id: InventoryId, item: &CatalogEntry, amount: u32) -> StoreResult<Inventory> {
        let mut map = self.inventories.write().map_err(|_| StoreError::poisoned())?;
        let inventory = map
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("inventory".to_string()))?;
        inventory
            .add(item, amount)
            .map_err(|e| StoreError::Invalid(e.to_string()))?;
        Ok(inventory.clone())
    }

    fn replace(&self, inventory: Inventory) -> StoreResult<Inventory> {
        let mut map = self.inventories.write().map_err(|_| StoreError::poisoned())?;
        let slot = map
            .get_mut(&inventory.id())
            .ok_or_else(|| StoreError::NotFound("inventory".to_string()))?;
        *slot = inventory.clone();
        Ok(inventory)
    }

    fn delete(&self, id: InventoryId) -> StoreResult<bool> {
        let mut map = self.inventories.write().map_err(|_| StoreError::poisoned())?;
        Ok(map.remove(&id).is_some())
    }
}

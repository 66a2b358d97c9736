//! Owner → pet / inventory resolution.
//!
//! The engine never owns this mapping; it only calls through the trait.
//! `bind_pet` is conditional so two concurrent creates for the same owner
//! cannot both succeed.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use petcare_core::{InventoryId, OwnerId, PetId};

use crate::error::{StoreError, StoreResult};

/// What the directory knows about one owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRecord {
    pub owner_id: OwnerId,
    pub inventory_id: InventoryId,
    pub pet_id: Option<PetId>,
}

/// Outcome of a conditional bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    Bound,
    /// The owner already had a pet; nothing changed.
    AlreadyBound(PetId),
}

pub trait OwnershipDirectory: Send + Sync {
    fn register_owner(&self, owner_id: OwnerId, inventory_id: InventoryId) -> StoreResult<()>;

    /// Forget the owner, returning what it was bound to.
    fn remove_owner(&self, owner_id: OwnerId) -> StoreResult<OwnerRecord>;

    fn resolve_inventory_id(&self, owner_id: OwnerId) -> StoreResult<InventoryId>;

    /// `None` when the owner exists but has no pet.
    fn resolve_pet_id(&self, owner_id: OwnerId) -> StoreResult<Option<PetId>>;

    fn bind_pet(&self, owner_id: OwnerId, pet_id: PetId) -> StoreResult<BindOutcome>;

    /// Returns the pet id that was unbound, if any.
    fn unbind_pet(&self, owner_id: OwnerId) -> StoreResult<Option<PetId>>;
}

impl<S> OwnershipDirectory for Arc<S>
where
    S: OwnershipDirectory + ?Sized,
{
    fn register_owner(&self, owner_id: OwnerId, inventory_id: InventoryId) -> StoreResult<()> {
        (**self).register_owner(owner_id, inventory_id)
    }

    fn remove_owner(&self, owner_id: OwnerId) -> StoreResult<OwnerRecord> {
        (**self).remove_owner(owner_id)
    }

    fn resolve_inventory_id(&self, owner_id: OwnerId) -> StoreResult<InventoryId> {
        (**self).resolve_inventory_id(owner_id)
    }

    fn resolve_pet_id(&self, owner_id: OwnerId) -> StoreResult<Option<PetId>> {
        (**self).resolve_pet_id(owner_id)
    }

    fn bind_pet(&self, owner_id: OwnerId, pet_id: PetId) -> StoreResult<BindOutcome> {
        (**self).bind_pet(owner_id, pet_id)
    }

    fn unbind_pet(&self, owner_id: OwnerId) -> StoreResult<Option<PetId>> {
        (**self).unbind_pet(owner_id)
    }
}

/// In-memory directory for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryOwnershipDirectory {
    owners: RwLock<HashMap<OwnerId, OwnerRecord>>,
}

impl InMemoryOwnershipDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn owner_not_found() -> StoreError {
        StoreError::NotFound("owner".to_string())
    }
}

impl OwnershipDirectory for InMemoryOwnershipDirectory {
    fn register_owner(&self, owner_id: OwnerId, inventory_id: InventoryId) -> StoreResult<()> {
        let mut owners = self.owners.write().map_err(|_| StoreError::poisoned())?;
        if owners.contains_key(&owner_id) {
            return Err(StoreError::Duplicate(format!("owner {owner_id}")));
        }
        owners.insert(
            owner_id,
            OwnerRecord {
                owner_id,
                inventory_id,
                pet_id: None,
            },
        );
        Ok(())
    }

    fn remove_owner(&self, owner_id: OwnerId) -> StoreResult<OwnerRecord> {
        let mut owners = self.owners.write().map_err(|_| StoreError::poisoned())?;
        owners.remove(&owner_id).ok_or_else(Self::owner_not_found)
    }

    fn resolve_inventory_id(&self, owner_id: OwnerId) -> StoreResult<InventoryId> {
        let owners = self.owners.read().map_err(|_| StoreError::poisoned())?;
        owners
            .get(&owner_id)
            .map(|r| r.inventory_id)
            .ok_or_else(Self::owner_not_found)
    }

    fn resolve_pet_id(&self, owner_id: OwnerId) -> StoreResult<Option<PetId>> {
        let owners = self.owners.read().map_err(|_| StoreError::poisoned())?;
        owners
            .get(&owner_id)
            .map(|r| r.pet_id)
            .ok_or_else(Self::owner_not_found)
    }

    fn bind_pet(&self, owner_id: OwnerId, pet_id: PetId) -> StoreResult<BindOutcome> {
        let mut owners = self.owners.write().map_err(|_| StoreError::poisoned())?;
        let record = owners.get_mut(&owner_id).ok_or_else(Self::owner_not_found)?;
        if let Some(existing) = record.pet_id {
            return Ok(BindOutcome::AlreadyBound(existing));
        }
        record.pet_id = Some(pet_id);
        Ok(BindOutcome::Bound)
    }

    fn unbind_pet(&self, owner_id: OwnerId) -> StoreResult<Option<PetId>> {
        let mut owners = self.owners.write().map_err(|_| StoreError::poisoned())?;
        let record = owners.get_mut(&owner_id).ok_or_else(Self::owner_not_found)?;
        Ok(record.pet_id.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_is_first_writer_wins() {
        let dir = InMemoryOwnershipDirectory::new();
        let owner = OwnerId::new();
        dir.register_owner(owner, InventoryId::new()).unwrap();

        let first = PetId::new();
        assert_eq!(dir.bind_pet(owner, first).unwrap(), BindOutcome::Bound);
        assert_eq!(
            dir.bind_pet(owner, PetId::new()).unwrap(),
            BindOutcome::AlreadyBound(first)
        );
        assert_eq!(dir.resolve_pet_id(owner).unwrap(), Some(first));
    }

    #[test]
    fn unbind_clears_the_pet() {
        let dir = InMemoryOwnershipDirectory::new();
        let owner = OwnerId::new();
        dir.register_owner(owner, InventoryId::new()).unwrap();
        let pet = PetId::new();
        dir.bind_pet(owner, pet).unwrap();

        assert_eq!(dir.unbind_pet(owner).unwrap(), Some(pet));
        assert_eq!(dir.resolve_pet_id(owner).unwrap(), None);
        assert_eq!(dir.unbind_pet(owner).unwrap(), None);
    }

    #[test]
    fn unknown_owner_is_not_found() {
        let dir = InMemoryOwnershipDirectory::new();
        let owner = OwnerId::new();
        assert!(matches!(dir.resolve_inventory_id(owner), Err(StoreError::NotFound(_))));
        assert!(matches!(dir.bind_pet(owner, PetId::new()), Err(StoreError::NotFound(_))));
        assert!(matches!(dir.remove_owner(owner), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn owners_register_once() {
        let dir = InMemoryOwnershipDirectory::new();
        let owner = OwnerId::new();
        let inventory = InventoryId::new();
        dir.register_owner(owner, inventory).unwrap();
        assert!(matches!(
            dir.register_owner(owner, InventoryId::new()),
            Err(StoreError::Duplicate(_))
        ));
        assert_eq!(dir.resolve_inventory_id(owner).unwrap(), inventory);
    }
}

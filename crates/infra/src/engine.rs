//! Pet state engine (application-level orchestration).
//!
//! Every request follows the same pipeline:
//!
//! ```text
//! owner id
//!   ↓
//! 1. Resolve pet id + inventory id (OwnershipDirectory)
//!   ↓
//! 2. Lock the pet (PetLocks)
//!   ↓
//! 3. Load + catch up decay, persist if anything changed (own CAS write)
//!   ↓
//! 4. Check preconditions (alive, not already sleeping, catalog kind)
//!   ↓
//! 5. Consume the item (single atomic conditional decrement)
//!   ↓
//! 6. Apply the effect and persist (CAS write; refund the item on failure)
//! ```
//!
//! Steps 3 and 6 are separate atomic writes. Aborting between them leaves a
//! caught-up pet and an untouched inventory.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use petcare_core::{AggregateRoot, DomainError, DomainResult, ExpectedVersion, InventoryId, OwnerId, PetId};
use petcare_inventory::{Catalog, Inventory};
use petcare_pet::{CareAction, Pet, PetRules};

use crate::config::EngineConfig;
use crate::ledger::InventoryLedger;
use crate::locks::PetLocks;
use crate::ownership::{BindOutcome, OwnershipDirectory};
use crate::store::{InventoryStore, PetStore};

#[derive(Debug)]
pub struct PetStateEngine<P, I, D> {
    pets: P,
    ledger: InventoryLedger<I>,
    directory: D,
    rules: PetRules,
    catalog: Arc<Catalog>,
    locks: PetLocks,
}

impl<P, I, D> PetStateEngine<P, I, D> {
    pub fn new(pets: P, inventories: I, directory: D, config: EngineConfig) -> Self {
        let EngineConfig { rules, catalog } = config;
        Self {
            pets,
            ledger: InventoryLedger::new(inventories, catalog.clone()),
            directory,
            rules,
            catalog,
            locks: PetLocks::new(),
        }
    }

    pub fn ledger(&self) -> &InventoryLedger<I> {
        &self.ledger
    }

    pub fn rules(&self) -> &PetRules {
        &self.rules
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl<P, I, D> PetStateEngine<P, I, D>
where
    P: PetStore,
    I: InventoryStore,
    D: OwnershipDirectory,
{
    // ----------------------------------------------------------------------
    // Owners
    // ----------------------------------------------------------------------

    /// Create the owner's starter inventory and register the owner.
    #[instrument(skip_all, fields(owner_id = %owner_id))]
    pub fn register_owner(&self, owner_id: OwnerId) -> DomainResult<Inventory> {
        let inventory = self.ledger.create()?;
        if let Err(e) = self.directory.register_owner(owner_id, inventory.id()) {
            self.ledger.delete(inventory.id())?;
            return Err(e.into());
        }
        info!(inventory_id = %inventory.id(), "owner registered");
        Ok(inventory)
    }

    /// Remove the owner together with its pet and inventory.
    ///
    /// The directory entry goes last, so a failure part-way leaves the owner
    /// resolvable and the call can be retried.
    #[instrument(skip_all, fields(owner_id = %owner_id))]
    pub fn delete_owner(&self, owner_id: OwnerId) -> DomainResult<()> {
        let inventory_id = self.directory.resolve_inventory_id(owner_id)?;
        if let Some(pet_id) = self.directory.resolve_pet_id(owner_id)? {
            self.remove_pet(owner_id, pet_id)?;
        }
        self.ledger.delete(inventory_id)?;

        let record = self.directory.remove_owner(owner_id)?;
        if let Some(pet_id) = record.pet_id {
            // Bound by a create that raced this delete.
            self.locks.with_pet(pet_id, || self.pets.delete(pet_id))?;
            self.locks.forget(pet_id);
        }
        info!("owner deleted");
        Ok(())
    }

    pub fn owner_inventory(&self, owner_id: OwnerId) -> DomainResult<Inventory> {
        let inventory_id = self.directory.resolve_inventory_id(owner_id)?;
        self.ledger.get(inventory_id)
    }

    // ----------------------------------------------------------------------
    // Pet lifecycle
    // ----------------------------------------------------------------------

    #[instrument(skip_all, fields(owner_id = %owner_id))]
    pub fn create_pet(&self, owner_id: OwnerId, name: &str, at: DateTime<Utc>) -> DomainResult<Pet> {
        if self.directory.resolve_pet_id(owner_id)?.is_some() {
            return Err(DomainError::AlreadyOwnsPet);
        }

        let pet = self.pets.insert(Pet::create(PetId::new(), name, at)?)?;
        match self.directory.bind_pet(owner_id, pet.id_typed())? {
            BindOutcome::Bound => {
                info!(pet_id = %pet.id_typed(), "pet created");
                Ok(pet)
            }
            BindOutcome::AlreadyBound(existing) => {
                // Lost a concurrent create for the same owner.
                self.pets.delete(pet.id_typed())?;
                debug!(existing = %existing, "create lost the bind race");
                Err(DomainError::AlreadyOwnsPet)
            }
        }
    }

    /// Current snapshot: decay caught up and a finished sleep ended.
    ///
    /// An unfinished sleep is left as is; reading a sleeping pet is not an error.
    #[instrument(skip_all, fields(owner_id = %owner_id))]
    pub fn get_pet(&self, owner_id: OwnerId, at: DateTime<Utc>) -> DomainResult<Pet> {
        let pet_id = self.resolve_pet(owner_id)?;
        self.locks.with_pet(pet_id, || {
            let mut pet = self.load_caught_up(pet_id, at)?;
            let expected = ExpectedVersion::Exact(pet.version());
            if pet.wake_if_rested(at, &self.rules) {
                pet = self.pets.put(pet, expected)?;
                info!(pet_id = %pet_id, energy = pet.energy(), "pet woke up");
            }
            Ok(pet)
        })
    }

    #[instrument(skip_all, fields(owner_id = %owner_id))]
    pub fn rename_pet(&self, owner_id: OwnerId, name: &str, at: DateTime<Utc>) -> DomainResult<Pet> {
        let pet_id = self.resolve_pet(owner_id)?;
        self.locks.with_pet(pet_id, || {
            let mut pet = self.load_caught_up(pet_id, at)?;
            let expected = ExpectedVersion::Exact(pet.version());
            pet.rename(name)?;
            Ok(self.pets.put(pet, expected)?)
        })
    }

    #[instrument(skip_all, fields(owner_id = %owner_id))]
    pub fn delete_pet(&self, owner_id: OwnerId) -> DomainResult<()> {
        let pet_id = self.resolve_pet(owner_id)?;
        self.remove_pet(owner_id, pet_id)
    }

    // ----------------------------------------------------------------------
    // Actions
    // ----------------------------------------------------------------------

    pub fn feed(&self, owner_id: OwnerId, food_name: &str, at: DateTime<Utc>) -> DomainResult<Pet> {
        let (pet_id, inventory_id) = self.resolve(owner_id)?;
        self.perform(pet_id, inventory_id, CareAction::Feed, Some(food_name), at)
    }

    pub fn play(&self, owner_id: OwnerId, at: DateTime<Utc>) -> DomainResult<Pet> {
        let (pet_id, inventory_id) = self.resolve(owner_id)?;
        self.perform(pet_id, inventory_id, CareAction::Play, None, at)
    }

    pub fn clean(&self, owner_id: OwnerId, item_name: &str, at: DateTime<Utc>) -> DomainResult<Pet> {
        let (pet_id, inventory_id) = self.resolve(owner_id)?;
        self.perform(pet_id, inventory_id, CareAction::Clean, Some(item_name), at)
    }

    pub fn start_sleep(&self, owner_id: OwnerId, at: DateTime<Utc>) -> DomainResult<Pet> {
        let (pet_id, inventory_id) = self.resolve(owner_id)?;
        self.perform(pet_id, inventory_id, CareAction::Sleep, None, at)
    }

    /// Wake the pet. No-op for an awake pet; `SleepIncomplete` (pet stays
    /// asleep) before the required hours have passed.
    #[instrument(skip_all, fields(owner_id = %owner_id))]
    pub fn end_sleep(&self, owner_id: OwnerId, at: DateTime<Utc>) -> DomainResult<Pet> {
        let pet_id = self.resolve_pet(owner_id)?;
        self.locks.with_pet(pet_id, || {
            let mut pet = self.load_caught_up(pet_id, at)?;
            let expected = ExpectedVersion::Exact(pet.version());
            if !pet.end_sleep(at, &self.rules)? {
                return Ok(pet);
            }
            let pet = self.pets.put(pet, expected)?;
            info!(pet_id = %pet_id, energy = pet.energy(), "pet woke up");
            Ok(pet)
        })
    }

    /// Run one item-consuming action against explicit ids.
    ///
    /// `item_name` picks the food or cleaning item; toy and sleep-aid actions
    /// use the catalog's item of that kind when it is `None`.
    #[instrument(skip_all, fields(pet_id = %pet_id, inventory_id = %inventory_id, action = %action))]
    pub fn perform(
        &self,
        pet_id: PetId,
        inventory_id: InventoryId,
        action: CareAction,
        item_name: Option<&str>,
        at: DateTime<Utc>,
    ) -> DomainResult<Pet> {
        let result = self.locks.with_pet(pet_id, || {
            let mut pet = self.load_caught_up(pet_id, at)?;
            pet.check_action(action)?;

            let kind = action.required_kind();
            let item = match item_name {
                Some(name) => self.catalog.require_kind(name, kind)?,
                None => self.catalog.first_of_kind(kind).ok_or_else(|| {
                    DomainError::invalid_item(format!("catalog has no {kind} item"))
                })?,
            };

            self.ledger.consume(inventory_id, &item.name, 1)?;

            let expected = ExpectedVersion::Exact(pet.version());
            let saved = pet
                .apply_action(action, at, &self.rules)
                .and_then(|()| self.pets.put(pet, expected).map_err(DomainError::from));

            match saved {
                Ok(pet) => {
                    info!(
                        item = %item.name,
                        hunger = pet.hunger(),
                        happiness = pet.happiness(),
                        hygiene = pet.hygiene(),
                        energy = pet.energy(),
                        alive = pet.is_alive(),
                        "action applied"
                    );
                    Ok(pet)
                }
                Err(err) => {
                    warn!(item = %item.name, error = %err, "action failed after consuming item; refunding");
                    if let Err(refund) = self.ledger.increment(inventory_id, &item.name, 1) {
                        warn!(item = %item.name, error = %refund, "refund failed");
                    }
                    Err(err)
                }
            }
        });

        if matches!(&result, Err(DomainError::NotFound(what)) if what == "pet") {
            self.locks.forget(pet_id);
        }
        result
    }

    // ----------------------------------------------------------------------
    // Internals
    // ----------------------------------------------------------------------

    fn remove_pet(&self, owner_id: OwnerId, pet_id: PetId) -> DomainResult<()> {
        self.locks.with_pet(pet_id, || -> DomainResult<()> {
            self.pets.delete(pet_id)?;
            self.directory.unbind_pet(owner_id)?;
            Ok(())
        })?;
        self.locks.forget(pet_id);
        info!(pet_id = %pet_id, "pet deleted");
        Ok(())
    }

    fn resolve_pet(&self, owner_id: OwnerId) -> DomainResult<PetId> {
        self.directory
            .resolve_pet_id(owner_id)?
            .ok_or_else(|| DomainError::not_found("pet"))
    }

    fn resolve(&self, owner_id: OwnerId) -> DomainResult<(PetId, InventoryId)> {
        let pet_id = self.resolve_pet(owner_id)?;
        let inventory_id = self.directory.resolve_inventory_id(owner_id)?;
        Ok((pet_id, inventory_id))
    }

    /// Load the pet and bring it up to `at`. The catch-up is persisted on its
    /// own before anything else looks at the counters.
    fn load_caught_up(&self, pet_id: PetId, at: DateTime<Utc>) -> DomainResult<Pet> {
        let mut pet = self.pets.get(pet_id)?;
        let expected = ExpectedVersion::Exact(pet.version());
        let outcome = pet.catch_up_decay(at, &self.rules);
        if !outcome.applied {
            return Ok(pet);
        }

        debug!(
            pet_id = %pet_id,
            hunger_lost = outcome.hunger_lost,
            hygiene_lost = outcome.hygiene_lost,
            happiness_lost = outcome.happiness_lost,
            "decay caught up"
        );
        if outcome.died {
            warn!(pet_id = %pet_id, "pet died");
        }
        Ok(self.pets.put(pet, expected)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::InMemoryEngine;

    #[test]
    fn unknown_pet_leaves_no_lock_slot_behind() {
        let engine = InMemoryEngine::in_memory(EngineConfig::default());
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();

        for _ in 0..3 {
            let err = engine
                .perform(PetId::new(), InventoryId::new(), CareAction::Feed, Some("Meat"), at)
                .unwrap_err();
            assert_eq!(err, DomainError::not_found("pet"));
        }

        assert_eq!(engine.locks.tracked(), 0);
    }

    #[test]
    fn known_pet_keeps_its_slot_after_a_failed_action() {
        let engine = InMemoryEngine::in_memory(EngineConfig::default());
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        let owner = OwnerId::new();
        engine.register_owner(owner).unwrap();
        engine.create_pet(owner, "Mochi", at).unwrap();

        engine.feed(owner, "Cake", at).unwrap_err();

        assert_eq!(engine.locks.tracked(), 1);
    }
}

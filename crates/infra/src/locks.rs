//! Per-pet serialization point.
//!
//! Requests against the same pet run one at a time; requests against
//! different pets never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use petcare_core::PetId;

#[derive(Debug, Default)]
pub struct PetLocks {
    slots: Mutex<HashMap<PetId, Arc<Mutex<()>>>>,
}

impl PetLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, pet_id: PetId) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(pet_id).or_default().clone()
    }

    /// Run `f` while holding the pet's lock.
    ///
    /// A poisoned slot is still usable: it guards no data, and the pet record
    /// itself is protected by the store's version check.
    pub fn with_pet<T>(&self, pet_id: PetId, f: impl FnOnce() -> T) -> T {
        let slot = self.slot(pet_id);
        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Drop the slot of a deleted pet.
    pub fn forget(&self, pet_id: PetId) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.remove(&pet_id);
    }

    pub fn tracked(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

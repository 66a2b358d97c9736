use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use petcare_core::{AggregateRoot, ExpectedVersion, PetId};
use petcare_pet::Pet;

use crate::error::{StoreError, StoreResult};

/// Versioned pet persistence.
///
/// `put` is a compare-and-swap: the write lands only when the stored revision
/// matches `expected`, and the returned pet carries the new revision.
pub trait PetStore: Send + Sync {
    /// Store a new pet at revision 1.
    fn insert(&self, pet: Pet) -> StoreResult<Pet>;

    fn get(&self, id: PetId) -> StoreResult<Pet>;

    fn put(&self, pet: Pet, expected: ExpectedVersion) -> StoreResult<Pet>;

    /// Returns whether a record was removed.
    fn delete(&self, id: PetId) -> StoreResult<bool>;
}

impl<S> PetStore for Arc<S>
where
    S: PetStore + ?Sized,
{
    fn insert(&self, pet: Pet) -> StoreResult<Pet> {
        (**self).insert(pet)
    }

    fn get(&self, id: PetId) -> StoreResult<Pet> {
        (**self).get(id)
    }

    fn put(&self, pet: Pet, expected: ExpectedVersion) -> StoreResult<Pet> {
        (**self).put(pet, expected)
    }

    fn delete(&self, id: PetId) -> StoreResult<bool> {
        (**self).delete(id)
    }
}

/// In-memory pet store.
///
/// Intended for tests/dev. The write lock makes each `put` a single atomic
/// version check plus write.
#[derive(Debug, Default)]
pub struct InMemoryPetStore {
    pets: RwLock<HashMap<PetId, Pet>>,
}

impl InMemoryPetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pets.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PetStore for InMemoryPetStore {
    fn insert(&self, mut pet: Pet) -> StoreResult<Pet> {
        let mut pets = self.pets.write().map_err(|_| StoreError::poisoned())?;
        let id = pet.id_typed();
        if pets.contains_key(&id) {
            return Err(StoreError::Duplicate(format!("pet {id}")));
        }
        pet.mark_persisted(1);
        pets.insert(id, pet.clone());
        Ok(pet)
    }

    fn get(&self, id: PetId) -> StoreResult<Pet> {
        let pets = self.pets.read().map_err(|_| StoreError::poisoned())?;
        pets.get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("pet".to_string()))
    }

    fn put(&self, mut pet: Pet, expected: ExpectedVersion) -> StoreResult<Pet> {
        let mut pets = self.pets.write().map_err(|_| StoreError::poisoned())?;
        let id = pet.id_typed();
        let current = pets
            .get(&id)
            .map(|p| p.version())
            .ok_or_else(|| StoreError::NotFound("pet".to_string()))?;

        if !expected.matches(current) {
            return Err(StoreError::Concurrency(format!(
                "pet {id}: expected {expected:?}, found {current}"
            )));
        }

        pet.mark_persisted(current + 1);
        pets.insert(id, pet.clone());
        Ok(pet)
    }

    fn delete(&self, id: PetId) -> StoreResult<bool> {
        let mut pets = self.pets.write().map_err(|_| StoreError::poisoned())?;
        Ok(pets.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_pet() -> Pet {
        Pet::create(PetId::new(), "Mochi", Utc::now()).unwrap()
    }

    #[test]
    fn insert_assigns_first_revision() {
        let store = InMemoryPetStore::new();
        let saved = store.insert(test_pet()).unwrap();
        assert_eq!(saved.version(), 1);
        assert_eq!(store.get(saved.id_typed()).unwrap(), saved);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let store = InMemoryPetStore::new();
        let pet = test_pet();
        store.insert(pet.clone()).unwrap();
        assert!(matches!(store.insert(pet), Err(StoreError::Duplicate(_))));
    }

    #[test]
    fn stale_put_is_rejected() {
        let store = InMemoryPetStore::new();
        let saved = store.insert(test_pet()).unwrap();

        let first = store.put(saved.clone(), ExpectedVersion::Exact(1)).unwrap();
        assert_eq!(first.version(), 2);

        let err = store.put(saved, ExpectedVersion::Exact(1)).unwrap_err();
        assert!(matches!(err, StoreError::Concurrency(_)));
        assert_eq!(store.get(first.id_typed()).unwrap().version(), 2);
    }

    #[test]
    fn put_on_missing_pet_is_not_found() {
        let store = InMemoryPetStore::new();
        let err = store.put(test_pet(), ExpectedVersion::Any).unwrap_err();
        assert_eq!(err, StoreError::NotFound("pet".to_string()));
    }

    #[test]
    fn delete_reports_whether_anything_was_removed() {
        let store = InMemoryPetStore::new();
        let saved = store.insert(test_pet()).unwrap();
        assert!(store.delete(saved.id_typed()).unwrap());
        assert!(!store.delete(saved.id_typed()).unwrap());
        assert!(store.is_empty());
    }
}

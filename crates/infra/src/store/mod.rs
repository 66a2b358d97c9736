//! Collaborator contracts for pet and inventory persistence.
//!
//! The engine only sees these traits. In-memory implementations back tests,
//! benches and the demo binary; a database backend would implement the same
//! traits with a conditional update per call.

pub mod inventory;
pub mod pet;

pub use inventory::{DecrementOutcome, InMemoryInventoryStore, InventoryStore};
pub use pet::{InMemoryPetStore, PetStore};

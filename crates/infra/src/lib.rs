//! Infrastructure layer: stores, the inventory ledger, configuration and the
//! pet state engine that ties them together.

pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod locks;
pub mod ownership;
pub mod store;

pub use config::{ConfigError, EngineConfig};
pub use engine::PetStateEngine;
pub use error::{StoreError, StoreResult};
pub use ledger::InventoryLedger;
pub use locks::PetLocks;
pub use ownership::{BindOutcome, InMemoryOwnershipDirectory, OwnerRecord, OwnershipDirectory};
pub use store::{
    DecrementOutcome, InMemoryInventoryStore, InMemoryPetStore, InventoryStore, PetStore,
};

/// Engine wired to the in-memory stores.
pub type InMemoryEngine =
    PetStateEngine<InMemoryPetStore, InMemoryInventoryStore, InMemoryOwnershipDirectory>;

impl InMemoryEngine {
    pub fn in_memory(config: EngineConfig) -> Self {
        PetStateEngine::new(
            InMemoryPetStore::new(),
            InMemoryInventoryStore::new(),
            InMemoryOwnershipDirectory::new(),
            config,
        )
    }
}

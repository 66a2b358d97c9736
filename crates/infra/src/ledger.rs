//! Inventory ledger: validated, atomic stock mutations.
//!
//! The ledger validates arguments against the injected catalog and then issues
//! exactly one store call per mutation. It never retries: a decrement that
//! did not apply is reported back so the caller can decide what it means.

use std::sync::Arc;

use tracing::{debug, warn};

use petcare_core::{DomainError, DomainResult, InventoryId};
use petcare_inventory::{Catalog, CatalogEntry, Inventory};

use crate::store::{DecrementOutcome, InventoryStore};

#[derive(Debug)]
pub struct InventoryLedger<S> {
    store: S,
    catalog: Arc<Catalog>,
}

impl<S> InventoryLedger<S> {
    pub fn new(store: S, catalog: Arc<Catalog>) -> Self {
        Self { store, catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn validate(&self, item_name: &str, amount: u32) -> DomainResult<&CatalogEntry> {
        if amount == 0 {
            return Err(DomainError::invalid_argument("quantity must be positive"));
        }
        if item_name.trim().is_empty() {
            return Err(DomainError::invalid_argument("item name cannot be empty"));
        }
        self.catalog.entry(item_name).ok_or_else(|| {
            DomainError::invalid_argument(format!("unknown item '{item_name}'"))
        })
    }
}

impl<S> InventoryLedger<S>
where
    S: InventoryStore,
{
    /// Create a new inventory holding the catalog's starter set.
    pub fn create(&self) -> DomainResult<Inventory> {
        let inventory = Inventory::with_defaults(InventoryId::new(), &self.catalog);
        Ok(self.store.insert(inventory)?)
    }

    pub fn get(&self, id: InventoryId) -> DomainResult<Inventory> {
        Ok(self.store.get(id)?)
    }

    /// Atomic check-and-decrement. `NotApplied` covers a missing record, a
    /// missing line and a short line alike.
    pub fn conditional_decrement(
        &self,
        id: InventoryId,
        item_name: &str,
        amount: u32,
    ) -> DomainResult<DecrementOutcome> {
        let entry = self.validate(item_name, amount)?;
        let outcome = self.store.conditional_decrement(id, &entry.name, amount)?;
        if !outcome.is_applied() {
            debug!(inventory_id = %id, item = item_name, amount, "conditional decrement not applied");
        }
        Ok(outcome)
    }

    /// Conditional decrement with `NotApplied` mapped to `InsufficientResource`.
    pub fn consume(&self, id: InventoryId, item_name: &str, amount: u32) -> DomainResult<Inventory> {
        match self.conditional_decrement(id, item_name, amount)? {
            DecrementOutcome::Applied(inventory) => Ok(inventory),
            DecrementOutcome::NotApplied => Err(DomainError::insufficient(format!(
                "need {amount} x '{item_name}'"
            ))),
        }
    }

    pub fn increment(&self, id: InventoryId, item_name: &str, amount: u32) -> DomainResult<Inventory> {
        let entry = self.validate(item_name, amount)?;
        Ok(self.store.increment(id, entry, amount)?)
    }

    /// Replace every line with the catalog's starter set.
    pub fn reset_inventory(&self, id: InventoryId) -> DomainResult<Inventory> {
        let inventory = Inventory::with_defaults(id, &self.catalog);
        Ok(self.store.replace(inventory)?)
    }

    pub fn delete(&self, id: InventoryId) -> DomainResult<()> {
        if !self.store.delete(id)? {
            warn!(inventory_id = %id, "delete of unknown inventory ignored");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryInventoryStore;
    use petcare_inventory::ItemKind;
    use proptest::prelude::*;

    fn ledger() -> InventoryLedger<InMemoryInventoryStore> {
        InventoryLedger::new(InMemoryInventoryStore::new(), Arc::new(Catalog::standard()))
    }

    #[test]
    fn create_seeds_one_of_each_item() {
        let ledger = ledger();
        let inv = ledger.create().unwrap();
        assert_eq!(inv.items(), ledger.catalog().default_items().as_slice());
        assert_eq!(ledger.get(inv.id()).unwrap(), inv);
    }

    #[test]
    fn arguments_are_validated_before_touching_the_store() {
        let ledger = ledger();
        let inv = ledger.create().unwrap();

        for (name, amount) in [("Meat", 0), ("", 1), ("   ", 1), ("Cake", 1)] {
            let err = ledger.conditional_decrement(inv.id(), name, amount).unwrap_err();
            assert!(matches!(err, DomainError::InvalidArgument(_)), "{name}/{amount}");
            let err = ledger.increment(inv.id(), name, amount).unwrap_err();
            assert!(matches!(err, DomainError::InvalidArgument(_)), "{name}/{amount}");
        }
        assert_eq!(ledger.get(inv.id()).unwrap(), inv);
    }

    #[test]
    fn consume_maps_not_applied_to_insufficient_resource() {
        let ledger = ledger();
        let inv = ledger.create().unwrap();

        let after = ledger.consume(inv.id(), "Meat", 1).unwrap();
        assert_eq!(after.count_of("Meat"), 0);

        let err = ledger.consume(inv.id(), "Meat", 1).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientResource(_)));

        let err = ledger.consume(InventoryId::new(), "Meat", 1).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientResource(_)));
    }

    #[test]
    fn increment_on_missing_inventory_is_not_found() {
        let ledger = ledger();
        let err = ledger.increment(InventoryId::new(), "Toy", 1).unwrap_err();
        assert_eq!(err, DomainError::not_found("inventory"));
    }

    #[test]
    fn reset_restores_defaults() {
        let ledger = ledger();
        let inv = ledger.create().unwrap();
        ledger.consume(inv.id(), "Soap", 1).unwrap();
        ledger.increment(inv.id(), "Fish", 5).unwrap();

        let reset = ledger.reset_inventory(inv.id()).unwrap();

        assert_eq!(reset.items(), ledger.catalog().default_items().as_slice());
        assert_eq!(reset.item("Sleep").map(|i| i.kind), Some(ItemKind::SleepAid));
    }

    #[test]
    fn custom_catalog_is_honored() {
        let catalog = Catalog::parse_list("Bone:food,Ball:toy").unwrap();
        let ledger = InventoryLedger::new(InMemoryInventoryStore::new(), Arc::new(catalog));
        let inv = ledger.create().unwrap();

        assert_eq!(inv.items().len(), 2);
        assert!(ledger.consume(inv.id(), "Bone", 1).is_ok());
        assert!(matches!(
            ledger.consume(inv.id(), "Meat", 1),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Use(u32),
        Add(u32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![(1u32..5).prop_map(Op::Use), (1u32..5).prop_map(Op::Add)]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: a decrement applies exactly when the stock covers it, and
        /// the stored count always matches a simple running total.
        #[test]
        fn stock_follows_a_running_total(ops in prop::collection::vec(op_strategy(), 1..60)) {
            let ledger = ledger();
            let id = ledger.create().unwrap().id();
            let mut expected: u32 = 1;

            for op in ops {
                match op {
                    Op::Use(amount) => {
                        let outcome = ledger.conditional_decrement(id, "Carrot", amount).unwrap();
                        prop_assert_eq!(outcome.is_applied(), amount <= expected);
                        if amount <= expected {
                            expected -= amount;
                        }
                    }
                    Op::Add(amount) => {
                        ledger.increment(id, "Carrot", amount).unwrap();
                        expected += amount;
                    }
                }
                prop_assert_eq!(ledger.get(id).unwrap().count_of("Carrot"), expected);
            }
        }
    }
}

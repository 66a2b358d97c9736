//! Registry of the item names the ledger and the pet engine accept.

use core::str::FromStr;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use petcare_core::{DomainError, DomainResult};

use crate::inventory::InventoryItem;

/// What an item is used for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Food,
    Cleaning,
    Toy,
    SleepAid,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Food => "food",
            ItemKind::Cleaning => "cleaning",
            ItemKind::Toy => "toy",
            ItemKind::SleepAid => "sleep_aid",
        }
    }
}

impl core::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "food" => Ok(ItemKind::Food),
            "cleaning" => Ok(ItemKind::Cleaning),
            "toy" => Ok(ItemKind::Toy),
            "sleep_aid" | "sleep-aid" | "sleep" => Ok(ItemKind::SleepAid),
            other => Err(DomainError::invalid_argument(format!(
                "unknown item kind '{other}' (expected food, cleaning, toy or sleep_aid)"
            ))),
        }
    }
}

/// A `(name, kind)` pair. Immutable configuration, not a runtime entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub kind: ItemKind,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Ordered set of valid items.
///
/// Injected into the ledger and the engine at construction so tests can
/// substitute their own fixtures. Entry order is the order of the default
/// starter inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CatalogEntry>", into = "Vec<CatalogEntry>")]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Build a catalog, rejecting blank or duplicate names.
    pub fn new(entries: Vec<CatalogEntry>) -> DomainResult<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.name.trim().is_empty() {
                return Err(DomainError::invalid_argument("catalog item name cannot be empty"));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(DomainError::invalid_argument(format!(
                    "duplicate catalog item '{}'",
                    entry.name
                )));
            }
        }
        Ok(Self { entries })
    }

    /// The starter catalog: four foods, two cleaning items, a toy and a sleep-aid.
    pub fn standard() -> Self {
        let entries = [
            ("Meat", ItemKind::Food),
            ("Fish", ItemKind::Food),
            ("Apple", ItemKind::Food),
            ("Carrot", ItemKind::Food),
            ("Soap", ItemKind::Cleaning),
            ("Toilet_paper", ItemKind::Cleaning),
            ("Toy", ItemKind::Toy),
            ("Sleep", ItemKind::SleepAid),
        ]
        .into_iter()
        .map(|(name, kind)| CatalogEntry::new(name, kind))
        .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn is_valid(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    pub fn entry(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Look up an item that must exist, failing with `InvalidItem`.
    pub fn require(&self, name: &str) -> DomainResult<&CatalogEntry> {
        self.entry(name)
            .ok_or_else(|| DomainError::invalid_item(format!("'{name}' is not in the catalog")))
    }

    /// Look up an item that must exist *and* be of the given kind.
    pub fn require_kind(&self, name: &str, kind: ItemKind) -> DomainResult<&CatalogEntry> {
        let entry = self.require(name)?;
        if entry.kind != kind {
            return Err(DomainError::invalid_item(format!(
                "'{name}' is a {} item, expected {kind}",
                entry.kind
            )));
        }
        Ok(entry)
    }

    /// First entry of a kind (the toy, the sleep-aid).
    pub fn first_of_kind(&self, kind: ItemKind) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    /// One unit of every catalog item, in catalog order.
    pub fn default_items(&self) -> Vec<InventoryItem> {
        self.entries
            .iter()
            .map(|e| InventoryItem::new(e.name.clone(), e.kind, 1))
            .collect()
    }

    /// Parse `name:kind,name:kind` (the `PETCARE_CATALOG` format).
    pub fn parse_list(list: &str) -> DomainResult<Self> {
        let mut entries = Vec::new();
        for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, kind) = part.split_once(':').ok_or_else(|| {
                DomainError::invalid_argument(format!("catalog entry '{part}' must be name:kind"))
            })?;
            entries.push(CatalogEntry::new(name.trim(), kind.parse()?));
        }
        if entries.is_empty() {
            return Err(DomainError::invalid_argument("catalog cannot be empty"));
        }
        Self::new(entries)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<CatalogEntry>> for Catalog {
    type Error = DomainError;

    fn try_from(value: Vec<CatalogEntry>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Catalog> for Vec<CatalogEntry> {
    fn from(value: Catalog) -> Self {
        value.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_knows_the_starter_items() {
        let catalog = Catalog::standard();
        for name in ["Meat", "Fish", "Apple", "Carrot", "Soap", "Toilet_paper", "Toy", "Sleep"] {
            assert!(catalog.is_valid(name), "{name} should be valid");
        }
        assert!(!catalog.is_valid("meat"));
        assert!(!catalog.is_valid("Meet"));
        assert!(!catalog.is_valid(""));
    }

    #[test]
    fn default_items_are_one_of_each_in_order() {
        let catalog = Catalog::standard();
        let items = catalog.default_items();
        assert_eq!(items.len(), catalog.entries().len());
        assert!(items.iter().all(|i| i.count == 1));
        assert_eq!(items[0].name, "Meat");
        assert_eq!(items.last().map(|i| i.kind), Some(ItemKind::SleepAid));
    }

    #[test]
    fn require_kind_rejects_wrong_kind() {
        let catalog = Catalog::standard();
        assert!(catalog.require_kind("Fish", ItemKind::Food).is_ok());
        let err = catalog.require_kind("Soap", ItemKind::Food).unwrap_err();
        assert!(matches!(err, DomainError::InvalidItem(_)));
        let err = catalog.require_kind("Cake", ItemKind::Food).unwrap_err();
        assert!(matches!(err, DomainError::InvalidItem(_)));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = Catalog::new(vec![
            CatalogEntry::new("Toy", ItemKind::Toy),
            CatalogEntry::new("Toy", ItemKind::Food),
        ])
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn parse_list_reads_name_kind_pairs() {
        let catalog = Catalog::parse_list("Bone:food, Brush:cleaning ,Ball:toy,Pillow:sleep_aid").unwrap();
        assert_eq!(catalog.entries().len(), 4);
        assert_eq!(catalog.first_of_kind(ItemKind::Toy).map(|e| e.name.as_str()), Some("Ball"));
        assert!(Catalog::parse_list("Bone").is_err());
        assert!(Catalog::parse_list("Bone:snack").is_err());
        assert!(Catalog::parse_list(" , ").is_err());
    }

    #[test]
    fn deserializing_validates_entries() {
        let json = r#"[{"name":"Toy","kind":"toy"},{"name":"Toy","kind":"toy"}]"#;
        assert!(serde_json::from_str::<Catalog>(json).is_err());

        let json = r#"[{"name":"Bone","kind":"food"},{"name":"Pillow","kind":"sleep_aid"}]"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.require("Pillow").unwrap().kind, ItemKind::SleepAid);
    }
}

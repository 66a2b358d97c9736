//! Engine configuration: pet rules plus the item catalog.
//!
//! Loaded from `PETCARE_*` environment variables on top of the defaults:
//!
//! | Variable | Meaning |
//! |---|---|
//! | `PETCARE_RULES` | full [`PetRules`] as JSON (missing fields keep defaults) |
//! | `PETCARE_HUNGER_ON_FEED` .. `PETCARE_CATCH_UP_INTERVAL_MINUTES` | single-rule overrides |
//! | `PETCARE_CATALOG` | `name:kind,name:kind` |

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use petcare_inventory::Catalog;
use petcare_pet::PetRules;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

impl ConfigError {
    fn invalid(key: &str, reason: impl ToString) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineConfig {
    pub rules: PetRules,
    pub catalog: Arc<Catalog>,
}

impl EngineConfig {
    pub fn new(rules: PetRules, catalog: Catalog) -> Self {
        Self {
            rules,
            catalog: Arc::new(catalog),
        }
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        info!(
            catalog_items = config.catalog.entries().len(),
            catch_up_interval_minutes = config.rules.catch_up_interval_minutes,
            "engine configuration loaded"
        );
        Ok(config)
    }

    /// Load through an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut rules = match lookup("PETCARE_RULES") {
            Some(json) => serde_json::from_str::<PetRules>(&json)
                .map_err(|e| ConfigError::invalid("PETCARE_RULES", e))?,
            None => PetRules::default(),
        };

        override_u8(&lookup, "PETCARE_HUNGER_ON_FEED", &mut rules.hunger_on_feed)?;
        override_u8(&lookup, "PETCARE_HAPPINESS_ON_PLAY", &mut rules.happiness_on_play)?;
        override_u8(&lookup, "PETCARE_ENERGY_COST_ON_PLAY", &mut rules.energy_cost_on_play)?;
        override_u8(&lookup, "PETCARE_HYGIENE_ON_CLEAN", &mut rules.hygiene_on_clean)?;
        override_u8(&lookup, "PETCARE_ENERGY_ON_SLEEP", &mut rules.energy_on_sleep)?;
        override_u8(&lookup, "PETCARE_NO_SLEEP_PENALTY", &mut rules.happiness_penalty_no_sleep)?;
        override_u8(&lookup, "PETCARE_HUNGER_DECAY_POINTS", &mut rules.hunger_decay_points)?;
        override_u8(&lookup, "PETCARE_HYGIENE_DECAY_POINTS", &mut rules.hygiene_decay_points)?;
        override_i64(
            &lookup,
            "PETCARE_NO_SLEEP_PENALTY_AFTER_HOURS",
            &mut rules.no_sleep_penalty_after_hours,
        )?;
        override_i64(&lookup, "PETCARE_SLEEP_REQUIRED_HOURS", &mut rules.sleep_required_hours)?;
        override_i64(
            &lookup,
            "PETCARE_HUNGER_DECAY_BLOCK_HOURS",
            &mut rules.hunger_decay_block_hours,
        )?;
        override_i64(
            &lookup,
            "PETCARE_CATCH_UP_INTERVAL_MINUTES",
            &mut rules.catch_up_interval_minutes,
        )?;

        rules
            .validate()
            .map_err(|e| ConfigError::invalid("PETCARE_RULES", e))?;

        let catalog = match lookup("PETCARE_CATALOG") {
            Some(list) => {
                Catalog::parse_list(&list).map_err(|e| ConfigError::invalid("PETCARE_CATALOG", e))?
            }
            None => Catalog::standard(),
        };

        Ok(Self::new(rules, catalog))
    }
}

fn override_u8<F>(lookup: &F, key: &str, slot: &mut u8) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(key) {
        *slot = raw.trim().parse().map_err(|e| ConfigError::invalid(key, e))?;
        debug!(key, value = *slot, "rule override");
    }
    Ok(())
}

fn override_i64<F>(lookup: &F, key: &str, slot: &mut i64) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(key) {
        *slot = raw.trim().parse().map_err(|e| ConfigError::invalid(key, e))?;
        debug!(key, value = *slot, "rule override");
    }
    Ok(())
}

//! Scripted day in the life of one pet, driven through the in-memory engine.
//!
//! Logs go to stdout as JSON; set `RUST_LOG=debug` to see decay catch-ups.

use anyhow::Context;
use chrono::{TimeDelta, Utc};

use petcare_core::{DomainError, OwnerId};
use petcare_infra::{EngineConfig, InMemoryEngine};

fn main() -> anyhow::Result<()> {
    petcare_observability::init();

    let config = EngineConfig::from_env().context("loading engine configuration")?;
    let engine = InMemoryEngine::in_memory(config);

    let owner = OwnerId::new();
    let start = Utc::now();
    let at = |hours: i64| start + TimeDelta::hours(hours);

    engine.register_owner(owner)?;
    engine.create_pet(owner, "Mochi", start)?;

    engine.feed(owner, "Meat", at(7))?;
    engine.play(owner, at(8))?;
    engine.clean(owner, "Soap", at(12))?;
    engine.start_sleep(owner, at(22))?;

    match engine.end_sleep(owner, at(25)) {
        Err(DomainError::SleepIncomplete { remaining_hours }) => {
            tracing::info!(remaining_hours, "too early to wake up");
        }
        other => {
            other?;
        }
    }

    let pet = engine.get_pet(owner, at(31))?;
    let inventory = engine.owner_inventory(owner)?;

    println!("{}", serde_json::to_string_pretty(&pet)?);
    println!("{}", serde_json::to_string_pretty(&inventory)?);
    Ok(())
}

//! Owner actions and their effects on the pet.
//!
//! Each effect assumes its item cost has already been paid; the engine
//! consumes the item first and only then calls into here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use petcare_core::{DomainError, DomainResult};
use petcare_inventory::ItemKind;

use crate::pet::{Pet, lower, raise};
use crate::rules::PetRules;

/// An item-consuming owner action.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareAction {
    Feed,
    Play,
    Clean,
    Sleep,
}

impl CareAction {
    /// Kind of item the action consumes one unit of.
    pub fn required_kind(self) -> ItemKind {
        match self {
            CareAction::Feed => ItemKind::Food,
            CareAction::Play => ItemKind::Toy,
            CareAction::Clean => ItemKind::Cleaning,
            CareAction::Sleep => ItemKind::SleepAid,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CareAction::Feed => "feed",
            CareAction::Play => "play",
            CareAction::Clean => "clean",
            CareAction::Sleep => "sleep",
        }
    }
}

impl core::fmt::Display for CareAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Pet {
    /// Preconditions that must hold *before* any item is consumed.
    pub fn check_action(&self, action: CareAction) -> DomainResult<()> {
        self.ensure_alive()?;
        if action == CareAction::Sleep && self.is_sleeping {
            return Err(DomainError::AlreadySleeping);
        }
        Ok(())
    }

    /// Apply the effect of an already-paid action.
    pub fn apply_action(
        &mut self,
        action: CareAction,
        now: DateTime<Utc>,
        rules: &PetRules,
    ) -> DomainResult<()> {
        self.check_action(action)?;
        match action {
            CareAction::Feed => {
                self.hunger = raise(self.hunger, rules.hunger_on_feed);
                self.last_fed_time = now;
            }
            CareAction::Play => {
                self.happiness = raise(self.happiness, rules.happiness_on_play);
                self.energy = lower(self.energy, rules.energy_cost_on_play);
            }
            CareAction::Clean => {
                self.hygiene = raise(self.hygiene, rules.hygiene_on_clean);
                self.last_cleaned_time = now;
            }
            CareAction::Sleep => {
                self.is_sleeping = true;
                self.last_sleep_time = now;
            }
        }
        self.settle_vitality();
        Ok(())
    }

    /// Wake the pet once it has slept long enough.
    ///
    /// `Ok(false)` when the pet was not sleeping. Fails closed: an early call
    /// leaves the pet asleep and reports the hours still missing.
    pub fn end_sleep(&mut self, now: DateTime<Utc>, rules: &PetRules) -> DomainResult<bool> {
        self.ensure_alive()?;
        if !self.is_sleeping {
            return Ok(false);
        }

        let slept = now - self.last_sleep_time;
        let required = rules.sleep_required();
        if slept < required {
            let remaining_secs = (required - slept).num_seconds() as f64;
            return Err(DomainError::sleep_incomplete(remaining_secs / 3600.0));
        }

        self.energy = raise(self.energy, rules.energy_on_sleep);
        self.is_sleeping = false;
        Ok(true)
    }

    /// Wake the pet if its sleep is complete; otherwise leave it alone.
    pub fn wake_if_rested(&mut self, now: DateTime<Utc>, rules: &PetRules) -> bool {
        self.is_alive && self.is_sleeping && self.end_sleep(now, rules).unwrap_or(false)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use petcare_core::{AggregateRoot, DomainError, DomainResult, PetId};

/// Upper bound of every well-being counter (lower bound is 0).
pub const COUNTER_MAX: u8 = 100;

/// Lifecycle state derived from the alive/sleeping flags.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetState {
    Awake,
    Asleep,
    /// Terminal; never exited.
    Dead,
}

/// Aggregate root: Pet.
///
/// Counters are `u8` and every mutation goes through [`raise`]/[`lower`], so
/// they stay within `0..=COUNTER_MAX`. `is_alive` only ever flips to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub(crate) id: PetId,
    pub(crate) name: String,

    pub(crate) hunger: u8,
    pub(crate) happiness: u8,
    pub(crate) hygiene: u8,
    pub(crate) energy: u8,

    pub(crate) is_alive: bool,
    pub(crate) is_sleeping: bool,

    pub(crate) birth_date: DateTime<Utc>,
    pub(crate) last_fed_time: DateTime<Utc>,
    pub(crate) last_cleaned_time: DateTime<Utc>,
    pub(crate) last_sleep_time: DateTime<Utc>,
    pub(crate) last_no_sleep_penalty_time: DateTime<Utc>,
    pub(crate) last_state_update_time: DateTime<Utc>,

    /// Whole hunger blocks have been charged up to this instant.
    pub(crate) hunger_decayed_until: DateTime<Utc>,
    /// Whole hygiene hours have been charged up to this instant.
    pub(crate) hygiene_decayed_until: DateTime<Utc>,

    pub(crate) version: u64,
}

impl Pet {
    /// A newborn pet: every counter full, awake, all timestamps at `born_at`.
    pub fn create(id: PetId, name: &str, born_at: DateTime<Utc>) -> DomainResult<Self> {
        let name = validate_name(name)?;
        Ok(Self {
            id,
            name,
            hunger: COUNTER_MAX,
            happiness: COUNTER_MAX,
            hygiene: COUNTER_MAX,
            energy: COUNTER_MAX,
            is_alive: true,
            is_sleeping: false,
            birth_date: born_at,
            last_fed_time: born_at,
            last_cleaned_time: born_at,
            last_sleep_time: born_at,
            last_no_sleep_penalty_time: born_at,
            last_state_update_time: born_at,
            hunger_decayed_until: born_at,
            hygiene_decayed_until: born_at,
            version: 0,
        })
    }

    pub fn id_typed(&self) -> PetId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hunger(&self) -> u8 {
        self.hunger
    }

    pub fn happiness(&self) -> u8 {
        self.happiness
    }

    pub fn hygiene(&self) -> u8 {
        self.hygiene
    }

    pub fn energy(&self) -> u8 {
        self.energy
    }

    pub fn is_alive(&self) -> bool {
        self.is_alive
    }

    pub fn is_sleeping(&self) -> bool {
        self.is_sleeping
    }

    pub fn birth_date(&self) -> DateTime<Utc> {
        self.birth_date
    }

    pub fn last_fed_time(&self) -> DateTime<Utc> {
        self.last_fed_time
    }

    pub fn last_cleaned_time(&self) -> DateTime<Utc> {
        self.last_cleaned_time
    }

    pub fn last_sleep_time(&self) -> DateTime<Utc> {
        self.last_sleep_time
    }

    pub fn last_no_sleep_penalty_time(&self) -> DateTime<Utc> {
        self.last_no_sleep_penalty_time
    }

    pub fn last_state_update_time(&self) -> DateTime<Utc> {
        self.last_state_update_time
    }

    pub fn state(&self) -> PetState {
        match (self.is_alive, self.is_sleeping) {
            (false, _) => PetState::Dead,
            (true, true) => PetState::Asleep,
            (true, false) => PetState::Awake,
        }
    }

    /// Record the revision assigned by a store after an accepted write.
    pub fn mark_persisted(&mut self, version: u64) {
        self.version = version;
    }

    /// Renaming is bookkeeping, not care: it is allowed on dead pets too.
    pub fn rename(&mut self, name: &str) -> DomainResult<()> {
        self.name = validate_name(name)?;
        Ok(())
    }

    pub fn ensure_alive(&self) -> DomainResult<()> {
        if self.is_alive {
            Ok(())
        } else {
            Err(DomainError::DeadPet)
        }
    }

    /// Flip to dead once hunger or energy bottoms out. Returns `true` on the
    /// transition itself.
    pub(crate) fn settle_vitality(&mut self) -> bool {
        if self.is_alive && (self.hunger == 0 || self.energy == 0) {
            self.is_alive = false;
            self.is_sleeping = false;
            return true;
        }
        false
    }
}

impl AggregateRoot for Pet {
    type Id = PetId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

pub(crate) fn raise(value: u8, by: u8) -> u8 {
    value.saturating_add(by).min(COUNTER_MAX)
}

pub(crate) fn lower(value: u8, by: u8) -> u8 {
    value.saturating_sub(by)
}

fn validate_name(name: &str) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_argument("pet name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

//! Tunable constants for decay and action effects.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use petcare_core::{DomainError, DomainResult};

/// Longest accepted duration for any rule, in hours (one year).
pub const MAX_RULE_HOURS: i64 = 24 * 365;

/// Every number the pet lifecycle depends on.
///
/// Durations are stored as whole hours/minutes so the struct stays plain
/// serde data; the accessor methods hand out [`TimeDelta`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PetRules {
    pub hunger_on_feed: u8,
    pub happiness_on_play: u8,
    pub energy_cost_on_play: u8,
    pub hygiene_on_clean: u8,
    pub energy_on_sleep: u8,
    pub happiness_penalty_no_sleep: u8,

    pub no_sleep_penalty_after_hours: i64,
    pub sleep_required_hours: i64,

    /// Hunger lost per full block of `hunger_decay_block_hours`.
    pub hunger_decay_points: u8,
    pub hunger_decay_block_hours: i64,
    /// Hygiene lost per full hour.
    pub hygiene_decay_points: u8,

    /// Minimum spacing between two decay catch-ups.
    pub catch_up_interval_minutes: i64,
}

impl Default for PetRules {
    fn default() -> Self {
        Self {
            hunger_on_feed: 20,
            happiness_on_play: 15,
            energy_cost_on_play: 10,
            hygiene_on_clean: 30,
            energy_on_sleep: 30,
            happiness_penalty_no_sleep: 20,
            no_sleep_penalty_after_hours: 24,
            sleep_required_hours: 8,
            hunger_decay_points: 10,
            hunger_decay_block_hours: 6,
            hygiene_decay_points: 1,
            catch_up_interval_minutes: 60,
        }
    }
}

impl PetRules {
    pub fn validate(&self) -> DomainResult<()> {
        let positive = [
            ("no_sleep_penalty_after_hours", self.no_sleep_penalty_after_hours),
            ("sleep_required_hours", self.sleep_required_hours),
            ("hunger_decay_block_hours", self.hunger_decay_block_hours),
            ("catch_up_interval_minutes", self.catch_up_interval_minutes),
        ];
        for (name, value) in positive {
            if value <= 0 {
                return Err(DomainError::invalid_argument(format!("{name} must be positive")));
            }
        }

        let bounded = [
            ("no_sleep_penalty_after_hours", self.no_sleep_penalty_after_hours),
            ("sleep_required_hours", self.sleep_required_hours),
            ("hunger_decay_block_hours", self.hunger_decay_block_hours),
            ("catch_up_interval_minutes", self.catch_up_interval_minutes / 60),
        ];
        for (name, hours) in bounded {
            if hours > MAX_RULE_HOURS {
                return Err(DomainError::invalid_argument(format!(
                    "{name} must not exceed {MAX_RULE_HOURS} hours"
                )));
            }
        }
        Ok(())
    }

    // Accessors clamp to `1..=MAX_RULE_HOURS` so unvalidated rules still
    // yield durations that datetime arithmetic cannot overflow on.

    pub fn no_sleep_penalty_after(&self) -> TimeDelta {
        clamped_hours(self.no_sleep_penalty_after_hours)
    }

    pub fn sleep_required(&self) -> TimeDelta {
        clamped_hours(self.sleep_required_hours)
    }

    pub fn hunger_decay_block(&self) -> TimeDelta {
        clamped_hours(self.hunger_decay_block_hours)
    }

    pub fn hygiene_decay_block(&self) -> TimeDelta {
        TimeDelta::hours(1)
    }

    pub fn catch_up_interval(&self) -> TimeDelta {
        TimeDelta::minutes(self.catch_up_interval_minutes.clamp(1, MAX_RULE_HOURS * 60))
    }
}

fn clamped_hours(hours: i64) -> TimeDelta {
    TimeDelta::hours(hours.clamp(1, MAX_RULE_HOURS))
}

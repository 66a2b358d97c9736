//! Lazily evaluated, time-driven decay.
//!
//! Decay is recomputed on read instead of by a background scheduler. A
//! catch-up charges only *whole* elapsed blocks and remembers how far it got,
//! so frequent reads neither lose partial blocks nor double-charge them.

use chrono::{DateTime, TimeDelta, Utc};

use crate::pet::{Pet, lower};
use crate::rules::PetRules;

/// What a single catch-up did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecayOutcome {
    /// `false` when the catch-up was skipped (inside the interval, clock moved
    /// backwards, or the pet is dead). A skipped catch-up changes nothing.
    pub applied: bool,
    pub hunger_lost: u8,
    pub hygiene_lost: u8,
    pub happiness_lost: u8,
    /// The pet died during this catch-up.
    pub died: bool,
}

impl DecayOutcome {
    fn skipped() -> Self {
        Self::default()
    }
}

/// Number of whole `block`s between `from` and `now`, and the instant the last
/// whole block ends at.
fn whole_blocks(from: DateTime<Utc>, now: DateTime<Utc>, block: TimeDelta) -> (i64, DateTime<Utc>) {
    let block_secs = block.num_seconds();
    if now <= from || block_secs <= 0 {
        return (0, from);
    }
    let blocks = (now - from).num_seconds() / block_secs;
    (blocks, from + TimeDelta::seconds(blocks * block_secs))
}

fn points_for(blocks: i64, per_block: u8) -> u8 {
    blocks
        .saturating_mul(i64::from(per_block))
        .clamp(0, i64::from(u8::MAX)) as u8
}

impl Pet {
    /// Bring the counters up to `now`.
    ///
    /// At most one catch-up per `rules.catch_up_interval()`; calling again
    /// with the same (or an earlier) `now` is a no-op.
    pub fn catch_up_decay(&mut self, now: DateTime<Utc>, rules: &PetRules) -> DecayOutcome {
        if !self.is_alive {
            return DecayOutcome::skipped();
        }
        if now - self.last_state_update_time < rules.catch_up_interval() {
            return DecayOutcome::skipped();
        }

        let mut outcome = DecayOutcome {
            applied: true,
            ..DecayOutcome::default()
        };

        let hunger_anchor = self.last_fed_time.max(self.hunger_decayed_until);
        let (blocks, until) = whole_blocks(hunger_anchor, now, rules.hunger_decay_block());
        if blocks > 0 {
            let before = self.hunger;
            self.hunger = lower(self.hunger, points_for(blocks, rules.hunger_decay_points));
            outcome.hunger_lost = before - self.hunger;
            self.hunger_decayed_until = until;
        }

        let hygiene_anchor = self.last_cleaned_time.max(self.hygiene_decayed_until);
        let (hours, until) = whole_blocks(hygiene_anchor, now, rules.hygiene_decay_block());
        if hours > 0 {
            let before = self.hygiene;
            self.hygiene = lower(self.hygiene, points_for(hours, rules.hygiene_decay_points));
            outcome.hygiene_lost = before - self.hygiene;
            self.hygiene_decayed_until = until;
        }

        // One penalty per window without sleep; the penalty has its own timer
        // so `last_sleep_time` keeps meaning "when the last sleep started".
        if !self.is_sleeping {
            let awake_since = self.last_sleep_time.max(self.last_no_sleep_penalty_time);
            if now - awake_since > rules.no_sleep_penalty_after() {
                let before = self.happiness;
                self.happiness = lower(self.happiness, rules.happiness_penalty_no_sleep);
                outcome.happiness_lost = before - self.happiness;
                self.last_no_sleep_penalty_time = now;
            }
        }

        outcome.died = self.settle_vitality();
        self.last_state_update_time = now;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pet::{COUNTER_MAX, PetState};
    use chrono::TimeZone;
    use petcare_core::PetId;
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()
    }

    fn hours(h: i64) -> TimeDelta {
        TimeDelta::hours(h)
    }

    fn test_pet() -> Pet {
        Pet::create(PetId::new(), "Mochi", t0()).unwrap()
    }

    #[test]
    fn inside_the_interval_nothing_changes() {
        let rules = PetRules::default();
        let mut pet = test_pet();
        let before = pet.clone();

        let outcome = pet.catch_up_decay(t0() + TimeDelta::minutes(59), &rules);

        assert!(!outcome.applied);
        assert_eq!(pet, before);
    }

    #[test]
    fn second_call_with_same_now_is_idempotent() {
        let rules = PetRules::default();
        let mut pet = test_pet();
        let now = t0() + hours(13);

        assert!(pet.catch_up_decay(now, &rules).applied);
        let after_first = pet.clone();
        let outcome = pet.catch_up_decay(now, &rules);

        assert!(!outcome.applied);
        assert_eq!(pet, after_first);
    }

    #[test]
    fn hunger_loses_ten_per_full_six_hours() {
        let rules = PetRules::default();
        let mut pet = test_pet();

        let outcome = pet.catch_up_decay(t0() + hours(13), &rules);

        assert_eq!(outcome.hunger_lost, 20);
        assert_eq!(pet.hunger(), 80);
        assert_eq!(pet.hunger_decayed_until, t0() + hours(12));
    }

    #[test]
    fn hourly_reads_still_accumulate_hunger() {
        let rules = PetRules::default();
        let mut pet = test_pet();

        for h in 1..=12 {
            pet.catch_up_decay(t0() + hours(h), &rules);
        }

        assert_eq!(pet.hunger(), 80);
        assert_eq!(pet.hygiene(), 88);
    }

    #[test]
    fn hygiene_loses_one_per_full_hour() {
        let rules = PetRules::default();
        let mut pet = test_pet();

        let outcome = pet.catch_up_decay(t0() + hours(5) + TimeDelta::minutes(30), &rules);

        assert_eq!(outcome.hygiene_lost, 5);
        assert_eq!(pet.hygiene(), 95);
    }

    #[test]
    fn feeding_resets_the_hunger_anchor() {
        let rules = PetRules::default();
        let mut pet = test_pet();
        pet.last_fed_time = t0() + hours(10);

        pet.catch_up_decay(t0() + hours(15), &rules);

        assert_eq!(pet.hunger(), 100);
    }

    #[test]
    fn hungry_pet_decays_to_zero_and_dies() {
        let rules = PetRules::default();
        let mut pet = test_pet();
        pet.hunger = 15;

        let outcome = pet.catch_up_decay(t0() + hours(12), &rules);

        assert_eq!(pet.hunger(), 0);
        assert_eq!(outcome.hunger_lost, 15);
        assert!(outcome.died);
        assert_eq!(pet.state(), PetState::Dead);
    }

    #[test]
    fn no_sleep_penalty_applies_once_per_window() {
        let rules = PetRules::default();
        let mut pet = test_pet();

        let outcome = pet.catch_up_decay(t0() + hours(25), &rules);
        assert_eq!(outcome.happiness_lost, 20);
        assert_eq!(pet.happiness(), 80);
        assert_eq!(pet.last_no_sleep_penalty_time(), t0() + hours(25));
        assert_eq!(pet.last_sleep_time(), t0());

        pet.catch_up_decay(t0() + hours(30), &rules);
        assert_eq!(pet.happiness(), 80);

        pet.catch_up_decay(t0() + hours(50), &rules);
        assert_eq!(pet.happiness(), 60);
    }

    #[test]
    fn sleeping_pet_gets_no_penalty() {
        let rules = PetRules::default();
        let mut pet = test_pet();
        pet.is_sleeping = true;

        pet.catch_up_decay(t0() + hours(30), &rules);

        assert_eq!(pet.happiness(), 100);
    }

    #[test]
    fn dead_pet_is_frozen() {
        let rules = PetRules::default();
        let mut pet = test_pet();
        pet.hunger = 5;
        pet.catch_up_decay(t0() + hours(6), &rules);
        assert!(!pet.is_alive());
        let frozen = pet.clone();

        let outcome = pet.catch_up_decay(t0() + hours(100), &rules);

        assert!(!outcome.applied);
        assert_eq!(pet, frozen);
    }

    #[test]
    fn clock_moving_backwards_is_ignored() {
        let rules = PetRules::default();
        let mut pet = test_pet();
        pet.catch_up_decay(t0() + hours(3), &rules);
        let before = pet.clone();

        pet.catch_up_decay(t0() + hours(1), &rules);

        assert_eq!(pet, before);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: any schedule of catch-ups keeps counters in bounds, keeps
        /// the update timestamp monotonic, and kills exactly when hunger or
        /// energy is empty.
        #[test]
        fn decay_keeps_invariants(steps in prop::collection::vec(0i64..(72 * 60), 1..40)) {
            let rules = PetRules::default();
            let mut pet = test_pet();
            let mut now = t0();

            for minutes in steps {
                now += TimeDelta::minutes(minutes);
                let was_alive = pet.is_alive();
                let last_update = pet.last_state_update_time();

                pet.catch_up_decay(now, &rules);

                prop_assert!(pet.hunger() <= COUNTER_MAX);
                prop_assert!(pet.happiness() <= COUNTER_MAX);
                prop_assert!(pet.hygiene() <= COUNTER_MAX);
                prop_assert!(pet.energy() <= COUNTER_MAX);
                prop_assert!(pet.last_state_update_time() >= last_update);
                if !was_alive {
                    prop_assert!(!pet.is_alive());
                }
                if was_alive {
                    prop_assert_eq!(pet.is_alive(), pet.hunger() > 0 && pet.energy() > 0);
                }
            }
        }

        /// Property: catch-up is idempotent for a repeated `now`.
        #[test]
        fn repeated_now_is_a_no_op(offset in 0i64..(200 * 60)) {
            let rules = PetRules::default();
            let mut pet = test_pet();
            let now = t0() + TimeDelta::minutes(offset);

            pet.catch_up_decay(now, &rules);
            let snapshot = pet.clone();
            pet.catch_up_decay(now, &rules);

            prop_assert_eq!(pet, snapshot);
        }
    }
}

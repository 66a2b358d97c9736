//! Pet domain module.
//!
//! The pet record, its tunable rules, lazily evaluated decay and the effects
//! of owner actions. Everything here is a pure function of `(pet, now, rules)`:
//! no clock, no IO, no storage.

pub mod action;
pub mod decay;
pub mod pet;
pub mod rules;

pub use action::CareAction;
pub use decay::DecayOutcome;
pub use pet::{COUNTER_MAX, Pet, PetState};
pub use rules::{MAX_RULE_HOURS, PetRules};

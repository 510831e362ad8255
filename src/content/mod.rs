//! Content Module
//!
//! Deterministic generation of phonics and math challenges from seed tables.

mod catalog;
pub mod math;
pub mod phonics;
pub mod seeds;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use catalog::{generate_all_challenges, Catalog};
pub use math::{MathChallenge, MathDifficulty, MathOperation};
pub use phonics::{
    syllabify, ChallengeKind, Component, ComponentKind, DropZone, PhonicsChallenge, PhonicsTier,
};

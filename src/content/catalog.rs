//! Challenge Catalog
//!
//! The generated phonics and math challenges, built once at startup and
//! shared read-only afterwards.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::content::math::{generate_math, MathChallenge};
use crate::content::phonics::{generate_phonics, PhonicsChallenge};
use crate::content::seeds::PHONICS_SEEDS;

/// Both generated catalogs, in generation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub phonics: Vec<PhonicsChallenge>,
    pub math: Vec<MathChallenge>,
}

/// Generates every challenge from the built-in seed tables.
///
/// Pure: repeated calls return equal catalogs.
pub fn generate_all_challenges() -> Catalog {
    Catalog {
        phonics: generate_phonics(PHONICS_SEEDS),
        math: generate_math(),
    }
}

impl Catalog {
    pub fn phonics_for_period(&self, period: u8) -> Vec<&PhonicsChallenge> {
        self.phonics.iter().filter(|c| c.period == period).collect()
    }

    pub fn math_for_level(&self, level: u8) -> Vec<&MathChallenge> {
        self.math.iter().filter(|c| c.level == level).collect()
    }

    /// Picks a phonics challenge of the given period using the caller's RNG.
    pub fn random_phonics<R: Rng + ?Sized>(&self, period: u8, rng: &mut R) -> Option<&PhonicsChallenge> {
        self.phonics_for_period(period).choose(rng).copied()
    }

    /// Picks a math challenge of the given level using the caller's RNG.
    pub fn random_math<R: Rng + ?Sized>(&self, level: u8, rng: &mut R) -> Option<&MathChallenge> {
        self.math_for_level(level).choose(rng).copied()
    }

    pub fn len(&self) -> usize {
        self.phonics.len() + self.math.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phonics.is_empty() && self.math.is_empty()
    }
}

//! Seed Tables
//!
//! Hand-authored source data the generators expand into challenge catalogs.

use std::ops::RangeInclusive;

/// Seed units for one phonics period.
#[derive(Debug, Clone, Copy)]
pub struct PhonicsPeriodSeed {
    pub period: u8,
    pub phonemes: &'static [&'static str],
    /// Syllable with the phoneme parts it is assembled from.
    pub syllables: &'static [(&'static str, &'static [&'static str])],
    pub words: &'static [&'static str],
}

pub const PHONICS_SEEDS: &[PhonicsPeriodSeed] = &[
    PhonicsPeriodSeed {
        period: 1,
        phonemes: &["a", "i", "o", "u", "é"],
        syllables: &[
            ("ma", &["m", "a"]),
            ("la", &["l", "a"]),
            ("ri", &["r", "i"]),
            ("lo", &["l", "o"]),
            ("mu", &["m", "u"]),
            ("sa", &["s", "a"]),
        ],
        words: &["ami", "lama", "moto", "papa", "rire", "salade"],
    },
    PhonicsPeriodSeed {
        period: 2,
        phonemes: &["ou", "on", "an", "in", "oi"],
        syllables: &[
            ("pou", &["p", "ou"]),
            ("ton", &["t", "on"]),
            ("ban", &["b", "an"]),
            ("vin", &["v", "in"]),
            ("roi", &["r", "oi"]),
            ("fou", &["f", "ou"]),
        ],
        words: &["loupe", "bonbon", "maman", "lapin", "poisson", "mouton"],
    },
    PhonicsPeriodSeed {
        period: 3,
        phonemes: &["ch", "gn", "eu", "au", "ai"],
        syllables: &[
            ("cha", &["ch", "a"]),
            ("gno", &["gn", "o"]),
            ("peu", &["p", "eu"]),
            ("tau", &["t", "au"]),
            ("lai", &["l", "ai"]),
            ("chou", &["ch", "ou"]),
        ],
        words: &[
            "chapeau", "montagne", "cheveu", "bateau", "fontaine", "chocolat",
        ],
    },
    PhonicsPeriodSeed {
        period: 4,
        phonemes: &["ph", "oin", "ill", "eau", "en"],
        syllables: &[
            ("pha", &["ph", "a"]),
            ("coin", &["c", "oin"]),
            ("fille", &["f", "ille"]),
            ("beau", &["b", "eau"]),
            ("tren", &["t", "r", "en"]),
            ("gui", &["gu", "i"]),
        ],
        words: &[
            "éléphant",
            "grenouille",
            "pharmacie",
            "château",
            "téléphone",
            "écureuil",
        ],
    },
    PhonicsPeriodSeed {
        period: 5,
        phonemes: &["ain", "ein", "tion", "ail", "oeu"],
        syllables: &[
            ("pain", &["p", "ain"]),
            ("plein", &["p", "l", "ein"]),
            ("tion", &["t", "ion"]),
            ("vail", &["v", "ail"]),
            ("soeur", &["s", "oeu", "r"]),
            ("crain", &["c", "r", "ain"]),
        ],
        words: &[
            "bibliothèque",
            "dinosaure",
            "hélicoptère",
            "parapluie",
            "récréation",
            "papillon",
        ],
    },
];

// == Math ranges ==
pub const DECOMPOSITION_L1_TARGETS: RangeInclusive<u32> = 2..=5;
pub const DECOMPOSITION_L2_TARGETS: RangeInclusive<u32> = 6..=10;
pub const COMPLEMENT_DEFICIENCIES: RangeInclusive<u32> = 1..=9;
pub const ADDITION_L4_TARGETS: RangeInclusive<u32> = 11..=15;
pub const ADDITION_L5_TARGETS: RangeInclusive<u32> = 16..=20;
/// Values tried for creative level 5 decompositions.
pub const CREATIVE_VALUES: RangeInclusive<u32> = 5..=9;
pub const SIMPLE_SUBTRACTION_MINUENDS: RangeInclusive<u32> = 5..=10;
pub const SIMPLE_SUBTRACTION_SUBTRAHENDS: RangeInclusive<u32> = 1..=3;
pub const TEN_SUBTRACTION_MINUENDS: RangeInclusive<u32> = 15..=20;
pub const TEN_SUBTRACTION_SUBTRAHENDS: RangeInclusive<u32> = 5..=10;

/// Largest stone value a challenge may offer.
pub const MAX_STONE: u32 = 12;
pub const TEN: u32 = 10;

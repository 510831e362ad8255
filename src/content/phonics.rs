//! Phonics Generator
//!
//! Expands the phonics seed tables into assembly-style challenges: the child
//! drags components into ordered drop zones to rebuild the target.

use serde::{Deserialize, Serialize};

use crate::content::seeds::PhonicsPeriodSeed;

// == Tier ==
/// Phonics difficulty tier, one per period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhonicsTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl PhonicsTier {
    pub fn for_period(period: u8) -> Self {
        match period {
            0 | 1 => PhonicsTier::Bronze,
            2 => PhonicsTier::Silver,
            3 => PhonicsTier::Gold,
            4 => PhonicsTier::Platinum,
            _ => PhonicsTier::Diamond,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    Assembly,
    Dictation,
    Speed,
    Creativity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Phoneme,
    Syllable,
    Word,
}

/// A movable piece of a phonics challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub kind: ComponentKind,
    pub content: String,
    pub correct_position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropZone {
    pub position: usize,
    pub accepts: Vec<ComponentKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhonicsChallenge {
    pub id: String,
    pub target: String,
    pub tier: PhonicsTier,
    pub period: u8,
    pub kind: ChallengeKind,
    pub components: Vec<Component>,
    pub drop_zones: Vec<DropZone>,
    pub hint: String,
    pub success_message: String,
    /// Percentage in 90..=98
    pub required_accuracy: u8,
    pub time_limit_secs: Option<u32>,
}

impl PhonicsChallenge {
    /// Components concatenated in their correct order.
    pub fn assembled(&self) -> String {
        let mut ordered: Vec<&Component> = self.components.iter().collect();
        ordered.sort_by_key(|c| c.correct_position);
        ordered.iter().map(|c| c.content.as_str()).collect()
    }
}

/// What a seed unit is, which drives the challenge shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Phoneme,
    Syllable,
    Word,
}

impl Unit {
    fn label(self) -> &'static str {
        match self {
            Unit::Phoneme => "phoneme",
            Unit::Syllable => "syllable",
            Unit::Word => "word",
        }
    }

    /// Kind of the pieces the unit is assembled from.
    fn component_kind(self) -> ComponentKind {
        match self {
            Unit::Phoneme | Unit::Syllable => ComponentKind::Phoneme,
            Unit::Word => ComponentKind::Syllable,
        }
    }

    fn challenge_kind(self, period: u8) -> ChallengeKind {
        match (self, period) {
            (Unit::Phoneme, _) => ChallengeKind::Dictation,
            (Unit::Syllable, 0..=2) => ChallengeKind::Assembly,
            (Unit::Syllable, 3..=4) => ChallengeKind::Speed,
            (Unit::Syllable, _) => ChallengeKind::Creativity,
            (Unit::Word, _) => ChallengeKind::Assembly,
        }
    }
}

// == Generation ==
/// Builds every phonics challenge: per period, phonemes then syllables then words.
pub fn generate_phonics(seeds: &[PhonicsPeriodSeed]) -> Vec<PhonicsChallenge> {
    let mut challenges = Vec::new();

    for seed in seeds {
        for (index, phoneme) in seed.phonemes.iter().enumerate() {
            let parts: Vec<String> = phoneme.chars().map(String::from).collect();
            challenges.push(build(seed.period, Unit::Phoneme, index, phoneme, parts));
        }
        for (index, (syllable, parts)) in seed.syllables.iter().enumerate() {
            let parts = parts.iter().map(|p| p.to_string()).collect();
            challenges.push(build(seed.period, Unit::Syllable, index, syllable, parts));
        }
        for (index, word) in seed.words.iter().enumerate() {
            challenges.push(build(seed.period, Unit::Word, index, word, syllabify(word)));
        }
    }

    challenges
}

fn build(period: u8, unit: Unit, index: usize, target: &str, parts: Vec<String>) -> PhonicsChallenge {
    let component_kind = unit.component_kind();
    let kind = unit.challenge_kind(period);

    let components: Vec<Component> = parts
        .into_iter()
        .enumerate()
        .map(|(position, content)| Component {
            kind: component_kind,
            content,
            correct_position: position,
        })
        .collect();

    let drop_zones = components
        .iter()
        .map(|c| DropZone {
            position: c.correct_position,
            accepts: vec![c.kind],
        })
        .collect();

    PhonicsChallenge {
        id: format!("phonics-p{}-{}-{}", period, unit.label(), index),
        target: target.to_string(),
        tier: PhonicsTier::for_period(period),
        period,
        kind,
        components,
        drop_zones,
        hint: hint_for(unit, target),
        success_message: format!("Bravo ! Tu as construit « {} » !", target),
        required_accuracy: 90 + 2 * (period.clamp(1, 5) - 1),
        time_limit_secs: time_limit_for(unit, kind, period),
    }
}

fn hint_for(unit: Unit, target: &str) -> String {
    match unit {
        Unit::Phoneme => format!("Écoute bien le son « {} » et retrouve ses lettres.", target),
        Unit::Syllable => format!("Assemble les sons pour entendre « {} ».", target),
        Unit::Word => format!("Découpe « {} » en morceaux et remets-les dans l'ordre.", target),
    }
}

fn time_limit_for(unit: Unit, kind: ChallengeKind, period: u8) -> Option<u32> {
    match (unit, kind) {
        (_, ChallengeKind::Speed) => Some(30),
        (Unit::Word, _) if period >= 3 => Some(120 - 15 * u32::from(period - 3)),
        _ => None,
    }
}

// == Syllabification ==
const VOWELS: &str = "aeiouyàâäéèêëîïôöùûüÿ";

fn is_vowel(c: char) -> bool {
    c.to_lowercase().any(|lc| VOWELS.contains(lc))
}

/// Splits a word into syllable-like chunks.
///
/// Scans left to right and closes the current chunk right after a consonant
/// that is followed by a vowel, once the chunk holds more than one character.
/// This is a rough heuristic ("maman" gives "mam" + "an"), not a French
/// syllabifier; the chunks always concatenate back to the word.
pub fn syllabify(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut chunks = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        current.push(c);
        let next_is_vowel = chars.get(i + 1).is_some_and(|&n| is_vowel(n));
        if !is_vowel(c) && next_is_vowel && current.chars().count() > 1 {
            chunks.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

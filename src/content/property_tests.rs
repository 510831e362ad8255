//! Property-Based Tests for Content Generation

use proptest::prelude::*;

use crate::content::phonics::{generate_phonics, syllabify};
use crate::content::seeds::PhonicsPeriodSeed;

// == Strategies ==
/// Lowercase French-looking words, accented vowels included
fn word_strategy() -> impl Strategy<Value = String> {
    "[a-zéèêàçôû]{1,16}".prop_map(|s| s)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Chunks always rebuild the word and are never empty
    #[test]
    fn prop_syllabify_reconstructs_word(word in word_strategy()) {
        let chunks = syllabify(&word);
        prop_assert_eq!(chunks.concat(), word);
        prop_assert!(chunks.iter().all(|c| !c.is_empty()));
    }

    // Only the last chunk may be a lone character
    #[test]
    fn prop_inner_chunks_have_more_than_one_char(word in word_strategy()) {
        let chunks = syllabify(&word);
        if chunks.len() > 1 {
            for chunk in &chunks[..chunks.len() - 1] {
                prop_assert!(chunk.chars().count() > 1, "chunk {:?} of {:?}", chunk, word);
            }
        }
    }

    // Generated word challenges stay consistent for any seed word
    #[test]
    fn prop_word_challenge_is_well_formed(word in word_strategy(), period in 1u8..=5) {
        let words: &'static [&'static str] =
            Box::leak(vec![&*Box::leak(word.clone().into_boxed_str())].into_boxed_slice());
        let seeds = [PhonicsPeriodSeed { period, phonemes: &[], syllables: &[], words }];

        let challenges = generate_phonics(&seeds);
        prop_assert_eq!(challenges.len(), 1);
        let challenge = &challenges[0];
        prop_assert_eq!(challenge.assembled(), word);
        prop_assert_eq!(challenge.components.len(), challenge.drop_zones.len());
        prop_assert!((90..=98).contains(&challenge.required_accuracy));
    }
}

//! Math Generator
//!
//! Enumerates stone challenges level by level: the child picks stones whose
//! values add up to the target.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::content::seeds::{
    ADDITION_L4_TARGETS, ADDITION_L5_TARGETS, COMPLEMENT_DEFICIENCIES, CREATIVE_VALUES,
    DECOMPOSITION_L1_TARGETS, DECOMPOSITION_L2_TARGETS, MAX_STONE, SIMPLE_SUBTRACTION_MINUENDS,
    SIMPLE_SUBTRACTION_SUBTRAHENDS, TEN, TEN_SUBTRACTION_MINUENDS, TEN_SUBTRACTION_SUBTRAHENDS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MathOperation {
    Decomposition,
    Complement,
    Addition,
    Subtraction,
    Comparison,
}

impl MathOperation {
    fn label(self) -> &'static str {
        match self {
            MathOperation::Decomposition => "decomposition",
            MathOperation::Complement => "complement",
            MathOperation::Addition => "addition",
            MathOperation::Subtraction => "subtraction",
            MathOperation::Comparison => "comparison",
        }
    }
}

/// Math difficulty label. Deliberately a different vocabulary from the phonics tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MathDifficulty {
    Facile,
    Moyen,
    Intermediaire,
    Avance,
    Difficile,
}

impl MathDifficulty {
    pub fn for_level(level: u8) -> Self {
        match level {
            0 | 1 => MathDifficulty::Facile,
            2 => MathDifficulty::Moyen,
            3 => MathDifficulty::Intermediaire,
            4 => MathDifficulty::Avance,
            _ => MathDifficulty::Difficile,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathChallenge {
    pub id: String,
    pub operation: MathOperation,
    pub target: u32,
    pub level: u8,
    /// Sorted, unique usable stone values
    pub stones: Vec<u32>,
    /// Each solution is sorted ascending and sums to `target`
    pub solutions: Vec<Vec<u32>>,
    pub prompt: String,
    pub hint: String,
    pub difficulty: MathDifficulty,
    pub time_limit_secs: Option<u32>,
    pub bonus_objective: Option<String>,
}

impl MathChallenge {
    #[allow(clippy::too_many_arguments)]
    fn new(
        id: String,
        operation: MathOperation,
        target: u32,
        level: u8,
        stones: impl IntoIterator<Item = u32>,
        solutions: Vec<Vec<u32>>,
        prompt: String,
        hint: String,
    ) -> Self {
        let stones: BTreeSet<u32> = stones.into_iter().collect();
        Self {
            id,
            operation,
            target,
            level,
            stones: stones.into_iter().collect(),
            solutions: dedup_solutions(solutions),
            prompt,
            hint,
            difficulty: MathDifficulty::for_level(level),
            time_limit_secs: None,
            bonus_objective: None,
        }
    }

    /// True when `values` matches one of the solutions as a multiset.
    pub fn accepts(&self, values: &[u32]) -> bool {
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        self.solutions.iter().any(|s| *s == sorted)
    }
}

/// Sorts each solution and drops multiset duplicates, keeping first-seen order.
fn dedup_solutions(solutions: Vec<Vec<u32>>) -> Vec<Vec<u32>> {
    let mut seen = BTreeSet::new();
    solutions
        .into_iter()
        .map(|mut s| {
            s.sort_unstable();
            s
        })
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

/// Pairs `(a, total - a)` with `1 <= a <= total - a`.
fn ordered_pairs(total: u32) -> Vec<Vec<u32>> {
    (1..=total / 2).map(|a| vec![a, total - a]).collect()
}

// == Generation ==
/// Builds the main set for levels 1 to 5, then appends the subtraction set.
pub fn generate_math() -> Vec<MathChallenge> {
    let mut challenges = Vec::new();

    challenges.extend(decompositions(1, DECOMPOSITION_L1_TARGETS, |t| t + 2));
    challenges.extend(decompositions(2, DECOMPOSITION_L2_TARGETS, |_| MAX_STONE));
    challenges.extend(complements());
    challenges.extend(additions(4, ADDITION_L4_TARGETS));
    challenges.extend(additions(5, ADDITION_L5_TARGETS));
    challenges.extend(simple_subtractions());
    challenges.extend(ten_subtractions());

    challenges
}

fn decompositions(
    level: u8,
    targets: RangeInclusive<u32>,
    max_stone: impl Fn(u32) -> u32,
) -> Vec<MathChallenge> {
    targets
        .map(|target| {
            MathChallenge::new(
                format!("math-l{}-{}-{}", level, MathOperation::Decomposition.label(), target),
                MathOperation::Decomposition,
                target,
                level,
                1..=max_stone(target).min(MAX_STONE),
                ordered_pairs(target),
                format!("Trouve deux pierres qui font {} ensemble.", target),
                format!("Commence par la plus petite pierre et cherche ce qui manque pour faire {}.", target),
            )
        })
        .collect()
}

fn complements() -> Vec<MathChallenge> {
    COMPLEMENT_DEFICIENCIES
        .map(|deficiency| {
            let given = TEN - deficiency;
            let mut challenge = MathChallenge::new(
                format!("math-l3-{}-{}", MathOperation::Complement.label(), deficiency),
                MathOperation::Complement,
                TEN,
                3,
                1..=9,
                vec![vec![deficiency, given]],
                format!("Tu as {}. Combien manque-t-il pour faire 10 ?", given),
                "Compte sur tes doigts à partir du nombre que tu as.".to_string(),
            );
            challenge.time_limit_secs = Some(45);
            challenge
        })
        .collect()
}

fn additions(level: u8, targets: RangeInclusive<u32>) -> Vec<MathChallenge> {
    targets
        .map(|target| {
            let remainder = target - TEN;
            let mut solutions = vec![vec![TEN, remainder]];
            solutions.extend(
                ordered_pairs(remainder)
                    .into_iter()
                    .map(|pair| vec![TEN, pair[0], pair[1]]),
            );
            if level >= 5 {
                solutions.extend(
                    CREATIVE_VALUES
                        .filter(|v| target - v <= MAX_STONE)
                        .map(|v| vec![v, target - v]),
                );
            }

            let mut challenge = MathChallenge::new(
                format!("math-l{}-{}-{}", level, MathOperation::Addition.label(), target),
                MathOperation::Addition,
                target,
                level,
                1..=MAX_STONE,
                solutions,
                format!("Utilise la pierre 10 pour construire {}.", target),
                format!("10 et encore {} font {}.", remainder, target),
            );
            if level >= 5 {
                challenge.time_limit_secs = Some(60);
                challenge.bonus_objective =
                    Some("Trouve au moins deux façons différentes !".to_string());
            } else {
                challenge.time_limit_secs = Some(90);
            }
            challenge
        })
        .collect()
}

fn simple_subtractions() -> Vec<MathChallenge> {
    let mut challenges = Vec::new();
    for minuend in SIMPLE_SUBTRACTION_MINUENDS {
        for subtrahend in SIMPLE_SUBTRACTION_SUBTRAHENDS {
            let level = if minuend <= 7 { 1 } else { 2 };
            let difference = minuend - subtrahend;
            challenges.push(MathChallenge::new(
                subtraction_id(level, minuend, subtrahend),
                MathOperation::Subtraction,
                difference,
                level,
                1..=minuend,
                vec![vec![difference]],
                format!("{} - {} = ?", minuend, subtrahend),
                format!("Enlève {} pierres sur {}.", subtrahend, minuend),
            ));
        }
    }
    challenges
}

fn ten_subtractions() -> Vec<MathChallenge> {
    let mut challenges = Vec::new();
    for minuend in TEN_SUBTRACTION_MINUENDS {
        for subtrahend in TEN_SUBTRACTION_SUBTRAHENDS {
            let difference = minuend - subtrahend;
            let mut solutions = Vec::new();
            if difference <= MAX_STONE {
                solutions.push(vec![difference]);
            }
            if difference > TEN {
                solutions.push(vec![TEN, difference - TEN]);
            }
            let mut challenge = MathChallenge::new(
                subtraction_id(3, minuend, subtrahend),
                MathOperation::Subtraction,
                difference,
                3,
                1..=MAX_STONE,
                solutions,
                format!("{} - {} = ?", minuend, subtrahend),
                ten_subtraction_hint(minuend, subtrahend),
            );
            challenge.time_limit_secs = Some(60);
            challenges.push(challenge);
        }
    }
    challenges
}

/// Bridges through ten only when the subtrahend crosses it.
fn ten_subtraction_hint(minuend: u32, subtrahend: u32) -> String {
    let above_ten = minuend - TEN;
    if subtrahend > above_ten {
        format!(
            "Enlève d'abord {} pour arriver à 10, puis encore {}.",
            above_ten,
            subtrahend - above_ten
        )
    } else {
        format!("Recule de {} en partant de {}.", subtrahend, minuend)
    }
}

fn subtraction_id(level: u8, minuend: u32, subtrahend: u32) -> String {
    format!(
        "math-l{}-{}-{}-{}",
        level,
        MathOperation::Subtraction.label(),
        minuend,
        subtrahend
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decomposition_solutions_sum_to_target() {
        let challenges = generate_math();
        let decompositions: Vec<&MathChallenge> = challenges
            .iter()
            .filter(|c| c.operation == MathOperation::Decomposition)
            .collect();
        assert_eq!(decompositions.len(), 9);

        for c in decompositions {
            assert!(c.level == 1 || c.level == 2);
            assert!(!c.solutions.is_empty());
            for s in &c.solutions {
                assert_eq!(s.len(), 2);
                assert_eq!(s.iter().sum::<u32>(), c.target);
                assert!(s[0] <= s[1]);
            }
        }
    }

    #[test]
    fn test_level_one_stones_include_distractors() {
        let challenges = generate_math();
        let five = challenges.iter().find(|c| c.id == "math-l1-decomposition-5").unwrap();
        assert_eq!(five.stones, (1..=7).collect::<Vec<_>>());
        assert_eq!(five.solutions, vec![vec![1, 4], vec![2, 3]]);

        let eight = challenges.iter().find(|c| c.id == "math-l2-decomposition-8").unwrap();
        assert_eq!(eight.stones, (1..=12).collect::<Vec<_>>());
        assert_eq!(eight.difficulty, MathDifficulty::Moyen);
    }

    #[test]
    fn test_complements_have_single_solution() {
        let challenges = generate_math();
        let complements: Vec<&MathChallenge> = challenges
            .iter()
            .filter(|c| c.operation == MathOperation::Complement)
            .collect();
        assert_eq!(complements.len(), 9);
        for c in complements {
            assert_eq!(c.target, 10);
            assert_eq!(c.solutions.len(), 1);
        }
    }

    #[test]
    fn test_additions_use_ten() {
        let challenges = generate_math();
        let thirteen = challenges.iter().find(|c| c.id == "math-l4-addition-13").unwrap();
        assert_eq!(
            thirteen.solutions,
            vec![vec![3, 10], vec![1, 2, 10]]
        );
        assert!(thirteen.bonus_objective.is_none());
    }

    #[test]
    fn test_level_five_creative_solutions_are_deduplicated() {
        let challenges = generate_math();
        let sixteen = challenges.iter().find(|c| c.id == "math-l5-addition-16").unwrap();
        // [6, 10] comes from both the ten rule and the creative rule
        let count = sixteen.solutions.iter().filter(|s| **s == vec![6, 10]).count();
        assert_eq!(count, 1);
        assert!(sixteen.solutions.contains(&vec![5, 11]));
        assert!(sixteen.solutions.contains(&vec![8, 8]));
        assert!(sixteen.bonus_objective.is_some());
        assert_eq!(sixteen.difficulty, MathDifficulty::Difficile);
    }

    #[test]
    fn test_solutions_are_drawn_from_stones() {
        for c in generate_math() {
            assert!(!c.solutions.is_empty(), "{}", c.id);
            for s in &c.solutions {
                assert_eq!(s.iter().sum::<u32>(), c.target, "{}", c.id);
                for v in s {
                    assert!(c.stones.contains(v), "{} lacks stone {}", c.id, v);
                }
            }
        }
    }

    #[test]
    fn test_subtractions_come_last() {
        let challenges = generate_math();
        let first_subtraction = challenges
            .iter()
            .position(|c| c.operation == MathOperation::Subtraction)
            .unwrap();
        assert!(challenges[first_subtraction..]
            .iter()
            .all(|c| c.operation == MathOperation::Subtraction));
        assert_eq!(challenges.len() - first_subtraction, 18 + 36);
    }

    #[test]
    fn test_accepts_is_order_independent() {
        let challenges = generate_math();
        let thirteen = challenges.iter().find(|c| c.id == "math-l4-addition-13").unwrap();
        assert!(thirteen.accepts(&[10, 2, 1]));
        assert!(!thirteen.accepts(&[6, 7]));
    }

    fn hint_numbers(hint: &str) -> Vec<u32> {
        hint.split(|c: char| !c.is_ascii_digit())
            .filter_map(|token| token.parse().ok())
            .collect()
    }

    #[test]
    fn test_ten_subtraction_hints_add_up_to_subtrahend() {
        let challenges = generate_math();
        let ten_subtractions: Vec<_> = challenges
            .iter()
            .filter(|c| c.id.starts_with("math-l3-subtraction-"))
            .collect();
        assert_eq!(ten_subtractions.len(), 36);

        for c in ten_subtractions {
            let operands = hint_numbers(&c.prompt);
            let (minuend, subtrahend) = (operands[0], operands[1]);
            let numbers = hint_numbers(&c.hint);
            if c.hint.contains("pour arriver à 10") {
                let (first, second) = (numbers[0], numbers[2]);
                assert_eq!(first, minuend - 10, "{}", c.id);
                assert!(second > 0, "{}: {}", c.id, c.hint);
                assert_eq!(first + second, subtrahend, "{}: {}", c.id, c.hint);
            } else {
                assert!(subtrahend <= minuend - 10, "{}", c.id);
                assert_eq!(numbers, vec![subtrahend, minuend], "{}", c.id);
            }
        }
    }

    #[test]
    fn test_small_ten_subtraction_counts_back() {
        let challenges = generate_math();
        let c = challenges
            .iter()
            .find(|c| c.id == "math-l3-subtraction-16-5")
            .unwrap();
        assert_eq!(c.hint, "Recule de 5 en partant de 16.");
    }
}

//! Exercise Module
//!
//! Exercises are what students attempt and what recommendations return. Each
//! carries a configuration tagged by exercise type; generated challenges are
//! wrapped as phonics and math exercises.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::{Catalog, MathChallenge, PhonicsChallenge};

// == Configuration ==
/// Type-specific exercise configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExerciseConfig {
    Qcm {
        question: String,
        choices: Vec<String>,
        correct_index: usize,
    },
    Calculation {
        operation: String,
        operands: Vec<i64>,
        result: i64,
    },
    /// Zone `i` expects `items[i]`.
    DragDrop {
        items: Vec<String>,
        zones: Vec<String>,
    },
    Phonics(PhonicsChallenge),
    Math(MathChallenge),
}

impl ExerciseConfig {
    /// Checks a raw answer against the configuration.
    ///
    /// Returns `None` when the answer does not have the shape this exercise
    /// type expects.
    pub fn evaluate(&self, answer: &Value) -> Option<bool> {
        match self {
            ExerciseConfig::Qcm { correct_index, .. } => {
                let chosen = answer.as_u64()?;
                Some(chosen as usize == *correct_index)
            }
            ExerciseConfig::Calculation { result, .. } => {
                let given = answer.as_i64()?;
                Some(given == *result)
            }
            ExerciseConfig::DragDrop { items, .. } => {
                let placed = string_list(answer)?;
                Some(placed == *items)
            }
            ExerciseConfig::Phonics(challenge) => {
                let placed = string_list(answer)?;
                Some(placed.len() == challenge.components.len() && placed.concat() == challenge.target)
            }
            ExerciseConfig::Math(challenge) => {
                let stones = answer
                    .as_array()?
                    .iter()
                    .map(|v| v.as_u64().and_then(|n| u32::try_from(n).ok()))
                    .collect::<Option<Vec<u32>>>()?;
                Some(challenge.accepts(&stones))
            }
        }
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(String::from))
        .collect()
}

// == Exercise ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub title: String,
    pub module_level: u8,
    /// Authored position within the module
    pub ordre: u32,
    pub points_reward: u32,
    pub active: bool,
    pub configuration: ExerciseConfig,
}

impl Exercise {
    fn from_phonics(challenge: &PhonicsChallenge, ordre: u32) -> Self {
        Self {
            id: challenge.id.clone(),
            title: format!("Construis « {} »", challenge.target),
            module_level: challenge.period,
            ordre,
            points_reward: 10 * u32::from(challenge.period),
            active: true,
            configuration: ExerciseConfig::Phonics(challenge.clone()),
        }
    }

    fn from_math(challenge: &MathChallenge, ordre: u32) -> Self {
        Self {
            id: challenge.id.clone(),
            title: challenge.prompt.clone(),
            module_level: challenge.level,
            ordre,
            points_reward: 5 * u32::from(challenge.level) + 5,
            active: true,
            configuration: ExerciseConfig::Math(challenge.clone()),
        }
    }
}

// == Exercise Catalog ==
/// Read-only exercise reference data, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct ExerciseCatalog {
    exercises: Vec<Exercise>,
    index: HashMap<String, usize>,
}

impl ExerciseCatalog {
    /// Builds a catalog from authored exercises; a later duplicate id wins the lookup.
    pub fn new(exercises: Vec<Exercise>) -> Self {
        let index = exercises
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();
        Self { exercises, index }
    }

    /// Wraps generated challenges: per level, phonics first then math, in generation order.
    pub fn from_challenges(catalog: &Catalog) -> Self {
        let mut next_ordre: HashMap<u8, u32> = HashMap::new();
        let mut take_ordre = |level: u8| {
            let ordre = next_ordre.entry(level).or_insert(0);
            *ordre += 1;
            *ordre
        };

        let mut exercises = Vec::with_capacity(catalog.len());
        for challenge in &catalog.phonics {
            let ordre = take_ordre(challenge.period);
            exercises.push(Exercise::from_phonics(challenge, ordre));
        }
        for challenge in &catalog.math {
            let ordre = take_ordre(challenge.level);
            exercises.push(Exercise::from_math(challenge, ordre));
        }

        Self::new(exercises)
    }

    pub fn get(&self, id: &str) -> Option<&Exercise> {
        self.index.get(id).map(|&i| &self.exercises[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Exercise> {
        self.exercises.iter()
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}

//! Student Module
//!
//! Student profile, adaptation settings and calendar-day streaks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentPreferences {
    pub sound_enabled: bool,
    pub animations_enabled: bool,
    pub theme: String,
}

impl Default for StudentPreferences {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            animations_enabled: true,
            theme: "foret".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: u64,
    pub name: String,
    pub level: u8,
    pub streak: u32,
    pub last_access: Option<NaiveDate>,
    pub total_points: u64,
    pub preferences: StudentPreferences,
}

impl Student {
    pub fn new(id: u64, name: impl Into<String>, level: u8) -> Result<Self> {
        Ok(Self {
            id,
            name: name.into(),
            level: validate_level(level)?,
            streak: 0,
            last_access: None,
            total_points: 0,
            preferences: StudentPreferences::default(),
        })
    }

    /// Records an access on `today`.
    ///
    /// Calendar days, not elapsed time: an access at 23:59 followed by one at
    /// 00:01 counts as consecutive days.
    pub fn touch_streak(&mut self, today: NaiveDate) {
        self.streak = match self.last_access {
            None => 1,
            Some(last) if last == today => self.streak.max(1),
            Some(last) if today.pred_opt() == Some(last) => self.streak + 1,
            Some(_) => 1,
        };
        self.last_access = Some(today);
    }
}

pub fn validate_level(level: u8) -> Result<u8> {
    if (MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        Ok(level)
    } else {
        Err(AppError::validation(
            "INVALID_LEVEL",
            format!("Level must be between {} and {}", MIN_LEVEL, MAX_LEVEL),
        ))
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// A school grade, 1 through 12. Validated at construction so every
/// `Grade` in the system is in range.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(try_from = "u8", into = "u8")]
#[ts(export)]
pub struct Grade(u8);

impl Grade {
    pub fn new(value: u8) -> Result<Self, CoreError> {
        if (1..=12).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CoreError::InvalidGrade(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Age band for this grade. Used only to calibrate prompt tone,
    /// never for branching logic.
    pub fn age_group(self) -> AgeGroup {
        match self.0 {
            1..=3 => AgeGroup::Young,
            4..=6 => AgeGroup::Intermediate,
            7..=9 => AgeGroup::Senior,
            _ => AgeGroup::HighSchool,
        }
    }
}

impl TryFrom<u8> for Grade {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.0
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Learner age band derived from grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AgeGroup {
    Young,
    Intermediate,
    Senior,
    HighSchool,
}

impl AgeGroup {
    /// Tone-calibration phrase inserted into the system prompt.
    pub fn description(self) -> &'static str {
        match self {
            AgeGroup::Young => "young learners (ages 6-9)",
            AgeGroup::Intermediate => "intermediate learners (ages 9-12)",
            AgeGroup::Senior => "senior learners (ages 12-15)",
            AgeGroup::HighSchool => "high school learners (ages 15-18)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_grades() {
        assert!(Grade::new(0).is_err());
        assert!(Grade::new(13).is_err());
        assert!(Grade::new(1).is_ok());
        assert!(Grade::new(12).is_ok());
    }

    #[test]
    fn age_group_boundaries() {
        assert_eq!(Grade::new(3).unwrap().age_group(), AgeGroup::Young);
        assert_eq!(Grade::new(4).unwrap().age_group(), AgeGroup::Intermediate);
        assert_eq!(Grade::new(9).unwrap().age_group(), AgeGroup::Senior);
        assert_eq!(Grade::new(10).unwrap().age_group(), AgeGroup::HighSchool);
    }

    #[test]
    fn deserialization_validates() {
        assert!(serde_json::from_str::<Grade>("7").is_ok());
        assert!(serde_json::from_str::<Grade>("0").is_err());
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// The closed set of subjects the tutor covers.
///
/// Transport layers parse incoming subject strings with [`FromStr`];
/// anything outside this set is rejected before reaching the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum Subject {
    Mathematics,
    English,
    Afrikaans,
    NaturalSciences,
    SocialSciences,
    LifeOrientation,
}

impl Subject {
    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Mathematics => "mathematics",
            Subject::English => "english",
            Subject::Afrikaans => "afrikaans",
            Subject::NaturalSciences => "natural-sciences",
            Subject::SocialSciences => "social-sciences",
            Subject::LifeOrientation => "life-orientation",
        }
    }
}

impl FromStr for Subject {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mathematics" => Ok(Subject::Mathematics),
            "english" => Ok(Subject::English),
            "afrikaans" => Ok(Subject::Afrikaans),
            "natural-sciences" => Ok(Subject::NaturalSciences),
            "social-sciences" => Ok(Subject::SocialSciences),
            "life-orientation" => Ok(Subject::LifeOrientation),
            other => Err(CoreError::InvalidSubject(other.to_string())),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

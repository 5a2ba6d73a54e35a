use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// The questionnaires a user can complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AssessmentType {
    /// Thomas-Kilmann conflict-mode instrument.
    Tki,
    /// Myers-Briggs type, captured from an uploaded report.
    Mbti,
    /// 360° self evaluation, compared against invited evaluators.
    ThreeSixty,
    Wellness,
}

impl AssessmentType {
    pub const ALL: [AssessmentType; 4] = [
        AssessmentType::Tki,
        AssessmentType::Mbti,
        AssessmentType::ThreeSixty,
        AssessmentType::Wellness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentType::Tki => "tki",
            AssessmentType::Mbti => "mbti",
            AssessmentType::ThreeSixty => "three_sixty",
            AssessmentType::Wellness => "wellness",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AssessmentType::Tki => "TKI Conflict Mode",
            AssessmentType::Mbti => "MBTI",
            AssessmentType::ThreeSixty => "360° Feedback",
            AssessmentType::Wellness => "Wellness",
        }
    }

    /// Whether answers are Likert ratings (1–5) averaged per category.
    pub fn is_likert(&self) -> bool {
        matches!(self, AssessmentType::ThreeSixty | AssessmentType::Wellness)
    }
}

impl fmt::Display for AssessmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssessmentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tki" => Ok(AssessmentType::Tki),
            "mbti" => Ok(AssessmentType::Mbti),
            "three_sixty" | "360" => Ok(AssessmentType::ThreeSixty),
            "wellness" => Ok(AssessmentType::Wellness),
            other => Err(CoreError::InvalidAssessmentType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_path_segments() {
        assert_eq!("TKI".parse::<AssessmentType>().unwrap(), AssessmentType::Tki);
        assert_eq!("360".parse::<AssessmentType>().unwrap(), AssessmentType::ThreeSixty);
        assert!("disc".parse::<AssessmentType>().is_err());
    }

    #[test]
    fn as_str_round_trips_through_from_str() {
        for t in AssessmentType::ALL {
            assert_eq!(t.as_str().parse::<AssessmentType>().unwrap(), t);
        }
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The sixteen valid four-letter codes.
pub const MBTI_CODES: [&str; 16] = [
    "ISTJ", "ISFJ", "INFJ", "INTJ", "ISTP", "ISFP", "INFP", "INTP", "ESTP", "ESFP", "ENFP",
    "ENTP", "ESTJ", "ESFJ", "ENFJ", "ENTJ",
];

/// A validated MBTI type code, always stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MbtiType(String);

impl MbtiType {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The four preference pairs and which side this type falls on,
    /// keyed `E_I`, `S_N`, `T_F`, `J_P`.
    pub fn dimensions(&self) -> [(&'static str, char); 4] {
        let letters: Vec<char> = self.0.chars().collect();
        [
            ("E_I", letters[0]),
            ("S_N", letters[1]),
            ("T_F", letters[2]),
            ("J_P", letters[3]),
        ]
    }
}

impl FromStr for MbtiType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        if MBTI_CODES.contains(&upper.as_str()) {
            Ok(MbtiType(upper))
        } else {
            Err(CoreError::InvalidMbtiType(s.to_string()))
        }
    }
}

impl TryFrom<String> for MbtiType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MbtiType> for String {
    fn from(value: MbtiType) -> Self {
        value.0
    }
}

impl fmt::Display for MbtiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

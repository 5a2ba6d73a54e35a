use std::collections::BTreeMap;

use serde::Deserialize;

use compass_core::models::assessment_type::AssessmentType;
use compass_core::models::mbti::MbtiType;
use compass_core::models::question::AssessmentQuestion;

use crate::error::InstrumentError;
use crate::scoring::{Category, Scored};
use crate::Instrument;

/// MBTI: the type is read from an uploaded report rather than answered
/// here, so there is no question bank. Scoring records which side of each
/// preference pair the type falls on.
pub struct Mbti;

#[derive(Deserialize)]
struct MbtiAnswers {
    mbti_type: MbtiType,
}

impl Instrument for Mbti {
    fn name(&self) -> &str {
        "MBTI"
    }

    fn assessment_type(&self) -> AssessmentType {
        AssessmentType::Mbti
    }

    fn categories(&self) -> &[Category] {
        static CATEGORIES: std::sync::LazyLock<Vec<Category>> = std::sync::LazyLock::new(|| {
            vec![
                Category::new("E_I", "Extraversion / Introversion", "1 = E, 0 = I"),
                Category::new("S_N", "Sensing / Intuition", "1 = S, 0 = N"),
                Category::new("T_F", "Thinking / Feeling", "1 = T, 0 = F"),
                Category::new("J_P", "Judging / Perceiving", "1 = J, 0 = P"),
            ]
        });
        &CATEGORIES
    }

    fn default_questions(&self) -> Vec<AssessmentQuestion> {
        Vec::new()
    }

    /// Expects `{"mbti_type": "INFP"}`.
    fn score(
        &self,
        _questions: &[AssessmentQuestion],
        answers: &serde_json::Value,
    ) -> Result<Scored, InstrumentError> {
        let parsed: MbtiAnswers = serde_json::from_value(answers.clone())
            .map_err(|e| InstrumentError::MalformedAnswers(e.to_string()))?;
        Ok(score_type(&parsed.mbti_type))
    }
}

pub fn score_type(mbti_type: &MbtiType) -> Scored {
    let scores: BTreeMap<String, f64> = mbti_type
        .dimensions()
        .iter()
        .map(|(dimension, letter)| {
            let first = dimension.chars().next().unwrap_or_default();
            let value = if *letter == first { 1.0 } else { 0.0 };
            (dimension.to_string(), value)
        })
        .collect();

    Scored {
        scores,
        overall_score: None,
        dominant_result: mbti_type.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_encode_first_letter_as_one() {
        let scored = score_type(&"ESTJ".parse().unwrap());
        assert!(scored.scores.values().all(|v| *v == 1.0));
        let scored = score_type(&"INFP".parse().unwrap());
        assert!(scored.scores.values().all(|v| *v == 0.0));
        assert_eq!(scored.dominant_result, "INFP");
        assert_eq!(scored.overall_score, None);
    }

    #[test]
    fn score_reads_type_from_answers() {
        let scored = Mbti
            .score(&[], &serde_json::json!({ "mbti_type": "enfj" }))
            .unwrap();
        assert_eq!(scored.dominant_result, "ENFJ");
        assert!(Mbti.score(&[], &serde_json::json!({ "mbti_type": "XXXX" })).is_err());
    }
}

use compass_core::models::assessment_type::AssessmentType;
use compass_core::models::question::AssessmentQuestion;

use crate::error::InstrumentError;
use crate::scoring::{likert_bank, parse_likert_answers, score_likert, Category, Scored};
use crate::Instrument;

/// 360° leadership feedback.
/// Six competencies, four statements each, rated 1–5. The same statements
/// are answered by the user and by each invited evaluator.
pub struct ThreeSixty;

const BANK: [(&str, &str); 24] = [
    ("vision", "Communicates a clear direction for the team."),
    ("vision", "Connects day-to-day work to longer-term goals."),
    ("vision", "Anticipates change and prepares the team for it."),
    ("vision", "Inspires others to commit to shared objectives."),
    ("communication", "Listens carefully before responding."),
    ("communication", "Explains decisions and the reasons behind them."),
    ("communication", "Gives feedback that is specific and constructive."),
    ("communication", "Keeps people informed about things that affect them."),
    ("collaboration", "Builds effective working relationships across teams."),
    ("collaboration", "Shares credit for successes."),
    ("collaboration", "Seeks out different perspectives."),
    ("collaboration", "Handles disagreements constructively."),
    ("decision_making", "Makes timely decisions with the information available."),
    ("decision_making", "Weighs risks and trade-offs before acting."),
    ("decision_making", "Involves the right people in important decisions."),
    ("decision_making", "Stands behind decisions once they are made."),
    ("emotional_intelligence", "Stays composed under pressure."),
    ("emotional_intelligence", "Recognizes how their behaviour affects others."),
    ("emotional_intelligence", "Shows genuine interest in the wellbeing of others."),
    ("emotional_intelligence", "Adapts their style to the people and situation."),
    ("accountability", "Follows through on commitments."),
    ("accountability", "Takes ownership of mistakes."),
    ("accountability", "Sets high standards for their own work."),
    ("accountability", "Holds others accountable fairly and consistently."),
];

impl Instrument for ThreeSixty {
    fn name(&self) -> &str {
        "360° Feedback"
    }

    fn assessment_type(&self) -> AssessmentType {
        AssessmentType::ThreeSixty
    }

    fn categories(&self) -> &[Category] {
        static CATEGORIES: std::sync::LazyLock<Vec<Category>> = std::sync::LazyLock::new(|| {
            vec![
                Category::new("vision", "Vision & Direction", "Sets and communicates direction"),
                Category::new("communication", "Communication", "Listens, explains and gives feedback"),
                Category::new("collaboration", "Collaboration", "Works effectively with and across teams"),
                Category::new("decision_making", "Decision Making", "Decides well and on time"),
                Category::new("emotional_intelligence", "Emotional Intelligence", "Self-awareness and empathy"),
                Category::new("accountability", "Accountability", "Ownership and follow-through"),
            ]
        });
        &CATEGORIES
    }

    fn default_questions(&self) -> Vec<AssessmentQuestion> {
        likert_bank(AssessmentType::ThreeSixty, &BANK)
    }

    fn score(
        &self,
        questions: &[AssessmentQuestion],
        answers: &serde_json::Value,
    ) -> Result<Scored, InstrumentError> {
        score_likert(questions, &parse_likert_answers(answers)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_uses_declared_categories() {
        let ids: Vec<&str> = ThreeSixty.categories().iter().map(|c| c.id.as_str()).collect();
        for q in ThreeSixty.default_questions() {
            assert!(ids.contains(&q.category.as_str()), "{}", q.category);
        }
    }

    #[test]
    fn scores_every_category() {
        let bank = ThreeSixty.default_questions();
        let answers: serde_json::Value = bank
            .iter()
            .map(|q| (q.id.to_string(), serde_json::json!(4)))
            .collect::<serde_json::Map<_, _>>()
            .into();
        let scored = ThreeSixty.score(&bank, &answers).unwrap();
        assert_eq!(scored.scores.len(), 6);
        assert!(scored.scores.values().all(|v| *v == 75.0));
        assert_eq!(scored.dominant_result, "vision");
    }
}

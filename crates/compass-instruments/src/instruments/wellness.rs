use compass_core::models::assessment_type::AssessmentType;
use compass_core::models::question::AssessmentQuestion;

use crate::error::InstrumentError;
use crate::scoring::{likert_bank, parse_likert_answers, score_likert, Category, Scored};
use crate::Instrument;

/// Wellness survey. Six dimensions, rated 1–5.
pub struct Wellness;

const BANK: [(&str, &str); 24] = [
    ("physical", "I get enough sleep to feel rested most days."),
    ("physical", "I am physically active several times a week."),
    ("physical", "I eat in a way that keeps my energy steady."),
    ("physical", "I take breaks during long working sessions."),
    ("emotional", "I can name what I am feeling when it matters."),
    ("emotional", "I recover quickly from setbacks."),
    ("emotional", "I feel generally optimistic about the future."),
    ("emotional", "I am kind to myself when I make mistakes."),
    ("social", "I have people I can rely on at work."),
    ("social", "I have people I can rely on outside work."),
    ("social", "I make time for relationships that matter to me."),
    ("social", "I feel a sense of belonging in my team."),
    ("work_life_balance", "I can switch off from work in my own time."),
    ("work_life_balance", "My workload is sustainable."),
    ("work_life_balance", "I protect time for the things I enjoy."),
    ("work_life_balance", "I rarely miss personal commitments because of work."),
    ("stress_management", "I have reliable ways to manage stress."),
    ("stress_management", "I notice early signs that I am under strain."),
    ("stress_management", "Pressure rarely affects the quality of my decisions."),
    ("stress_management", "I ask for help before problems become overwhelming."),
    ("purpose", "My work feels meaningful to me."),
    ("purpose", "I understand how my role contributes to the bigger picture."),
    ("purpose", "I am growing and learning in my current role."),
    ("purpose", "My day-to-day work reflects my values."),
];

impl Instrument for Wellness {
    fn name(&self) -> &str {
        "Wellness"
    }

    fn assessment_type(&self) -> AssessmentType {
        AssessmentType::Wellness
    }

    fn categories(&self) -> &[Category] {
        static CATEGORIES: std::sync::LazyLock<Vec<Category>> = std::sync::LazyLock::new(|| {
            vec![
                Category::new("physical", "Physical", "Sleep, activity and energy"),
                Category::new("emotional", "Emotional", "Awareness and resilience"),
                Category::new("social", "Social", "Support and belonging"),
                Category::new("work_life_balance", "Work-Life Balance", "Sustainable boundaries"),
                Category::new("stress_management", "Stress Management", "Coping under pressure"),
                Category::new("purpose", "Purpose", "Meaning and growth"),
            ]
        });
        &CATEGORIES
    }

    fn default_questions(&self) -> Vec<AssessmentQuestion> {
        likert_bank(AssessmentType::Wellness, &BANK)
    }

    fn score(
        &self,
        questions: &[AssessmentQuestion],
        answers: &serde_json::Value,
    ) -> Result<Scored, InstrumentError> {
        score_likert(questions, &parse_likert_answers(answers)?)
    }
}

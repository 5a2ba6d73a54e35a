//! compass-instruments
//!
//! Leadership assessment instrument definitions. Pure data and arithmetic, with
//! no AWS dependency. Defines the categories, default question banks and
//! scoring rules for each supported instrument.

pub mod error;
pub mod instruments;
pub mod scoring;

use compass_core::models::assessment_type::AssessmentType;
use compass_core::models::question::AssessmentQuestion;

use error::InstrumentError;
use scoring::{Category, Scored};

/// Trait implemented by each assessment instrument.
pub trait Instrument: Send + Sync {
    /// Unique identifier, matching the assessment type's path segment.
    fn id(&self) -> &str {
        self.assessment_type().as_str()
    }

    /// Human-readable name (e.g., "TKI Conflict Mode").
    fn name(&self) -> &str;

    fn assessment_type(&self) -> AssessmentType;

    /// The categories (or modes) results are reported in.
    fn categories(&self) -> &[Category];

    /// The built-in question bank, used until an administrator stores one.
    /// Ids are deterministic so answers stay valid across requests.
    fn default_questions(&self) -> Vec<AssessmentQuestion>;

    /// Score a raw answer map against the active question set.
    fn score(
        &self,
        questions: &[AssessmentQuestion],
        answers: &serde_json::Value,
    ) -> Result<Scored, InstrumentError>;

    /// Format a result as structured text for inclusion in a model prompt
    /// or a report body.
    fn to_structured_input(&self, scored: &Scored) -> String {
        let mut output = format!("## {}\n\n", self.name());
        for category in self.categories() {
            if let Some(value) = scored.scores.get(&category.id) {
                output.push_str(&format!("- {}: {}\n", category.name, value));
            }
        }
        if let Some(overall) = scored.overall_score {
            output.push_str(&format!("\nOverall: {overall}\n"));
        }
        output.push_str(&format!("Dominant: {}\n", scored.dominant_result));
        output
    }
}

/// Return all registered instruments.
pub fn all_instruments() -> Vec<Box<dyn Instrument>> {
    vec![
        Box::new(instruments::tki::Tki),
        Box::new(instruments::mbti::Mbti),
        Box::new(instruments::three_sixty::ThreeSixty),
        Box::new(instruments::wellness::Wellness),
    ]
}

/// Look up an instrument by ID.
pub fn get_instrument(id: &str) -> Option<Box<dyn Instrument>> {
    all_instruments().into_iter().find(|i| i.id() == id)
}

/// Look up the instrument for an assessment type.
pub fn instrument_for(assessment_type: AssessmentType) -> Box<dyn Instrument> {
    match assessment_type {
        AssessmentType::Tki => Box::new(instruments::tki::Tki),
        AssessmentType::Mbti => Box::new(instruments::mbti::Mbti),
        AssessmentType::ThreeSixty => Box::new(instruments::three_sixty::ThreeSixty),
        AssessmentType::Wellness => Box::new(instruments::wellness::Wellness),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_assessment_type() {
        for t in AssessmentType::ALL {
            let instrument = get_instrument(t.as_str()).expect("registered");
            assert_eq!(instrument.assessment_type(), t);
            assert_eq!(instrument_for(t).id(), t.as_str());
        }
    }

    #[test]
    fn default_question_ids_are_stable() {
        for instrument in all_instruments() {
            let first: Vec<_> = instrument.default_questions().iter().map(|q| q.id).collect();
            let second: Vec<_> = instrument.default_questions().iter().map(|q| q.id).collect();
            assert_eq!(first, second, "{}", instrument.id());
        }
    }
}

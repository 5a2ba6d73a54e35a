use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use compass_core::models::assessment_type::AssessmentType;
use compass_core::models::question::AssessmentQuestion;

use crate::error::InstrumentError;

/// Lowest and highest Likert rating.
pub const LIKERT_MIN: u8 = 1;
pub const LIKERT_MAX: u8 = 5;

/// A reporting category (a Likert scale or a TKI conflict mode).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl Category {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: Some(description.to_string()),
        }
    }
}

/// The outcome of scoring one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Scored {
    pub scores: BTreeMap<String, f64>,
    pub overall_score: Option<f64>,
    pub dominant_result: String,
}

/// Self versus evaluator view of one 360° category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryComparison {
    pub category: String,
    pub self_score: Option<f64>,
    pub others_score: Option<f64>,
    /// `others_score - self_score` when both are present.
    pub gap: Option<f64>,
    pub evaluator_count: usize,
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Convert a mean Likert rating to a 0–100 percentage.
/// A mean of 1 maps to 0 and a mean of 5 maps to 100.
pub fn likert_percentage(mean: f64) -> f64 {
    let span = f64::from(LIKERT_MAX - LIKERT_MIN);
    ((mean - f64::from(LIKERT_MIN)) / span * 100.0).clamp(0.0, 100.0)
}

/// Parse a JSON answer object of `question_id -> rating`.
pub fn parse_likert_answers(
    answers: &serde_json::Value,
) -> Result<BTreeMap<String, u8>, InstrumentError> {
    serde_json::from_value(answers.clone())
        .map_err(|e| InstrumentError::MalformedAnswers(e.to_string()))
}

/// Average Likert ratings per category and convert to percentages.
///
/// Unanswered questions are skipped and categories with no answers are
/// omitted. The overall score is the mean of the category percentages; the
/// dominant result is the highest category, ties going to the category that
/// appears first in question order.
pub fn score_likert(
    questions: &[AssessmentQuestion],
    answers: &BTreeMap<String, u8>,
) -> Result<Scored, InstrumentError> {
    if answers.is_empty() {
        return Err(InstrumentError::NoAnswers);
    }

    let by_id: HashMap<String, &AssessmentQuestion> =
        questions.iter().map(|q| (q.id.to_string(), q)).collect();

    for (question_id, &value) in answers {
        if !by_id.contains_key(question_id) {
            return Err(InstrumentError::UnknownQuestion(question_id.clone()));
        }
        if !(LIKERT_MIN..=LIKERT_MAX).contains(&value) {
            return Err(InstrumentError::OutOfRange {
                question_id: question_id.clone(),
                value,
            });
        }
    }

    let percentages = category_percentages(questions, answers);

    let overall = percentages.iter().map(|(_, pct)| pct).sum::<f64>() / percentages.len() as f64;

    let mut dominant: Option<&(String, f64)> = None;
    for entry in &percentages {
        if dominant.is_none_or(|best| entry.1 > best.1) {
            dominant = Some(entry);
        }
    }
    let dominant_result = dominant.map(|(c, _)| c.clone()).unwrap_or_default();

    Ok(Scored {
        scores: percentages
            .iter()
            .map(|(c, pct)| (c.clone(), round1(*pct)))
            .collect(),
        overall_score: Some(round1(overall)),
        dominant_result,
    })
}

/// Per-category percentages in first-appearance order of the (sorted)
/// questions. Answers for unknown questions or out-of-range values are
/// ignored here; validation happens in [`score_likert`].
fn category_percentages(
    questions: &[AssessmentQuestion],
    answers: &BTreeMap<String, u8>,
) -> Vec<(String, f64)> {
    let mut sorted: Vec<&AssessmentQuestion> = questions.iter().collect();
    sorted.sort_by_key(|q| q.order);

    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, (u32, u32)> = HashMap::new();

    for question in sorted {
        let Some(&value) = answers.get(&question.id.to_string()) else {
            continue;
        };
        if !(LIKERT_MIN..=LIKERT_MAX).contains(&value) {
            continue;
        }
        let entry = sums.entry(question.category.clone()).or_insert_with(|| {
            order.push(question.category.clone());
            (0, 0)
        });
        entry.0 += u32::from(value);
        entry.1 += 1;
    }

    order
        .into_iter()
        .map(|category| {
            let (sum, count) = sums[&category];
            let pct = likert_percentage(f64::from(sum) / f64::from(count));
            (category, pct)
        })
        .collect()
}

/// Compare a user's self ratings with the ratings of their evaluators.
///
/// `evaluator_answers` holds one answer map per completed evaluator. The
/// others score is the mean of each evaluator's category percentage.
pub fn compare_three_sixty(
    questions: &[AssessmentQuestion],
    self_answers: Option<&BTreeMap<String, u8>>,
    evaluator_answers: &[BTreeMap<String, u8>],
) -> Vec<CategoryComparison> {
    let self_pcts: HashMap<String, f64> = self_answers
        .map(|a| category_percentages(questions, a).into_iter().collect())
        .unwrap_or_default();

    let mut others: HashMap<String, Vec<f64>> = HashMap::new();
    for answers in evaluator_answers {
        for (category, pct) in category_percentages(questions, answers) {
            others.entry(category).or_default().push(pct);
        }
    }

    let mut sorted: Vec<&AssessmentQuestion> = questions.iter().collect();
    sorted.sort_by_key(|q| q.order);
    let mut categories: Vec<String> = Vec::new();
    for q in sorted {
        if !categories.contains(&q.category) {
            categories.push(q.category.clone());
        }
    }

    categories
        .into_iter()
        .map(|category| {
            let self_score = self_pcts.get(&category).copied().map(round1);
            let ratings = others.get(&category);
            let evaluator_count = ratings.map_or(0, Vec::len);
            let others_score = ratings
                .filter(|r| !r.is_empty())
                .map(|r| round1(r.iter().sum::<f64>() / r.len() as f64));
            let gap = match (self_score, others_score) {
                (Some(s), Some(o)) => Some(round1(o - s)),
                _ => None,
            };
            CategoryComparison {
                category,
                self_score,
                others_score,
                gap,
                evaluator_count,
            }
        })
        .collect()
}

/// Namespace for deterministic default-question ids.
const QUESTION_NAMESPACE: Uuid = Uuid::from_u128(0x6c1f_7a52_9d0e_4b8a_a3f4_51c2_8e07_d915);

/// Build a built-in question with an id derived from its type and position.
pub fn default_question(
    assessment_type: AssessmentType,
    order: u32,
    category: &str,
    content: String,
) -> AssessmentQuestion {
    let name = format!("{}/{order}", assessment_type.as_str());
    AssessmentQuestion {
        id: Uuid::new_v5(&QUESTION_NAMESPACE, name.as_bytes()),
        assessment_type,
        content,
        category: category.to_string(),
        order,
        created_at: jiff::Timestamp::UNIX_EPOCH,
        updated_at: jiff::Timestamp::UNIX_EPOCH,
    }
}

/// Build a Likert question bank from `(category, statement)` rows.
pub fn likert_bank(
    assessment_type: AssessmentType,
    rows: &[(&str, &str)],
) -> Vec<AssessmentQuestion> {
    rows.iter()
        .enumerate()
        .map(|(i, (category, text))| {
            default_question(assessment_type, i as u32 + 1, category, text.to_string())
        })
        .collect()
}

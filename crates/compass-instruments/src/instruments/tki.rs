use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use compass_core::models::assessment_type::AssessmentType;
use compass_core::models::question::AssessmentQuestion;

use crate::error::InstrumentError;
use crate::scoring::{default_question, round1, Category, Scored};
use crate::Instrument;

use ConflictMode::{
    Accommodating as Acc, Avoiding as Avo, Collaborating as Col, Competing as Com,
    Compromising as Cmp,
};

/// Number of forced-choice pairs in the TKI.
pub const PAIR_COUNT: usize = 30;

/// Highest possible tally for one mode: each mode appears on 12 pairs.
pub const MODE_CEILING: u32 = 12;

/// TKI: Thomas-Kilmann Conflict Mode Instrument.
/// 30 forced-choice pairs, each statement tagged with one of five modes.
pub struct Tki;

/// The five conflict-handling modes, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ConflictMode {
    Competing,
    Collaborating,
    Compromising,
    Avoiding,
    Accommodating,
}

impl ConflictMode {
    pub const ALL: [ConflictMode; 5] = [
        ConflictMode::Competing,
        ConflictMode::Collaborating,
        ConflictMode::Compromising,
        ConflictMode::Avoiding,
        ConflictMode::Accommodating,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictMode::Competing => "competing",
            ConflictMode::Collaborating => "collaborating",
            ConflictMode::Compromising => "compromising",
            ConflictMode::Avoiding => "avoiding",
            ConflictMode::Accommodating => "accommodating",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TkiStatement {
    pub text: String,
    pub mode: ConflictMode,
}

/// The JSON stored in a TKI question's `content`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TkiPair {
    pub a: TkiStatement,
    pub b: TkiStatement,
}

impl TkiPair {
    pub fn parse(question: &AssessmentQuestion) -> Result<Self, InstrumentError> {
        let pair: TkiPair = serde_json::from_str(&question.content).map_err(|e| {
            InstrumentError::InvalidQuestion {
                question_id: question.id.to_string(),
                reason: e.to_string(),
            }
        })?;
        if pair.a.mode == pair.b.mode {
            return Err(InstrumentError::InvalidQuestion {
                question_id: question.id.to_string(),
                reason: "both statements carry the same mode".to_string(),
            });
        }
        Ok(pair)
    }

    pub fn mode_for(&self, choice: TkiChoice) -> ConflictMode {
        match choice {
            TkiChoice::A => self.a.mode,
            TkiChoice::B => self.b.mode,
        }
    }

    /// The category label stored alongside the question, e.g. `competing/avoiding`.
    pub fn category(&self) -> String {
        format!("{}/{}", self.a.mode.as_str(), self.b.mode.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum TkiChoice {
    #[serde(rename = "a", alias = "A")]
    A,
    #[serde(rename = "b", alias = "B")]
    B,
}

impl Instrument for Tki {
    fn name(&self) -> &str {
        "TKI Conflict Mode"
    }

    fn assessment_type(&self) -> AssessmentType {
        AssessmentType::Tki
    }

    fn categories(&self) -> &[Category] {
        static CATEGORIES: std::sync::LazyLock<Vec<Category>> = std::sync::LazyLock::new(|| {
            vec![
                Category::new("competing", "Competing", "Assertive and uncooperative; pursues own concerns"),
                Category::new("collaborating", "Collaborating", "Assertive and cooperative; works toward solutions that satisfy everyone"),
                Category::new("compromising", "Compromising", "Intermediate; seeks expedient, mutually acceptable middle ground"),
                Category::new("avoiding", "Avoiding", "Unassertive and uncooperative; sidesteps or postpones the issue"),
                Category::new("accommodating", "Accommodating", "Unassertive and cooperative; neglects own concerns to satisfy others"),
            ]
        });
        &CATEGORIES
    }

    fn default_questions(&self) -> Vec<AssessmentQuestion> {
        default_pairs()
            .into_iter()
            .enumerate()
            .map(|(i, pair)| {
                let category = pair.category();
                let content = serde_json::to_string(&pair).unwrap_or_default();
                default_question(AssessmentType::Tki, i as u32 + 1, &category, content)
            })
            .collect()
    }

    fn score(
        &self,
        questions: &[AssessmentQuestion],
        answers: &serde_json::Value,
    ) -> Result<Scored, InstrumentError> {
        let answers: BTreeMap<String, TkiChoice> = serde_json::from_value(answers.clone())
            .map_err(|e| InstrumentError::MalformedAnswers(e.to_string()))?;
        score_tki(questions, &answers)
    }
}

/// Tally the chosen mode of every pair.
///
/// Every question must be answered. The dominant mode is the highest tally,
/// ties going to the earlier mode in [`ConflictMode::ALL`]. The overall score
/// scales the top tally against the 12-point ceiling.
pub fn score_tki(
    questions: &[AssessmentQuestion],
    answers: &BTreeMap<String, TkiChoice>,
) -> Result<Scored, InstrumentError> {
    if answers.is_empty() {
        return Err(InstrumentError::NoAnswers);
    }

    let known: HashSet<String> = questions.iter().map(|q| q.id.to_string()).collect();
    if let Some(unknown) = answers.keys().find(|k| !known.contains(*k)) {
        return Err(InstrumentError::UnknownQuestion(unknown.clone()));
    }

    let mut tallies: BTreeMap<ConflictMode, u32> = BTreeMap::new();
    for question in questions {
        let id = question.id.to_string();
        let choice = answers
            .get(&id)
            .ok_or_else(|| InstrumentError::MissingAnswer(id.clone()))?;
        let pair = TkiPair::parse(question)?;
        *tallies.entry(pair.mode_for(*choice)).or_insert(0) += 1;
    }

    let mut dominant = ConflictMode::ALL[0];
    let mut best = 0;
    for mode in ConflictMode::ALL {
        let tally = tallies.get(&mode).copied().unwrap_or(0);
        if tally > best {
            best = tally;
            dominant = mode;
        }
    }

    let overall = (f64::from(best) / f64::from(MODE_CEILING) * 100.0).min(100.0);

    Ok(Scored {
        scores: ConflictMode::ALL
            .iter()
            .map(|m| (m.as_str().to_string(), f64::from(tallies.get(m).copied().unwrap_or(0))))
            .collect(),
        overall_score: Some(round1(overall)),
        dominant_result: dominant.as_str().to_string(),
    })
}

/// Pair schedule: every unordered pair of modes three times, with the
/// middle round flipped so neither side is always the same mode. Each mode
/// appears on exactly [`MODE_CEILING`] pairs.
const SCHEDULE: [(ConflictMode, ConflictMode); 10] = [
    (Com, Col),
    (Cmp, Avo),
    (Acc, Com),
    (Col, Cmp),
    (Avo, Acc),
    (Com, Cmp),
    (Col, Avo),
    (Cmp, Acc),
    (Avo, Com),
    (Acc, Col),
];

fn statements(mode: ConflictMode) -> [&'static str; 12] {
    match mode {
        ConflictMode::Competing => [
            "I am firm in pursuing my goals.",
            "I try to win my position.",
            "I make some effort to get my way.",
            "I press to get my points made.",
            "I assert my views even when others disagree.",
            "I push for the outcome I believe is right.",
            "I try to convince the other person of the merits of my position.",
            "I stand my ground when I know I am right.",
            "I am usually determined to reach my objective.",
            "I make decisions quickly and expect others to follow.",
            "I argue my case persuasively.",
            "I hold to my view until the other side concedes.",
        ],
        ConflictMode::Collaborating => [
            "I try to get all concerns and issues immediately out in the open.",
            "I seek the other person's help in working out a solution.",
            "I look for a solution that fully meets both our needs.",
            "I try to deal with all of their concerns as well as mine.",
            "I share the problem openly so we can work it out together.",
            "I explore the underlying interests behind each position.",
            "I tell the other person my ideas and ask for theirs.",
            "I work through our differences rather than around them.",
            "I try to find a result both of us are genuinely happy with.",
            "I invite disagreement early so we can solve it properly.",
            "I gather everyone's input before deciding.",
            "I keep talking until we reach a solution that works for all.",
        ],
        ConflictMode::Compromising => [
            "I try to find a position that is halfway between ours.",
            "I will let them have some of their positions if they let me have some of mine.",
            "I propose a middle ground.",
            "I give up some points in exchange for others.",
            "I look for a fair combination of gains and losses for both of us.",
            "I try to split the difference.",
            "I aim for a quick, acceptable settlement.",
            "I suggest trading concessions to move forward.",
            "I settle for a solution that is good enough for both sides.",
            "I meet people partway when we disagree.",
            "I negotiate so that everyone gets something.",
            "I accept a partial win to keep things moving.",
        ],
        ConflictMode::Avoiding => [
            "I try to avoid creating unpleasantness for myself.",
            "I postpone the issue until I have had time to think it over.",
            "I feel that differences are not always worth worrying about.",
            "I leave the decision to someone else.",
            "I avoid taking positions that would create controversy.",
            "I steer the conversation away from the disagreement.",
            "I let the matter settle on its own.",
            "I keep my concerns to myself to avoid tension.",
            "I step back from disputes that do not directly involve me.",
            "I wait for a better moment to raise difficult topics.",
            "I sidestep arguments whenever I can.",
            "I prefer not to discuss touchy subjects.",
        ],
        ConflictMode::Accommodating => [
            "I try not to hurt the other person's feelings.",
            "I sometimes sacrifice my own wishes for the wishes of others.",
            "I try to soothe the other person's feelings and preserve our relationship.",
            "I let the other person have their way.",
            "I emphasize the things we agree on rather than our differences.",
            "I go along with their suggestion to keep the peace.",
            "I put the relationship ahead of winning the point.",
            "I give in when the issue matters more to them than to me.",
            "I reassure others that their concerns come first.",
            "I yield rather than risk straining the relationship.",
            "I support the other person's preferred approach.",
            "I adapt my plans to fit what others need.",
        ],
    }
}

/// The built-in 30-pair bank.
pub fn default_pairs() -> Vec<TkiPair> {
    let mut cursor: BTreeMap<ConflictMode, usize> = BTreeMap::new();
    let mut next = |mode: ConflictMode| {
        let index = cursor.entry(mode).or_insert(0);
        let text = statements(mode)[*index];
        *index += 1;
        TkiStatement {
            text: text.to_string(),
            mode,
        }
    };

    let mut pairs = Vec::with_capacity(PAIR_COUNT);
    for round in 0..3 {
        for &(first, second) in &SCHEDULE {
            let (a, b) = if round == 1 { (second, first) } else { (first, second) };
            pairs.push(TkiPair {
                a: next(a),
                b: next(b),
            });
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> Vec<AssessmentQuestion> {
        Tki.default_questions()
    }

    /// Choose `mode` whenever it is offered, otherwise statement `a`.
    fn favouring(bank: &[AssessmentQuestion], mode: ConflictMode) -> BTreeMap<String, TkiChoice> {
        bank.iter()
            .map(|q| {
                let pair = TkiPair::parse(q).unwrap();
                let choice = if pair.b.mode == mode { TkiChoice::B } else { TkiChoice::A };
                (q.id.to_string(), choice)
            })
            .collect()
    }

    #[test]
    fn bank_has_thirty_pairs_and_twelve_per_mode() {
        let bank = bank();
        assert_eq!(bank.len(), PAIR_COUNT);
        for mode in ConflictMode::ALL {
            let offered = bank
                .iter()
                .map(|q| TkiPair::parse(q).unwrap())
                .filter(|p| p.a.mode == mode || p.b.mode == mode)
                .count();
            assert_eq!(offered as u32, MODE_CEILING, "{mode:?}");
        }
    }

    #[test]
    fn favoured_mode_is_dominant_with_full_tally() {
        let bank = bank();
        for mode in ConflictMode::ALL {
            let scored = score_tki(&bank, &favouring(&bank, mode)).unwrap();
            assert_eq!(scored.dominant_result, mode.as_str());
            assert_eq!(scored.scores[mode.as_str()], 12.0);
            assert_eq!(scored.overall_score, Some(100.0));
        }
    }

    #[test]
    fn tallies_sum_to_pair_count() {
        let bank = bank();
        let all_a: BTreeMap<_, _> = bank.iter().map(|q| (q.id.to_string(), TkiChoice::A)).collect();
        let scored = score_tki(&bank, &all_a).unwrap();
        let total: f64 = scored.scores.values().sum();
        assert_eq!(total, PAIR_COUNT as f64);
    }

    #[test]
    fn ties_resolve_in_declaration_order() {
        // Two pairs: competing/avoiding and avoiding/competing, one vote each.
        let bank: Vec<AssessmentQuestion> = [(Com, Avo), (Avo, Com)]
            .iter()
            .enumerate()
            .map(|(i, (a, b))| {
                let pair = TkiPair {
                    a: TkiStatement { text: "x".into(), mode: *a },
                    b: TkiStatement { text: "y".into(), mode: *b },
                };
                default_question(
                    AssessmentType::Tki,
                    i as u32 + 100,
                    &pair.category(),
                    serde_json::to_string(&pair).unwrap(),
                )
            })
            .collect();
        let answers: BTreeMap<_, _> = bank
            .iter()
            .map(|q| (q.id.to_string(), TkiChoice::B))
            .collect();
        let scored = score_tki(&bank, &answers).unwrap();
        assert_eq!(scored.scores["avoiding"], 1.0);
        assert_eq!(scored.scores["competing"], 1.0);
        assert_eq!(scored.dominant_result, "competing");
        assert_eq!(scored.overall_score, Some(8.3));
    }

    #[test]
    fn every_question_must_be_answered() {
        let bank = bank();
        let mut answers = favouring(&bank, Com);
        let removed = bank[7].id.to_string();
        answers.remove(&removed);
        assert!(matches!(
            score_tki(&bank, &answers),
            Err(InstrumentError::MissingAnswer(id)) if id == removed
        ));
    }

    #[test]
    fn accepts_uppercase_choice_json() {
        let bank = bank();
        let json: serde_json::Value = bank
            .iter()
            .map(|q| (q.id.to_string(), serde_json::Value::String("A".into())))
            .collect::<serde_json::Map<_, _>>()
            .into();
        assert!(Tki.score(&bank, &json).is_ok());
    }

    #[test]
    fn rejects_malformed_answers() {
        let bank = bank();
        let json = serde_json::json!({ (bank[0].id.to_string()): "c" });
        assert!(matches!(
            Tki.score(&bank, &json),
            Err(InstrumentError::MalformedAnswers(_))
        ));
    }
}

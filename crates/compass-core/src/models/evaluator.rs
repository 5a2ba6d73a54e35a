use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::CoreError;

/// A third party invited to rate a user for 360° feedback.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Evaluator {
    pub id: Uuid,
    /// The user being evaluated.
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub relationship: Relationship,
    pub status: EvaluatorStatus,
    /// Opaque token embedded in the invitation link.
    pub token: String,
    #[serde(default)]
    pub answers: Option<BTreeMap<String, u8>>,
    pub created_at: jiff::Timestamp,
    pub invited_at: Option<jiff::Timestamp>,
    pub started_at: Option<jiff::Timestamp>,
    pub completed_at: Option<jiff::Timestamp>,
}

impl Evaluator {
    pub fn new(user_id: Uuid, name: String, email: String, relationship: Relationship) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            email,
            relationship,
            status: EvaluatorStatus::Pending,
            token: Uuid::new_v4().simple().to_string(),
            answers: None,
            created_at: jiff::Timestamp::now(),
            invited_at: None,
            started_at: None,
            completed_at: None,
        }
    }

    /// Move to `next`, stamping the matching timestamp.
    pub fn advance(&mut self, next: EvaluatorStatus, now: jiff::Timestamp) -> Result<(), CoreError> {
        if !self.status.can_advance_to(next) {
            return Err(CoreError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        match next {
            EvaluatorStatus::Pending => {}
            EvaluatorStatus::Invited => self.invited_at = Some(now),
            EvaluatorStatus::Started => {
                self.started_at.get_or_insert(now);
            }
            EvaluatorStatus::Completed => self.completed_at = Some(now),
        }
        self.status = next;
        Ok(())
    }

    pub fn is_completed(&self) -> bool {
        self.status == EvaluatorStatus::Completed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Relationship {
    Peer,
    Manager,
    DirectReport,
    Other,
}

/// Lifecycle: pending → invited → started → completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum EvaluatorStatus {
    Pending,
    Invited,
    Started,
    Completed,
}

impl EvaluatorStatus {
    /// Status never moves backwards. Re-inviting and re-opening the
    /// evaluation link are allowed as same-state moves; a completed
    /// evaluation is final.
    pub fn can_advance_to(&self, next: EvaluatorStatus) -> bool {
        match (self, next) {
            (EvaluatorStatus::Completed, _) => false,
            (EvaluatorStatus::Invited, EvaluatorStatus::Invited) => true,
            (EvaluatorStatus::Started, EvaluatorStatus::Started) => true,
            (current, next) => next > *current,
        }
    }
}

impl fmt::Display for EvaluatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EvaluatorStatus::Pending => "pending",
            EvaluatorStatus::Invited => "invited",
            EvaluatorStatus::Started => "started",
            EvaluatorStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Token index entry pointing back at an evaluator record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorTokenIndex {
    pub user_id: Uuid,
    pub evaluator_id: Uuid,
}

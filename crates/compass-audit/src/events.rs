use serde::Serialize;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Register,
    Login,
    SubmitAssessment,
    UploadMbti,
    DeleteResult,
    CreateEvaluator,
    InviteEvaluator,
    DeleteEvaluator,
    SubmitEvaluation,
    ExportReport,
    SubscriptionChanged,
    SaveQuestion,
    DeleteQuestion,
    SeedQuestions,
    UpdateUser,
    DeleteUser,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Register => "register",
            AuditAction::Login => "login",
            AuditAction::SubmitAssessment => "submit_assessment",
            AuditAction::UploadMbti => "upload_mbti",
            AuditAction::DeleteResult => "delete_result",
            AuditAction::CreateEvaluator => "create_evaluator",
            AuditAction::InviteEvaluator => "invite_evaluator",
            AuditAction::DeleteEvaluator => "delete_evaluator",
            AuditAction::SubmitEvaluation => "submit_evaluation",
            AuditAction::ExportReport => "export_report",
            AuditAction::SubscriptionChanged => "subscription_changed",
            AuditAction::SaveQuestion => "save_question",
            AuditAction::DeleteQuestion => "delete_question",
            AuditAction::SeedQuestions => "seed_questions",
            AuditAction::UpdateUser => "update_user",
            AuditAction::DeleteUser => "delete_user",
        }
    }
}

/// A structured audit event for a domain action.
///
/// `actor` is the authenticated user, or `None` for public callers such as
/// evaluators and the billing webhook.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub action: AuditAction,
    pub resource_type: &'static str,
    pub resource_id: String,
    pub actor: Option<Uuid>,
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(
        action: AuditAction,
        resource_type: &'static str,
        resource_id: impl Into<String>,
        actor: Option<Uuid>,
    ) -> Self {
        Self {
            action,
            resource_type,
            resource_id: resource_id.into(),
            actor,
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn emit(&self) {
        let actor = self.actor.map(|id| id.to_string()).unwrap_or_else(|| "-".into());
        let details = self
            .details
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        info!(
            audit.action = self.action.as_str(),
            audit.resource_type = self.resource_type,
            audit.resource_id = %self.resource_id,
            audit.actor = %actor,
            audit.details = %details,
            "audit event"
        );
    }
}

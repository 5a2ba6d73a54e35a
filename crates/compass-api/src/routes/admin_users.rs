use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use compass_audit::{AuditAction, AuditEvent};
use compass_core::models::subscription::SubscriptionStatus;
use compass_core::models::user::{Role, UserProfile};
use compass_storage::{subscriptions, users};

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::routes::require_non_empty;
use crate::state::AppState;

#[derive(Serialize)]
pub struct AdminUserView {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub subscription_status: SubscriptionStatus,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub role: Option<Role>,
}

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminUserView>>, ApiError> {
    let mut views = Vec::new();
    for user in users::list_users(state.store()).await? {
        let subscription = subscriptions::get_subscription(state.store(), user.id).await?;
        views.push(AdminUserView {
            profile: user.profile(),
            subscription_status: subscription.status,
        });
    }
    Ok(Json(views))
}

pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let mut user = users::get_user(state.store(), id).await?;
    if let Some(name) = body.name {
        require_non_empty("name", &name)?;
        user.name = name.trim().to_string();
    }
    if let Some(role) = body.role {
        if id == auth.id && role != Role::Admin {
            return Err(ApiError::BadRequest(
                "administrators cannot remove their own role".to_string(),
            ));
        }
        user.role = role;
    }
    user.updated_at = jiff::Timestamp::now();
    users::update_user(state.store(), &user).await?;

    AuditEvent::new(AuditAction::UpdateUser, "user", id.to_string(), Some(auth.id))
        .with_details(serde_json::json!({ "role": user.role.as_str() }))
        .emit();
    Ok(Json(user.profile()))
}

/// Delete a user with their results, evaluators and subscription.
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if id == auth.id {
        return Err(ApiError::BadRequest(
            "administrators cannot delete themselves".to_string(),
        ));
    }
    let user = users::get_user(state.store(), id).await?;
    users::delete_user(state.store(), &user).await?;

    AuditEvent::new(AuditAction::DeleteUser, "user", id.to_string(), Some(auth.id)).emit();
    Ok(StatusCode::NO_CONTENT)
}

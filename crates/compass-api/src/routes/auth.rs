use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use compass_audit::{AuditAction, AuditEvent};
use compass_auth::error::AuthError;
use compass_auth::password::{hash_password, verify_absent, verify_password};
use compass_core::models::user::{Role, User, UserProfile};
use compass_core::s3_keys;
use compass_mail::templates;
use compass_storage::users;

use crate::error::ApiError;
use crate::routes::{require_non_empty, validate_email};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: UserProfile,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    validate_email(&body.email)?;
    require_non_empty("name", &body.name)?;
    let password = body.password;
    let password_hash = off_runtime(move || hash_password(&password)).await?;

    let now = jiff::Timestamp::now();
    let email = s3_keys::normalize_email(&body.email);
    let role = if state.config.is_admin_email(&email) {
        Role::Admin
    } else {
        Role::User
    };
    let user = User {
        id: Uuid::new_v4(),
        email,
        name: body.name.trim().to_string(),
        role,
        password_hash,
        created_at: now,
        updated_at: now,
    };
    users::create_user(state.store(), &user).await?;

    AuditEvent::new(AuditAction::Register, "user", user.id.to_string(), Some(user.id))
        .with_details(serde_json::json!({ "role": user.role.as_str() }))
        .emit();

    let welcome = templates::welcome(&user.email, &user.name, &state.config.public_url)?;
    if let Err(e) = state.mailer.send(&welcome).await {
        tracing::warn!(user_id = %user.id, error = %e, "welcome email failed");
    }

    let token = state.keys.issue(&user)?;
    Ok(Json(SessionResponse {
        token,
        user: user.profile(),
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let user = users::find_by_email(state.store(), &body.email).await?;
    let stored = user.as_ref().map(|u| u.password_hash.clone());
    let password = body.password;
    let verified = off_runtime(move || match stored {
        Some(hash) => verify_password(&password, &hash),
        None => Ok(verify_absent(&password)),
    })
    .await?;
    let Some(user) = user.filter(|_| verified) else {
        return Err(AuthError::InvalidCredentials.into());
    };

    AuditEvent::new(AuditAction::Login, "user", user.id.to_string(), Some(user.id)).emit();

    let token = state.keys.issue(&user)?;
    Ok(Json(SessionResponse {
        token,
        user: user.profile(),
    }))
}

/// Run password hashing on the blocking pool, not an async worker.
async fn off_runtime<T, F>(work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("password task failed: {e}")))?
        .map_err(ApiError::from)
}

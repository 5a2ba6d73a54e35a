use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use compass_core::models::user::Role;
use compass_storage::error::StorageError;
use compass_storage::users;

use crate::error::ApiError;
use crate::state::AppState;

/// Session validation middleware.
///
/// Extracts the `Authorization: Bearer <token>` header and validates the JWT.
/// The subject must still exist; identity and role come from the stored user
/// so demotions and deletions apply to tokens already issued. On success,
/// inserts `AuthUser` into request extensions for handlers to use.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;

    let claims = state.keys.validate(token)?;
    let user = match users::get_user(state.store(), claims.sub).await {
        Ok(user) => user,
        Err(StorageError::NotFound { .. }) => {
            tracing::debug!(user_id = %claims.sub, "token subject no longer exists");
            return Err(ApiError::Unauthorized("account no longer exists".to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    req.extensions_mut().insert(AuthUser {
        id: user.id,
        email: user.email,
        role: user.role,
    });

    Ok(next.run(req).await)
}

/// Rejects callers without the admin role. Runs after [`require_auth`].
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    let user = req
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::Unauthorized("not authenticated".to_string()))?;
    if !user.is_admin() {
        return Err(ApiError::Forbidden("administrator role required".to_string()));
    }
    Ok(next.run(req).await)
}

/// Authenticated user, resolved from the token subject.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("not authenticated".to_string()))
    }
}

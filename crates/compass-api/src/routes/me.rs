use axum::Json;
use axum::extract::State;
use serde::Serialize;

use compass_core::models::subscription::Subscription;
use compass_core::models::user::UserProfile;
use compass_storage::{subscriptions, users};

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Serialize)]
pub struct MeResponse {
    pub user: UserProfile,
    pub subscription: Subscription,
    pub can_export: bool,
}

pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<MeResponse>, ApiError> {
    let user = users::get_user(state.store(), auth.id).await?;
    let subscription = subscriptions::get_subscription(state.store(), auth.id).await?;
    Ok(Json(MeResponse {
        can_export: user.is_admin() || subscription.is_active(),
        user: user.profile(),
        subscription,
    }))
}

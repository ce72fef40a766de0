use axum::{extract::State, routing::get, Json, Router};
use time::OffsetDateTime;
use tracing::{info, instrument};

use super::dto::PatchUserRequest;
use crate::{
    auth::repo_types::{User, UserChanges},
    error::{ApiError, ApiJson, ApiResult},
    middleware::context::{AuthUser, CurrentStore},
    state::AppState,
};

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/user/me", get(get_me).patch(patch_me))
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn get_me(CurrentStore(store): CurrentStore, user: AuthUser) -> ApiResult<Json<User>> {
    let record = store
        .users
        .find_by_id(user.user_id)
        .await?
        .filter(|u| !u.is_deleted)
        .ok_or_else(|| ApiError::NotFound(format!("user {} not found", user.user_id)))?;
    Ok(Json(record))
}

#[instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn patch_me(
    State(state): State<AppState>,
    CurrentStore(store): CurrentStore,
    user: AuthUser,
    ApiJson(payload): ApiJson<PatchUserRequest>,
) -> ApiResult<Json<User>> {
    let user_name = non_empty(payload.user_name);
    let password = payload.password.filter(|p| !p.is_empty());
    if user_name.is_none() && password.is_none() {
        return Err(ApiError::Validation("nothing to update".into()));
    }

    let now = OffsetDateTime::now_utc();
    let mut changes = UserChanges::at(now);
    changes.user_name = user_name;
    changes.last_request = Some(now);
    if let Some(password) = password {
        let hash = state
            .passwords
            .hash(&password)
            .await
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        changes.hashed_password = Some(hash);
    }

    let updated = store.users.update(user.user_id, &changes).await?;
    info!("profile updated");
    Ok(Json(updated))
}

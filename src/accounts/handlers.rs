use axum::{extract::Path, routing::get, Json, Router};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{dto::CreateAccountRequest, repo_types::Account};
use crate::{
    error::{ApiError, ApiJson, ApiResult},
    middleware::context::{AuthUser, CurrentStore},
    state::AppState,
};

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/account", get(list_accounts).post(create_account))
        .route("/account/:id", get(get_account))
}

#[instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn create_account(
    CurrentStore(store): CurrentStore,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateAccountRequest>,
) -> ApiResult<Json<Account>> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("name is required".into()));
    }
    let account = Account::open(name.to_string(), OffsetDateTime::now_utc());
    let account = store.accounts.create(&account).await?;
    info!(account_id = %account.id, "account opened");
    Ok(Json(account))
}

#[instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn list_accounts(
    CurrentStore(store): CurrentStore,
    user: AuthUser,
) -> ApiResult<Json<Vec<Account>>> {
    Ok(Json(store.accounts.list().await?))
}

#[instrument(skip_all, fields(user_id = %user.user_id, id = %id))]
pub async fn get_account(
    CurrentStore(store): CurrentStore,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Account>> {
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::Validation(format!("invalid id: {id}")))?;
    let account = store
        .accounts
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("account {id} not found")))?;
    Ok(Json(account))
}

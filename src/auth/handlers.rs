use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest, TokenResponse},
        repo_types::User,
        services,
    },
    error::{ApiJson, ApiResult},
    middleware::context::CurrentStore,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/user", post(register))
}

#[instrument(skip(state, store, payload))]
pub async fn login(
    State(state): State<AppState>,
    CurrentStore(store): CurrentStore,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let token = services::login(
        store.users.as_ref(),
        &state.passwords,
        &state.tokens,
        &state.lockout,
        payload,
    )
    .await?;
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state, store, payload))]
pub async fn register(
    State(state): State<AppState>,
    CurrentStore(store): CurrentStore,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<Json<User>> {
    let user = services::register(store.users.as_ref(), &state.passwords, payload).await?;
    Ok(Json(user))
}

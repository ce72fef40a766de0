//! Bearer-token gate for protected routes.
//!
//! A request moves through header extraction, token validation, subject
//! parsing and identity resolution. Any failed step denies it with the same
//! 401 body; which step failed is only logged.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use super::context::{Identity, RequestContext};
use crate::{
    auth::jwt::TokenError,
    config::IdentityPolicy,
    error::ApiError,
    state::AppState,
    store::{Store, StoreError},
};

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("missing Authorization header")]
    MissingHeader,
    #[error("authorization header must be in Bearer format")]
    NotBearer,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("malformed subject `{0}`")]
    MalformedSubject(String),
    #[error("no store in context to resolve identity")]
    NoStore,
    #[error("subject {0} does not resolve to an active user")]
    UnknownSubject(Uuid),
    #[error("resolve identity: {0}")]
    Store(#[from] StoreError),
}

/// Strips the case-sensitive `Bearer ` prefix.
pub fn bearer_token(header: &str) -> Result<&str, AuthFailure> {
    header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthFailure::NotBearer)
}

async fn authenticate(
    state: &AppState,
    header: Option<&str>,
    store: Option<&Store>,
) -> Result<Identity, AuthFailure> {
    let token = bearer_token(header.ok_or(AuthFailure::MissingHeader)?)?;

    let claims = state.tokens.verify(token)?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AuthFailure::MalformedSubject(claims.sub.clone()))?;

    if state.config.identity == IdentityPolicy::Verify {
        let store = store.ok_or(AuthFailure::NoStore)?;
        match store.users.find_by_id(user_id).await? {
            Some(user) if user.id == user_id && !user.is_deleted => {}
            _ => return Err(AuthFailure::UnknownSubject(user_id)),
        }
    }

    Ok(Identity { user_id, claims })
}

/// Route layer: attaches the caller's identity to the request context or
/// answers `401 Permission Denied`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let ctx = RequestContext::of(&req).cloned().unwrap_or_default();

    match authenticate(&state, header.as_deref(), ctx.store.as_ref()).await {
        Ok(identity) => {
            debug!(
                request_id = %ctx.request_id(),
                user_id = %identity.user_id,
                expires_at = identity.claims.exp,
                "request authenticated"
            );
            RequestContext::update(&mut req, |ctx| ctx.identity = Some(identity));
            Ok(next.run(req).await)
        }
        Err(failure) => {
            warn!(request_id = %ctx.request_id(), reason = %failure, "request denied");
            Err(ApiError::PermissionDenied)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_prefix_is_case_sensitive() {
        assert_eq!(bearer_token("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
        assert!(matches!(bearer_token("bearer abc"), Err(AuthFailure::NotBearer)));
        assert!(matches!(bearer_token("Token abc"), Err(AuthFailure::NotBearer)));
        assert!(matches!(bearer_token("Bearer   "), Err(AuthFailure::NotBearer)));
    }
}

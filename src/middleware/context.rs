//! Typed request-scoped state, carried in the request extensions.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::request::Parts,
};
use uuid::Uuid;

use crate::{auth::claims::Claims, error::ApiError, store::Store};

/// Identity established by the auth middleware.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub claims: Claims,
}

/// Everything the chain has attached to one in-flight request.
#[derive(Clone, Default)]
pub struct RequestContext {
    pub request_id: Option<String>,
    pub store: Option<Store>,
    pub identity: Option<Identity>,
}

impl RequestContext {
    pub fn of(req: &Request) -> Option<&RequestContext> {
        req.extensions().get::<RequestContext>()
    }

    pub fn request_id(&self) -> &str {
        self.request_id.as_deref().unwrap_or("unknown")
    }

    /// Runs `f` against the request's context, creating an empty one first
    /// if no middleware has attached it yet.
    pub fn update(req: &mut Request, f: impl FnOnce(&mut RequestContext)) {
        let mut ctx = req
            .extensions_mut()
            .remove::<RequestContext>()
            .unwrap_or_default();
        f(&mut ctx);
        req.extensions_mut().insert(ctx);
    }
}

/// The store injected by the store middleware.
pub struct CurrentStore(pub Store);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentStore {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .and_then(|ctx| ctx.store.clone())
            .map(CurrentStore)
            .ok_or_else(|| ApiError::internal(anyhow::anyhow!("no database store in context")))
    }
}

/// Authenticated caller. Only present behind the auth middleware.
pub struct AuthUser {
    pub user_id: Uuid,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .and_then(|ctx| ctx.identity.as_ref())
            .map(|identity| AuthUser {
                user_id: identity.user_id,
            })
            .ok_or(ApiError::PermissionDenied)
    }
}

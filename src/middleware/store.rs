use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::context::RequestContext;
use crate::store::Store;

/// Hands the shared store to the request context.
pub async fn inject_store(State(store): State<Store>, mut req: Request, next: Next) -> Response {
    RequestContext::update(&mut req, |ctx| ctx.store = Some(store));
    next.run(req).await
}

//! The interceptor chain wrapped around every route.
//!
//! Declaration order is outermost first: request id, trace span and
//! start/completion logging, error reporting, store injection. The auth
//! gate is a route layer on protected routes only, so it always runs after
//! the store has been injected.

use axum::{middleware::from_fn, middleware::from_fn_with_state, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub mod auth;
pub mod context;
pub mod logging;
pub mod request_id;
pub mod store;

use context::RequestContext;

pub fn apply(router: Router, state: &AppState) -> Router {
    let chain = ServiceBuilder::new()
        .layer(CorsLayer::permissive())
        .layer(from_fn(request_id::assign_request_id))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    let request_id = req
                        .extensions()
                        .get::<RequestContext>()
                        .map(|ctx| ctx.request_id().to_owned())
                        .unwrap_or_default();
                    tracing::info_span!("http_request", %method, uri = %uri, %request_id, status = tracing::field::Empty)
                })
                .on_request(|_req: &axum::http::Request<_>, _span: &tracing::Span| {
                    tracing::info!("request started");
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "request completed");
                        } else {
                            tracing::info!(%status, latency_ms, "request completed");
                        }
                    },
                ),
        )
        .layer(from_fn(logging::report_errors))
        .layer(from_fn_with_state(state.store.clone(), store::inject_store));

    router.layer(chain)
}

/// Puts `router` behind the bearer-token gate.
pub fn protect(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router.route_layer(from_fn_with_state(state.clone(), auth::require_auth))
}

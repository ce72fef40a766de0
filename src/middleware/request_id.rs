use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use super::context::RequestContext;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Longest upstream id that is honoured; longer ones are replaced.
pub const MAX_REQUEST_ID_LEN: usize = 128;

/// Assigns the request id: an upstream `x-request-id` of at most
/// `MAX_REQUEST_ID_LEN` bytes wins, an id already in the context is kept,
/// otherwise a new UUID is generated. Echoed on the response.
pub async fn assign_request_id(mut req: Request, next: Next) -> Response {
    let upstream = req
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_owned);

    let mut assigned = String::new();
    RequestContext::update(&mut req, |ctx| {
        if let Some(id) = upstream {
            ctx.request_id = Some(id);
        }
        let id = ctx
            .request_id
            .get_or_insert_with(|| Uuid::new_v4().to_string());
        assigned = id.clone();
    });

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&assigned) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

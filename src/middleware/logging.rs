use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{error, warn};

use super::context::RequestContext;
use crate::error::ErrorReport;

/// Logs every error response with its request id and internal detail.
pub async fn report_errors(req: Request, next: Next) -> Response {
    let request_id = RequestContext::of(&req)
        .map(|ctx| ctx.request_id().to_owned())
        .unwrap_or_else(|| "unknown".into());
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let response = next.run(req).await;

    if let Some(report) = response.extensions().get::<ErrorReport>() {
        if report.status.is_server_error() {
            error!(%request_id, %method, %path, status = %report.status, detail = %report.detail, "api error");
        } else {
            warn!(%request_id, %method, %path, status = %report.status, detail = %report.detail, "api error");
        }
    }
    response
}
